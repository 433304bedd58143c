/// Image fetching and dimension probing
///
/// Images are fetched from disk (catalog-relative paths) or over HTTP,
/// then their header is read on a blocking thread to learn the intrinsic
/// pixel size used for tile orientation.

use iced::widget::image::Handle;
use std::io::Cursor;
use thiserror::Error;
use tokio::task;

use crate::state::catalog::CatalogSource;

/// Failure to load one image. Never fatal: the tile shows a placeholder.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("failed to read {0}: {1}")]
    Io(String, String),
    #[error("failed to download {0}: {1}")]
    Http(String, String),
    #[error("failed to decode {0}: {1}")]
    Decode(String, String),
}

/// A fetched image ready for display
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub handle: Handle,
    pub width: u32,
    pub height: u32,
}

/// Fetch an image and read its dimensions
pub async fn fetch_image(source: CatalogSource) -> Result<LoadedImage, ImageError> {
    let (name, bytes) = match source {
        CatalogSource::File(path) => {
            let name = path.display().to_string();
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| ImageError::Io(name.clone(), e.to_string()))?;
            (name, bytes)
        }
        CatalogSource::Url(url) => {
            let bytes = download(&url)
                .await
                .map_err(|e| ImageError::Http(url.clone(), e.to_string()))?;
            (url, bytes)
        }
    };

    // Spawn blocking because reading the header may touch a decoder
    let decode_name = name.clone();
    let (bytes, width, height) = task::spawn_blocking(move || {
        let (width, height) = read_dimensions(&bytes)
            .map_err(|message| ImageError::Decode(decode_name, message))?;
        Ok::<_, ImageError>((bytes, width, height))
    })
    .await
    .map_err(|e| ImageError::Decode(name.clone(), format!("Task join error: {}", e)))??;

    tracing::trace!(image = %name, width, height, "image loaded");

    Ok(LoadedImage {
        handle: Handle::from_bytes(bytes),
        width,
        height,
    })
}

async fn download(url: &str) -> Result<Vec<u8>, reqwest::Error> {
    let response = reqwest::get(url).await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

/// Read the intrinsic pixel size from an encoded image
pub fn read_dimensions(bytes: &[u8]) -> Result<(u32, u32), String> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| e.to_string())?
        .into_dimensions()
        .map_err(|e| e.to_string())
}
