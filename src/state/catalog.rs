use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::data::{parse_date, Artwork, ArtworkKind, Category, ImageRef, RawArtwork};

/// Label given to the main image when building an artwork's image list
pub const FINAL_LABEL: &str = "Final";

/// Errors that can occur while fetching or parsing the catalog
///
/// Messages are kept as strings so the error can travel inside UI messages.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {message}")]
    Io { path: String, message: String },
    #[error("failed to fetch catalog {url}: {message}")]
    Http { url: String, message: String },
    #[error("malformed catalog: {0}")]
    Parse(String),
}

/// Where the catalog document lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Url(String),
}

impl CatalogSource {
    /// Interpret a configured location: `http(s)://` means remote, anything else is a path
    pub fn parse(location: &str) -> Self {
        if is_remote(location) {
            CatalogSource::Url(location.to_string())
        } else {
            CatalogSource::File(PathBuf::from(location))
        }
    }

    /// Base against which relative image sources are resolved
    pub fn base(&self) -> MediaBase {
        match self {
            CatalogSource::File(path) => MediaBase::Dir(
                path.parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default(),
            ),
            CatalogSource::Url(url) => match url.rfind('/') {
                Some(slash) => MediaBase::Url(url[..=slash].to_string()),
                None => MediaBase::Url(url.clone()),
            },
        }
    }
}

/// Base location for catalog-relative media
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaBase {
    Dir(PathBuf),
    Url(String),
}

impl Default for MediaBase {
    fn default() -> Self {
        MediaBase::Dir(PathBuf::new())
    }
}

impl MediaBase {
    /// Resolve an image or video source from the catalog
    pub fn resolve(&self, source: &str) -> CatalogSource {
        if is_remote(source) {
            return CatalogSource::Url(source.to_string());
        }
        match self {
            MediaBase::Dir(dir) => CatalogSource::File(dir.join(source)),
            MediaBase::Url(base) => {
                CatalogSource::Url(format!("{}{}", base, source.trim_start_matches('/')))
            }
        }
    }
}

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// The in-memory artwork catalog, keyed by category in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    shelves: Vec<(Category, Vec<Artwork>)>,
}

impl Catalog {
    /// An empty catalog that still knows its categories (used as the load fallback)
    pub fn empty(categories: &[String]) -> Self {
        Self {
            shelves: categories
                .iter()
                .map(|name| (Category::new(name.as_str()), Vec::new()))
                .collect(),
        }
    }

    /// Parse and normalize a catalog JSON document
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let document: Map<String, Value> =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;

        let mut shelves = Vec::with_capacity(document.len());
        for (name, entries) in document {
            let raw: Vec<RawArtwork> = serde_json::from_value(entries)
                .map_err(|e| CatalogError::Parse(format!("category '{}': {}", name, e)))?;

            let category = Category::new(name);
            let artworks = raw
                .into_iter()
                .map(|entry| normalize(entry, &category))
                .collect();
            shelves.push((category, artworks));
        }

        Ok(Self { shelves })
    }

    /// Categories in catalog order
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.shelves.iter().map(|(category, _)| category)
    }

    /// Artworks of a category in catalog order (empty for unknown categories)
    pub fn items(&self, category: &Category) -> &[Artwork] {
        self.shelves
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, category: &Category) -> bool {
        self.shelves.iter().any(|(name, _)| name == category)
    }

    /// Total number of artworks across all categories
    pub fn len(&self) -> usize {
        self.shelves.iter().map(|(_, items)| items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct years present in the catalog, newest first
    ///
    /// `always` is included even when no artwork uses it, so the
    /// initial period is always selectable.
    pub fn periods(&self, always: &str) -> Vec<String> {
        let mut years: Vec<String> = self
            .shelves
            .iter()
            .flat_map(|(_, items)| items.iter().map(|item| item.year.clone()))
            .filter(|year| !year.is_empty())
            .collect();
        if !always.is_empty() {
            years.push(always.to_string());
        }
        years.sort_by(|a, b| b.cmp(a));
        years.dedup();
        years
    }
}

/// Turn a raw catalog entry into an artwork record
///
/// Never drops an entry. A comic keeps its `images` exactly as listed, even
/// when empty; every other entry gets the final image followed by its
/// related images.
pub fn normalize(raw: RawArtwork, category: &Category) -> Artwork {
    let kind = if raw.is_comic {
        ArtworkKind::Comic
    } else if raw.is_video {
        match raw.video_file.as_deref().filter(|file| !file.is_empty()) {
            Some(file) => ArtworkKind::Video {
                video_file: file.to_string(),
            },
            None => {
                tracing::warn!(title = %raw.title, "video entry has no videoFile, showing it as an image");
                ArtworkKind::Image
            }
        }
    } else {
        ArtworkKind::Image
    };

    let main_image = raw.main_image.filter(|url| !url.is_empty());
    let images = match (&kind, raw.images) {
        (ArtworkKind::Comic, Some(pages)) => pages,
        _ => {
            let mut images = Vec::with_capacity(1 + raw.related_images.len());
            if let Some(main) = &main_image {
                images.push(ImageRef::new(main.as_str(), FINAL_LABEL));
            }
            images.extend(raw.related_images);
            images
        }
    };

    let date = raw.date.as_deref().and_then(|text| {
        let parsed = parse_date(text);
        if parsed.is_none() {
            tracing::debug!(title = %raw.title, date = text, "unparseable date, sorting as oldest");
        }
        parsed
    });

    Artwork {
        title: raw.title,
        description: raw.description,
        full_description: raw.full_description,
        category: category.clone(),
        year: raw.year.into_string(),
        date,
        main_image,
        images,
        software: raw.software,
        kind,
    }
}

/// Fetch the raw catalog document
pub async fn fetch(source: CatalogSource) -> Result<String, CatalogError> {
    match source {
        CatalogSource::File(path) => {
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| CatalogError::Io {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })
        }
        CatalogSource::Url(url) => {
            let http_error = |e: reqwest::Error| CatalogError::Http {
                url: url.clone(),
                message: e.to_string(),
            };
            let response = reqwest::get(&url).await.map_err(http_error)?;
            let response = response.error_for_status().map_err(http_error)?;
            response.text().await.map_err(http_error)
        }
    }
}

/// Fetch and normalize the catalog
pub async fn load(source: CatalogSource) -> Result<Catalog, CatalogError> {
    let json = fetch(source).await?;
    Catalog::from_json(&json)
}

/// Outcome of the one-time startup load
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub catalog: Catalog,
    /// Set when the catalog could not be loaded and the fallback is in use
    pub diagnostic: Option<CatalogError>,
}

/// Load the catalog, falling back to an empty catalog on any failure
pub async fn load_or_fallback(source: CatalogSource, fallback_categories: Vec<String>) -> LoadOutcome {
    match load(source.clone()).await {
        Ok(catalog) => {
            tracing::info!(
                categories = catalog.categories().count(),
                artworks = catalog.len(),
                "catalog loaded"
            );
            LoadOutcome {
                catalog,
                diagnostic: None,
            }
        }
        Err(error) => {
            tracing::error!(%error, ?source, "error loading artwork data, using empty catalog");
            LoadOutcome {
                catalog: Catalog::empty(&fallback_categories),
                diagnostic: Some(error),
            }
        }
    }
}
