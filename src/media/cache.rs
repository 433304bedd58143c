use std::collections::HashMap;

use super::loader::{ImageError, LoadedImage};
use super::orientation::Orientation;

/// Load state of one image source
#[derive(Debug, Clone)]
pub enum ImageEntry {
    Pending,
    Ready(LoadedImage),
    Failed(ImageError),
}

/// Session-wide cache of fetched images, keyed by catalog source string
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<String, ImageEntry>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a source as requested. Returns false when it is already pending or loaded,
    /// so each source is fetched at most once per session.
    pub fn request(&mut self, source: &str) -> bool {
        if self.entries.contains_key(source) {
            return false;
        }
        self.entries.insert(source.to_string(), ImageEntry::Pending);
        true
    }

    pub fn complete(&mut self, source: String, result: Result<LoadedImage, ImageError>) {
        let entry = match result {
            Ok(image) => ImageEntry::Ready(image),
            Err(error) => {
                tracing::warn!(%error, "image failed to load");
                ImageEntry::Failed(error)
            }
        };
        self.entries.insert(source, entry);
    }

    pub fn get(&self, source: &str) -> Option<&ImageEntry> {
        self.entries.get(source)
    }

    pub fn ready(&self, source: &str) -> Option<&LoadedImage> {
        match self.entries.get(source) {
            Some(ImageEntry::Ready(image)) => Some(image),
            _ => None,
        }
    }

    /// Orientation of a loaded image; portrait until its dimensions are known
    pub fn orientation(&self, source: &str) -> Orientation {
        self.ready(source)
            .map(|image| Orientation::classify(image.width, image.height))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::widget::image::Handle;

    fn loaded(width: u32, height: u32) -> LoadedImage {
        LoadedImage {
            handle: Handle::from_bytes(Vec::<u8>::new()),
            width,
            height,
        }
    }

    #[test]
    fn test_request_only_once() {
        let mut cache = ImageCache::new();
        assert!(cache.request("a.jpg"));
        assert!(!cache.request("a.jpg"));

        cache.complete("a.jpg".into(), Ok(loaded(10, 10)));
        assert!(!cache.request("a.jpg"));
    }

    #[test]
    fn test_orientation_from_cached_dimensions() {
        let mut cache = ImageCache::new();
        assert_eq!(cache.orientation("wide.jpg"), Orientation::Portrait);

        cache.request("wide.jpg");
        assert_eq!(cache.orientation("wide.jpg"), Orientation::Portrait);

        cache.complete("wide.jpg".into(), Ok(loaded(2200, 800)));
        assert_eq!(cache.orientation("wide.jpg"), Orientation::UltraWide);
    }

    #[test]
    fn test_failed_images_stay_failed() {
        let mut cache = ImageCache::new();
        cache.request("broken.jpg");
        cache.complete(
            "broken.jpg".into(),
            Err(ImageError::Decode("broken.jpg".into(), "bad header".into())),
        );
        assert!(matches!(cache.get("broken.jpg"), Some(ImageEntry::Failed(_))));
        assert!(cache.ready("broken.jpg").is_none());
    }
}
