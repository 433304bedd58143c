/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the catalog loader, the filter engine and the UI layer.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A catalog category (e.g. "illustrations", "concept-art")
///
/// The set of categories is whatever the catalog document lists,
/// so this is an open newtype rather than a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human readable label for the category selector ("graphic-design" -> "Graphic Design")
    pub fn label(&self) -> String {
        self.0
            .split(['-', '_'])
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One image reference: a URL (or catalog-relative path) and a caption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default)]
    pub label: String,
}

impl ImageRef {
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
        }
    }
}

/// Presentation kind of an artwork, resolved once at load time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtworkKind {
    /// Regular piece, opens in the lightbox
    Image,
    /// Sequential pages, opens in the comic reader
    Comic,
    /// Timelapse or animation, opens in the video modal
    Video { video_file: String },
}

/// A normalized artwork record
#[derive(Debug, Clone, PartialEq)]
pub struct Artwork {
    pub title: String,
    pub description: String,
    pub full_description: Option<String>,
    pub category: Category,
    /// Exact-match period key (e.g. "2025")
    pub year: String,
    /// None when the catalog has no date or it could not be parsed
    pub date: Option<NaiveDateTime>,
    /// Tile cover, for comics as well as single pieces
    pub main_image: Option<String>,
    /// For comics: pages in reading order. Otherwise: the final image followed by related images.
    pub images: Vec<ImageRef>,
    pub software: Vec<String>,
    pub kind: ArtworkKind,
}

impl Artwork {
    /// Source of the image shown on the tile and as the video poster
    ///
    /// Falls back to the first image when the entry has no `mainImage`.
    pub fn cover(&self) -> Option<&str> {
        self.main_image
            .as_deref()
            .or_else(|| self.images.first().map(|image| image.url.as_str()))
    }

    /// The lightbox hero: the final image for single pieces
    pub fn hero(&self) -> Option<&ImageRef> {
        self.images.first()
    }

    /// Images shown below the hero in the lightbox
    pub fn secondary_images(&self) -> &[ImageRef] {
        self.images.get(1..).unwrap_or(&[])
    }

    pub fn full_description(&self) -> &str {
        self.full_description
            .as_deref()
            .filter(|text| !text.is_empty())
            .unwrap_or(&self.description)
    }

    /// Sort key for the gallery; undated items sort as the Unix epoch
    pub fn sort_date(&self) -> NaiveDateTime {
        self.date.unwrap_or_default()
    }

    pub fn is_comic(&self) -> bool {
        matches!(self.kind, ArtworkKind::Comic)
    }

    pub fn video_file(&self) -> Option<&str> {
        match &self.kind {
            ArtworkKind::Video { video_file } => Some(video_file),
            _ => None,
        }
    }
}

/// Year as it appears in the catalog: usually a string, sometimes a bare number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawYear {
    Text(String),
    Number(i64),
}

impl Default for RawYear {
    fn default() -> Self {
        RawYear::Text(String::new())
    }
}

impl RawYear {
    pub fn into_string(self) -> String {
        match self {
            RawYear::Text(text) => text,
            RawYear::Number(number) => number.to_string(),
        }
    }
}

/// An artwork entry exactly as written in the catalog JSON
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArtwork {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub full_description: Option<String>,
    #[serde(default)]
    pub year: RawYear,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub related_images: Vec<ImageRef>,
    #[serde(default)]
    pub images: Option<Vec<ImageRef>>,
    #[serde(default)]
    pub software: Vec<String>,
    #[serde(default)]
    pub is_comic: bool,
    #[serde(default)]
    pub is_video: bool,
    #[serde(default)]
    pub video_file: Option<String>,
}

/// Parse the catalog's ISO-like date strings
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` and RFC 3339.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|datetime| datetime.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_label() {
        assert_eq!(Category::new("graphic-design").label(), "Graphic Design");
        assert_eq!(Category::new("illustrations").label(), "Illustrations");
    }

    #[test]
    fn test_parse_date_formats() {
        let day = parse_date("2024-06-01").unwrap();
        assert_eq!(day.to_string(), "2024-06-01 00:00:00");

        let with_time = parse_date("2024-06-01T12:30:00").unwrap();
        assert_eq!(with_time.to_string(), "2024-06-01 12:30:00");

        let rfc = parse_date("2024-06-01T12:30:00+02:00").unwrap();
        assert_eq!(rfc.to_string(), "2024-06-01 10:30:00");

        assert!(parse_date("").is_none());
        assert!(parse_date("sometime in june").is_none());
    }

    #[test]
    fn test_raw_year_accepts_numbers() {
        let raw: RawArtwork = serde_json::from_str(r#"{"title":"a","year":2024}"#).unwrap();
        assert_eq!(raw.year.into_string(), "2024");
    }

    #[test]
    fn test_full_description_falls_back() {
        let artwork = Artwork {
            title: "Piece".into(),
            description: "short".into(),
            full_description: None,
            category: Category::new("illustrations"),
            year: "2025".into(),
            date: None,
            main_image: None,
            images: vec![],
            software: vec![],
            kind: ArtworkKind::Image,
        };
        assert_eq!(artwork.full_description(), "short");
        assert!(artwork.secondary_images().is_empty());
        assert_eq!(artwork.sort_date(), NaiveDateTime::default());
        assert_eq!(artwork.cover(), None);
    }

    #[test]
    fn test_cover_prefers_main_image() {
        let mut artwork = Artwork {
            title: "Pages".into(),
            description: String::new(),
            full_description: None,
            category: Category::new("comics"),
            year: "2025".into(),
            date: None,
            main_image: Some("cover.jpg".into()),
            images: vec![ImageRef::new("p1.jpg", "Page 1")],
            software: vec![],
            kind: ArtworkKind::Comic,
        };
        assert_eq!(artwork.cover(), Some("cover.jpg"));
        assert_eq!(artwork.hero().map(|image| image.url.as_str()), Some("p1.jpg"));

        artwork.main_image = None;
        assert_eq!(artwork.cover(), Some("p1.jpg"));
    }
}
