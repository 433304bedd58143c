/// Tile orientation classification from intrinsic image dimensions

/// Aspect ratio at or above which a tile spans three columns
const ULTRA_WIDE_RATIO: f32 = 1.8;
/// Aspect ratio at or above which a tile spans two columns
const LANDSCAPE_RATIO: f32 = 1.2;
/// Ratio window considered square
const SQUARE_MIN: f32 = 0.9;
const SQUARE_MAX: f32 = 1.1;
/// Square images need at least one side this large to get the 2x2 span
const LARGE_SQUARE_MIN_SIDE: u32 = 2000;

/// Layout span of a gallery tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
    UltraWide,
    LargeSquare,
}

impl Orientation {
    /// Classify an image by its pixel size
    pub fn classify(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return Orientation::Portrait;
        }

        let ratio = width as f32 / height as f32;
        if ratio >= ULTRA_WIDE_RATIO {
            Orientation::UltraWide
        } else if ratio >= LANDSCAPE_RATIO {
            Orientation::Landscape
        } else if (SQUARE_MIN..=SQUARE_MAX).contains(&ratio)
            && (width >= LARGE_SQUARE_MIN_SIDE || height >= LARGE_SQUARE_MIN_SIDE)
        {
            Orientation::LargeSquare
        } else {
            Orientation::Portrait
        }
    }

    /// Grid span as (columns, rows)
    pub fn span(self) -> (u16, u16) {
        match self {
            Orientation::Portrait => (1, 1),
            Orientation::Landscape => (2, 1),
            Orientation::UltraWide => (3, 1),
            Orientation::LargeSquare => (2, 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(Orientation::classify(1600, 1000), Orientation::Landscape);
        assert_eq!(Orientation::classify(2200, 2200), Orientation::LargeSquare);
        assert_eq!(Orientation::classify(2200, 800), Orientation::UltraWide);
        assert_eq!(Orientation::classify(800, 1200), Orientation::Portrait);
    }

    #[test]
    fn test_small_square_stays_single_column() {
        assert_eq!(Orientation::classify(1000, 1000), Orientation::Portrait);
        assert_eq!(Orientation::classify(2000, 2100), Orientation::LargeSquare);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        assert_eq!(Orientation::classify(1800, 1000), Orientation::UltraWide);
        assert_eq!(Orientation::classify(1200, 1000), Orientation::Landscape);
    }

    #[test]
    fn test_degenerate_dimensions() {
        assert_eq!(Orientation::classify(0, 100), Orientation::Portrait);
        assert_eq!(Orientation::classify(100, 0), Orientation::Portrait);
    }

    #[test]
    fn test_spans() {
        assert_eq!(Orientation::Portrait.span(), (1, 1));
        assert_eq!(Orientation::UltraWide.span(), (3, 1));
        assert_eq!(Orientation::LargeSquare.span(), (2, 2));
    }
}
