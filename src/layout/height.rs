//! Estimated card heights.
//!
//! The estimate only biases column choice in the balancer. It is never used to
//! place anything on screen, so the constants are nominal rather than measured.
use serde::{Deserialize, Serialize};

/// Nominal height of a card with no media.
pub const TEXT_ONLY_HEIGHT: f64 = 140.0;
/// Nominal height of everything on a media card except the media itself.
pub const CHROME_HEIGHT: f64 = 96.0;
/// Nominal column width the media is scaled to.
pub const NOMINAL_COLUMN_WIDTH: f64 = 300.0;
/// Height assumed for media whose aspect ratio is not known.
pub const UNKNOWN_MEDIA_HEIGHT: f64 = 360.0;

// ============================================================================
// Media Descriptor
// ============================================================================

/// Media attached to a feed entry.
///
/// Only the aspect ratio (width / height) matters for layout.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Media {
    #[serde(default, rename = "aspectRatio", alias = "aspect_ratio")]
    pub aspect_ratio: Option<f64>,
}

impl Media {
    pub fn with_aspect_ratio(ratio: f64) -> Self {
        Self {
            aspect_ratio: Some(ratio),
        }
    }

    pub fn unknown() -> Self {
        Self { aspect_ratio: None }
    }

    /// The aspect ratio if it is usable: finite and strictly positive.
    pub fn known_ratio(&self) -> Option<f64> {
        self.aspect_ratio.filter(|r| r.is_finite() && *r > 0.0)
    }
}

/// Anything that can be laid out in a feed grid.
pub trait LayoutItem {
    fn media(&self) -> Option<Media>;
}

impl<T: LayoutItem + ?Sized> LayoutItem for &T {
    fn media(&self) -> Option<Media> {
        (**self).media()
    }
}

// ============================================================================
// Height Model
// ============================================================================

/// Constants for the height estimate, overridable from the `[layout]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeightModel {
    pub text_only_height: f64,
    pub chrome_height: f64,
    pub nominal_column_width: f64,
    pub unknown_media_height: f64,
}

impl Default for HeightModel {
    fn default() -> Self {
        Self {
            text_only_height: TEXT_ONLY_HEIGHT,
            chrome_height: CHROME_HEIGHT,
            nominal_column_width: NOMINAL_COLUMN_WIDTH,
            unknown_media_height: UNKNOWN_MEDIA_HEIGHT,
        }
    }
}

impl HeightModel {
    /// Replace unusable values with defaults.
    ///
    /// Non-finite or non-positive constants fall back to their default, and the
    /// unknown-media height is kept strictly above the text-only height.
    pub fn sanitized(self) -> Self {
        fn usable(value: f64, fallback: f64) -> f64 {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        }

        let text_only_height = usable(self.text_only_height, TEXT_ONLY_HEIGHT);
        let chrome_height = usable(self.chrome_height, CHROME_HEIGHT);
        let nominal_column_width = usable(self.nominal_column_width, NOMINAL_COLUMN_WIDTH);
        let mut unknown_media_height = usable(self.unknown_media_height, UNKNOWN_MEDIA_HEIGHT);
        if unknown_media_height <= text_only_height {
            tracing::warn!(
                unknown_media_height,
                text_only_height,
                "unknown_media_height must exceed text_only_height, adjusting"
            );
            unknown_media_height = text_only_height + chrome_height;
        }

        Self {
            text_only_height,
            chrome_height,
            nominal_column_width,
            unknown_media_height,
        }
    }

    /// Estimated rendered height of an item. Always positive.
    pub fn estimate<T: LayoutItem + ?Sized>(&self, item: &T) -> f64 {
        match item.media() {
            None => self.text_only_height,
            Some(media) => match media.known_ratio() {
                Some(ratio) => self.chrome_height + self.nominal_column_width / ratio,
                None => self.unknown_media_height,
            },
        }
    }
}

// ============================================================================
// Terminal Rows
// ============================================================================

/// Rows used by a text-only card: borders, author line, two text lines.
const TEXT_CARD_ROWS: usize = 5;
/// Media rows for media of unknown shape.
const UNKNOWN_MEDIA_ROWS: usize = 6;
const MIN_MEDIA_ROWS: usize = 2;
const MAX_MEDIA_ROWS: usize = 16;

/// Height in terminal rows of a card drawn `column_cells` wide.
///
/// Terminal cells are roughly twice as tall as they are wide, so the media
/// block is halved. Used for drawing and scrolling, not for balancing.
pub fn card_rows<T: LayoutItem + ?Sized>(item: &T, column_cells: u16) -> usize {
    let media_rows = match item.media() {
        None => 0,
        Some(media) => match media.known_ratio() {
            Some(ratio) => {
                let rows = (f64::from(column_cells) / ratio / 2.0).round() as usize;
                rows.clamp(MIN_MEDIA_ROWS, MAX_MEDIA_ROWS)
            }
            None => UNKNOWN_MEDIA_ROWS,
        },
    };
    TEXT_CARD_ROWS + media_rows
}
