//! Average glyph widths for the resume font families.
//!
//! Widths are in em units (relative to font size). Per-glyph tables are not
//! used: the text fitter works from one average width per family, which is an
//! intentional approximation. Mixed-case resume prose lands within roughly
//! ±10% of the real measured width; callers treat every height derived from
//! these constants as an estimate.

use serde::{Deserialize, Serialize};

/// The supported font families, one per template family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    /// Modern template: humanist sans-serif.
    Inter,
    /// Professional template: old-style serif.
    EbGaramond,
    /// Creative template: condensed display sans-serif.
    Oswald,
    /// Minimal template: traditional TeX font.
    ComputerModern,
}

impl FontFamily {
    /// Average advance width of a glyph in running text, in em.
    ///
    /// This is the `k` in `chars_per_line = width / (font_size * k)`. Tunable:
    /// raising it makes every estimate more conservative.
    pub fn average_glyph_width(&self) -> f32 {
        match self {
            FontFamily::Inter => 0.52,
            FontFamily::EbGaramond => 0.44,
            FontFamily::Oswald => 0.35,
            FontFamily::ComputerModern => 0.47,
        }
    }
}
