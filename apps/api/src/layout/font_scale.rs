//! Font Scaler: one document-wide font tier chosen from total content volume.
//!
//! The factor is a monotone step function of content length: more content never
//! yields larger type. No factor goes below `FACTOR_FLOOR` and every size is
//! clamped to an absolute minimum so text stays legible.

use serde::{Deserialize, Serialize};

/// Lowest scale factor the scaler will ever return.
pub const FACTOR_FLOOR: f32 = 0.8;

pub const MIN_TITLE_PT: f32 = 9.0;
pub const MIN_BODY_PT: f32 = 7.5;
pub const MIN_SMALL_PT: f32 = 6.5;

const TITLE_RATIO: f32 = 1.2;
const SMALL_RATIO: f32 = 0.8;

/// `(max content chars, factor)` steps, ascending. Calibrated against the
/// volume a two-page resume typically carries.
const DEFAULT_STEPS: &[(usize, f32)] = &[
    (1_800, 1.0),  // roomy
    (2_800, 0.95), // typical
    (3_800, 0.9),  // dense
    (4_800, 0.85), // very dense
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSizes {
    pub factor: f32,
    pub title: f32,
    pub body: f32,
    pub small: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct FontScaler {
    steps: &'static [(usize, f32)],
    floor: f32,
}

impl Default for FontScaler {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            floor: FACTOR_FLOOR,
        }
    }
}

impl FontScaler {
    /// Picks the font tier for a document with `total_content_length` characters.
    pub fn scale(&self, total_content_length: usize, base_font_size: f32) -> FontSizes {
        self.sizes(base_font_size, self.factor_for(total_content_length))
    }

    pub fn factor_for(&self, total_content_length: usize) -> f32 {
        self.steps
            .iter()
            .find(|(limit, _)| total_content_length <= *limit)
            .map(|&(_, factor)| factor)
            .unwrap_or(self.floor)
            .max(self.floor)
    }

    /// Sizes for an explicit factor (clamped to the floor).
    pub fn sizes(&self, base_font_size: f32, factor: f32) -> FontSizes {
        let factor = factor.max(self.floor);
        FontSizes {
            factor,
            title: (base_font_size * TITLE_RATIO * factor).max(MIN_TITLE_PT),
            body: (base_font_size * factor).max(MIN_BODY_PT),
            small: (base_font_size * SMALL_RATIO * factor).max(MIN_SMALL_PT),
        }
    }

    /// Tighter factor for a second pass, scaled by `fill_ratio` (target height
    /// over estimated height). `None` when no tighter factor is available.
    pub fn tighten(&self, factor: f32, fill_ratio: f32) -> Option<f32> {
        if !fill_ratio.is_finite() || fill_ratio >= 1.0 || factor <= self.floor {
            return None;
        }
        let tighter = (factor * fill_ratio).max(self.floor);
        (tighter < factor).then_some(tighter)
    }
}
