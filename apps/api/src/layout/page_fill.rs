//! Page Fill Analysis: decides what to do when a plan is taller than its template allows.
//!
//! # Remediation order
//! - Overflow with a tighter font tier available → rescale once
//! - Still overflowing → drop education coursework
//! - Still overflowing → drop the last job entry (never the only one)
//! - Nothing left to drop → accept the overflow

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PageFillVerdict {
    /// Page height is within the template maximum.
    Fits,
    /// Page height exceeds the template maximum.
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageFillAnalysis {
    pub page_height: f32,
    pub max_height: f32,
    /// `max_height / page_height`; below 1.0 when overflowing.
    pub fill_ratio: f32,
    pub overflow_fraction: f32,
    pub verdict: PageFillVerdict,
}

/// What the engine may still give up to make the page fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimBudget {
    pub can_rescale: bool,
    pub coursework_blocks: usize,
    pub jobs: usize,
    /// Dropping jobs only helps when the experience column is the tall one.
    pub experience_overflows: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FillAction {
    NoAction,
    Rescale { fill_ratio: f32 },
    DropCoursework,
    DropLastJob,
    AcceptOverflow,
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

pub fn analyze_page_fill(page_height: f32, max_height: f32) -> PageFillAnalysis {
    let fill_ratio = if page_height > 0.0 {
        max_height / page_height
    } else {
        1.0
    };
    let overflow_fraction = if max_height > 0.0 {
        (page_height / max_height - 1.0).max(0.0)
    } else {
        0.0
    };
    let verdict = if page_height > max_height {
        PageFillVerdict::Overflow
    } else {
        PageFillVerdict::Fits
    };

    PageFillAnalysis {
        page_height,
        max_height,
        fill_ratio,
        overflow_fraction,
        verdict,
    }
}

/// Recommends the single next remediation step. The caller executes it and
/// re-analyzes.
pub fn recommend_fill_action(analysis: &PageFillAnalysis, budget: &TrimBudget) -> FillAction {
    match analysis.verdict {
        PageFillVerdict::Fits => FillAction::NoAction,
        PageFillVerdict::Overflow => {
            if budget.can_rescale {
                FillAction::Rescale {
                    fill_ratio: analysis.fill_ratio,
                }
            } else if budget.coursework_blocks > 0 {
                FillAction::DropCoursework
            } else if budget.jobs > 1 && budget.experience_overflows {
                FillAction::DropLastJob
            } else {
                FillAction::AcceptOverflow
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
