//! Template families: pure layout policy data consumed by the layout engine.
//!
//! Each family differs only in limits, column geometry, fonts and colors. The
//! engine never branches on the family name: a new family is one more
//! `TemplateConfig` value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::font_metrics::FontFamily;
use crate::layout::plan::Column;

// ────────────────────────────────────────────────────────────────────────────
// Template identifiers
// ────────────────────────────────────────────────────────────────────────────

/// The four built-in template families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// Single column, generous summary.
    Professional,
    /// Narrow sidebar holding skills and education.
    Modern,
    /// Dense one-pager.
    Minimal,
    /// Two columns of cards.
    Creative,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 4] = [
        TemplateKind::Professional,
        TemplateKind::Modern,
        TemplateKind::Minimal,
        TemplateKind::Creative,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TemplateKind::Professional => "professional",
            TemplateKind::Modern => "modern",
            TemplateKind::Minimal => "minimal",
            TemplateKind::Creative => "creative",
        }
    }

    pub fn config(&self) -> TemplateConfig {
        match self {
            TemplateKind::Professional => professional(),
            TemplateKind::Modern => modern(),
            TemplateKind::Minimal => minimal(),
            TemplateKind::Creative => creative(),
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown template '{0}' (expected one of: professional, modern, minimal, creative)")]
pub struct UnknownTemplate(pub String);

impl FromStr for TemplateKind {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TemplateKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownTemplate(s.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Configuration data
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Colors {
    pub primary: String,
    pub accent: String,
}

/// Caller-supplied color override. Missing or blank fields keep the template default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorOverride {
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub accent: Option<String>,
}

/// Content caps applied before any geometry is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    pub summary_chars: usize,
    /// Cap for a single achievement bullet or a job description.
    pub job_description_chars: usize,
    pub max_achievements_per_job: usize,
    pub max_skills_shown: usize,
    pub max_jobs_shown: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnLayout {
    Single,
    Sidebar,
    TwoColumn,
}

/// Page geometry in points (1/72 inch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub page_width: f32,
    pub column_layout: ColumnLayout,
    pub base_font_size: f32,
    pub margin: f32,
    pub header_height: f32,
    pub section_gap: f32,
    /// Space between two entries of the same section.
    pub entry_gap: f32,
    /// Line-height multiplier.
    pub line_height: f32,
    /// Share of the content width given to the sidebar (sidebar layout only).
    pub sidebar_ratio: f32,
    pub column_gap: f32,
    /// Inner padding of job and education cards; zero means no visible card.
    pub card_padding: f32,
    pub max_height: f32,
}

/// Which column a section is stacked into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSlot {
    Main,
    Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Summary,
    Experience,
    Skills,
    Education,
}

impl Section {
    pub fn label(&self) -> &'static str {
        match self {
            Section::Summary => "Summary",
            Section::Experience => "Experience",
            Section::Skills => "Skills",
            Section::Education => "Education",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPlacement {
    pub section: Section,
    pub slot: ColumnSlot,
}

/// Horizontal extent of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnFrame {
    pub column: Column,
    pub x: f32,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub name: String,
    pub font: FontFamily,
    pub colors: Colors,
    pub limits: Limits,
    pub geometry: Geometry,
    /// Stacking order; sections not listed are never placed.
    pub sections: Vec<SectionPlacement>,
}

impl TemplateConfig {
    /// Returns a copy with the caller's colors applied over the template defaults.
    pub fn with_colors(mut self, colors: &ColorOverride) -> Self {
        if let Some(primary) = non_blank(colors.primary.as_deref()) {
            self.colors.primary = primary.to_string();
        }
        if let Some(accent) = non_blank(colors.accent.as_deref()) {
            self.colors.accent = accent.to_string();
        }
        self
    }
}

impl Geometry {
    pub fn content_width(&self) -> f32 {
        (self.page_width - 2.0 * self.margin).max(0.0)
    }

    /// Full-width frame used by the header.
    pub fn full_frame(&self) -> ColumnFrame {
        ColumnFrame {
            column: Column::Full,
            x: self.margin,
            width: self.content_width(),
        }
    }

    /// Resolves a section slot to a concrete column. Single-column layouts fold
    /// the side slot into the main column.
    pub fn frame(&self, slot: ColumnSlot) -> ColumnFrame {
        let content = self.content_width();
        match self.column_layout {
            ColumnLayout::Single => self.main_only(content),
            ColumnLayout::Sidebar => {
                let side_width = (content * self.sidebar_ratio - self.column_gap / 2.0).max(0.0);
                let main_width = (content - side_width - self.column_gap).max(0.0);
                match slot {
                    ColumnSlot::Side => ColumnFrame {
                        column: Column::Side,
                        x: self.margin,
                        width: side_width,
                    },
                    ColumnSlot::Main => ColumnFrame {
                        column: Column::Main,
                        x: self.margin + side_width + self.column_gap,
                        width: main_width,
                    },
                }
            }
            ColumnLayout::TwoColumn => {
                let half = ((content - self.column_gap) / 2.0).max(0.0);
                match slot {
                    ColumnSlot::Main => ColumnFrame {
                        column: Column::Main,
                        x: self.margin,
                        width: half,
                    },
                    ColumnSlot::Side => ColumnFrame {
                        column: Column::Side,
                        x: self.margin + half + self.column_gap,
                        width: half,
                    },
                }
            }
        }
    }

    fn main_only(&self, content: f32) -> ColumnFrame {
        ColumnFrame {
            column: Column::Main,
            x: self.margin,
            width: content,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Built-in families (US letter width, 612pt)
// ────────────────────────────────────────────────────────────────────────────

const LETTER_WIDTH_PT: f32 = 612.0;
const LETTER_HEIGHT_PT: f32 = 792.0;

fn placements(order: &[(Section, ColumnSlot)]) -> Vec<SectionPlacement> {
    order
        .iter()
        .map(|&(section, slot)| SectionPlacement { section, slot })
        .collect()
}

pub fn professional() -> TemplateConfig {
    TemplateConfig {
        name: TemplateKind::Professional.name().to_string(),
        font: FontFamily::EbGaramond,
        colors: Colors {
            primary: "#1e3a5f".to_string(),
            accent: "#2563eb".to_string(),
        },
        limits: Limits {
            summary_chars: 525,
            job_description_chars: 300,
            max_achievements_per_job: 4,
            max_skills_shown: 15,
            max_jobs_shown: 5,
        },
        geometry: Geometry {
            page_width: LETTER_WIDTH_PT,
            column_layout: ColumnLayout::Single,
            base_font_size: 11.0,
            margin: 48.0,
            header_height: 72.0,
            section_gap: 14.0,
            entry_gap: 8.0,
            line_height: 1.35,
            sidebar_ratio: 0.0,
            column_gap: 0.0,
            card_padding: 0.0,
            max_height: 2.0 * LETTER_HEIGHT_PT,
        },
        sections: placements(&[
            (Section::Summary, ColumnSlot::Main),
            (Section::Experience, ColumnSlot::Main),
            (Section::Skills, ColumnSlot::Main),
            (Section::Education, ColumnSlot::Main),
        ]),
    }
}

pub fn modern() -> TemplateConfig {
    TemplateConfig {
        name: TemplateKind::Modern.name().to_string(),
        font: FontFamily::Inter,
        colors: Colors {
            primary: "#0f766e".to_string(),
            accent: "#14b8a6".to_string(),
        },
        limits: Limits {
            summary_chars: 400,
            job_description_chars: 250,
            max_achievements_per_job: 3,
            max_skills_shown: 12,
            max_jobs_shown: 4,
        },
        geometry: Geometry {
            page_width: LETTER_WIDTH_PT,
            column_layout: ColumnLayout::Sidebar,
            base_font_size: 10.5,
            margin: 36.0,
            header_height: 88.0,
            section_gap: 12.0,
            entry_gap: 8.0,
            line_height: 1.3,
            sidebar_ratio: 0.32,
            column_gap: 18.0,
            card_padding: 0.0,
            max_height: 2.0 * LETTER_HEIGHT_PT,
        },
        sections: placements(&[
            (Section::Summary, ColumnSlot::Main),
            (Section::Experience, ColumnSlot::Main),
            (Section::Skills, ColumnSlot::Side),
            (Section::Education, ColumnSlot::Side),
        ]),
    }
}

pub fn minimal() -> TemplateConfig {
    TemplateConfig {
        name: TemplateKind::Minimal.name().to_string(),
        font: FontFamily::ComputerModern,
        colors: Colors {
            primary: "#111827".to_string(),
            accent: "#6b7280".to_string(),
        },
        limits: Limits {
            summary_chars: 300,
            job_description_chars: 200,
            max_achievements_per_job: 3,
            max_skills_shown: 20,
            max_jobs_shown: 6,
        },
        geometry: Geometry {
            page_width: LETTER_WIDTH_PT,
            column_layout: ColumnLayout::Single,
            base_font_size: 10.0,
            margin: 36.0,
            header_height: 56.0,
            section_gap: 10.0,
            entry_gap: 6.0,
            line_height: 1.25,
            sidebar_ratio: 0.0,
            column_gap: 0.0,
            card_padding: 0.0,
            max_height: LETTER_HEIGHT_PT,
        },
        sections: placements(&[
            (Section::Summary, ColumnSlot::Main),
            (Section::Experience, ColumnSlot::Main),
            (Section::Skills, ColumnSlot::Main),
            (Section::Education, ColumnSlot::Main),
        ]),
    }
}

pub fn creative() -> TemplateConfig {
    TemplateConfig {
        name: TemplateKind::Creative.name().to_string(),
        font: FontFamily::Oswald,
        colors: Colors {
            primary: "#7c3aed".to_string(),
            accent: "#f59e0b".to_string(),
        },
        limits: Limits {
            summary_chars: 450,
            job_description_chars: 280,
            max_achievements_per_job: 4,
            max_skills_shown: 16,
            max_jobs_shown: 4,
        },
        geometry: Geometry {
            page_width: LETTER_WIDTH_PT,
            column_layout: ColumnLayout::TwoColumn,
            base_font_size: 10.5,
            margin: 32.0,
            header_height: 96.0,
            section_gap: 16.0,
            entry_gap: 12.0,
            line_height: 1.35,
            sidebar_ratio: 0.0,
            column_gap: 20.0,
            card_padding: 8.0,
            max_height: 2.0 * LETTER_HEIGHT_PT,
        },
        sections: placements(&[
            (Section::Experience, ColumnSlot::Main),
            (Section::Summary, ColumnSlot::Side),
            (Section::Skills, ColumnSlot::Side),
            (Section::Education, ColumnSlot::Side),
        ]),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_template_names_case_insensitive() {
        assert_eq!("modern".parse::<TemplateKind>(), Ok(TemplateKind::Modern));
        assert_eq!(
            " Creative ".parse::<TemplateKind>(),
            Ok(TemplateKind::Creative)
        );
        assert!("glossy".parse::<TemplateKind>().is_err());
    }

    #[test]
    fn test_every_kind_config_carries_its_name() {
        for kind in TemplateKind::ALL {
            assert_eq!(kind.config().name, kind.name());
        }
    }

    #[test]
    fn test_professional_limits() {
        let config = TemplateKind::Professional.config();
        assert_eq!(config.limits.summary_chars, 525);
        assert_eq!(config.limits.max_achievements_per_job, 4);
        assert_eq!(config.geometry.column_layout, ColumnLayout::Single);
    }

    #[test]
    fn test_color_override_applies_non_blank_fields_only() {
        let config = professional().with_colors(&ColorOverride {
            primary: Some("#000000".to_string()),
            accent: Some("   ".to_string()),
        });
        assert_eq!(config.colors.primary, "#000000");
        assert_eq!(config.colors.accent, "#2563eb");
    }

    #[test]
    fn test_single_layout_folds_side_into_main() {
        let geometry = professional().geometry;
        assert_eq!(geometry.frame(ColumnSlot::Side), geometry.frame(ColumnSlot::Main));
        assert_eq!(geometry.frame(ColumnSlot::Main).column, Column::Main);
    }

    #[test]
    fn test_sidebar_frames_do_not_overlap_horizontally() {
        let geometry = modern().geometry;
        let side = geometry.frame(ColumnSlot::Side);
        let main = geometry.frame(ColumnSlot::Main);
        assert!(side.x + side.width <= main.x);
        assert!(main.x + main.width <= geometry.page_width - geometry.margin + 1e-3);
        assert!(side.width < main.width, "sidebar should be the narrow column");
    }

    #[test]
    fn test_two_column_frames_are_equal_width() {
        let geometry = creative().geometry;
        let left = geometry.frame(ColumnSlot::Main);
        let right = geometry.frame(ColumnSlot::Side);
        assert!((left.width - right.width).abs() < 1e-3);
        assert!(left.x + left.width <= right.x);
    }

    #[test]
    fn test_every_template_places_each_section_once() {
        for kind in TemplateKind::ALL {
            let config = kind.config();
            for section in [
                Section::Summary,
                Section::Experience,
                Section::Skills,
                Section::Education,
            ] {
                let count = config
                    .sections
                    .iter()
                    .filter(|p| p.section == section)
                    .count();
                assert_eq!(count, 1, "{kind} places {section:?} {count} times");
            }
        }
    }
    #[test]
    fn test_experience_leads_its_column_after_summary() {
        for kind in TemplateKind::ALL {
            let config = kind.config();
            let slot = config
                .sections
                .iter()
                .find(|p| p.section == Section::Experience)
                .map(|p| p.slot)
                .expect("experience placed");
            let column: Vec<Section> = config
                .sections
                .iter()
                .filter(|p| p.slot == slot && p.section != Section::Summary)
                .map(|p| p.section)
                .collect();
            assert_eq!(column[0], Section::Experience, "{kind} orders {column:?}");
        }
    }
}
