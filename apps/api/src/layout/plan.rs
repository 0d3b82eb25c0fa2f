//! Layout Plan: the geometry-only output handed to the renderer.
//!
//! # Invariants
//! - every block and container has a finite, non-negative extent
//! - within one column, each block starts at or below the end of the previous one;
//!   full-width blocks count as part of every column
//! - `page_height` reaches at least the bottom of the last block
//! - every block inside a container's vertical span fits inside it

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::font_scale::FontSizes;

/// Tolerance for float accumulation across a column.
const EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Header,
    SectionTitle,
    Summary,
    JobHeader,
    Achievement,
    JobTags,
    Skills,
    EducationEntry,
    Coursework,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    /// Spans the whole content width (header only).
    Full,
    Main,
    Side,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedBlock {
    pub kind: BlockKind,
    pub column: Column,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
    pub content: String,
}

impl PositionedBlock {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    Job,
    Education,
}

/// Bounding box of one job or education entry. Its height is derived from the
/// blocks it holds plus card padding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerBox {
    pub kind: ContainerKind,
    pub column: Column,
    /// Position of the entry in the document's own ordering.
    pub index: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Content dropped to keep the page under the template's maximum height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrimmedContent {
    Coursework { institution: String },
    Job { title: String, company: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlan {
    pub template: String,
    pub page_width: f32,
    pub page_height: f32,
    pub fonts: FontSizes,
    pub blocks: Vec<PositionedBlock>,
    pub containers: Vec<ContainerBox>,
    /// True when the second, tighter font pass was used.
    pub rescaled: bool,
    pub trimmed: Vec<TrimmedContent>,
    /// True only if the page still exceeds the maximum height with nothing left to drop.
    pub overflow: bool,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanViolation {
    #[error("block {index} has a negative or non-finite extent")]
    NegativeExtent { index: usize },

    #[error("block {next} starts at {next_y} above the end of block {previous} at {previous_bottom}")]
    Overlap {
        previous: usize,
        next: usize,
        previous_bottom: f32,
        next_y: f32,
    },

    #[error("page height {page_height} is shorter than content bottom {content_bottom}")]
    PageTooShort {
        page_height: f32,
        content_bottom: f32,
    },

    #[error("block {block} does not fit inside container {container}")]
    ContainerMismatch { container: usize, block: usize },
}

impl LayoutPlan {
    pub fn blocks_of(&self, kind: BlockKind) -> impl Iterator<Item = &PositionedBlock> + '_ {
        self.blocks.iter().filter(move |b| b.kind == kind)
    }

    pub fn count_of(&self, kind: BlockKind) -> usize {
        self.blocks_of(kind).count()
    }

    /// Lowest block edge in a column, counting full-width blocks. Zero when empty.
    #[cfg(test)]
    pub fn column_bottom(&self, column: Column) -> f32 {
        self.blocks
            .iter()
            .filter(|b| in_column(b.column, column))
            .map(PositionedBlock::bottom)
            .fold(0.0, f32::max)
    }

    pub fn content_bottom(&self) -> f32 {
        self.blocks
            .iter()
            .map(PositionedBlock::bottom)
            .fold(0.0, f32::max)
    }

    /// Checks every geometric invariant of the plan.
    pub fn verify(&self) -> Result<(), PlanViolation> {
        for (index, block) in self.blocks.iter().enumerate() {
            let extents = [block.x, block.y, block.width, block.height];
            if extents.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(PlanViolation::NegativeExtent { index });
            }
        }

        for column in [Column::Main, Column::Side] {
            let mut previous: Option<(usize, f32)> = None;
            for (index, block) in self.blocks.iter().enumerate() {
                if !in_column(block.column, column) {
                    continue;
                }
                if let Some((prev_index, prev_bottom)) = previous {
                    if block.y + EPSILON < prev_bottom {
                        return Err(PlanViolation::Overlap {
                            previous: prev_index,
                            next: index,
                            previous_bottom: prev_bottom,
                            next_y: block.y,
                        });
                    }
                }
                previous = Some((index, block.bottom()));
            }
        }

        let content_bottom = self.content_bottom();
        if self.page_height + EPSILON < content_bottom {
            return Err(PlanViolation::PageTooShort {
                page_height: self.page_height,
                content_bottom,
            });
        }

        for (container_index, container) in self.containers.iter().enumerate() {
            let top = container.y;
            let bottom = container.y + container.height;
            if !(container.height.is_finite() && container.height > 0.0) {
                return Err(PlanViolation::ContainerMismatch {
                    container: container_index,
                    block: 0,
                });
            }
            for (index, block) in self.blocks.iter().enumerate() {
                let same_column = block.column == container.column;
                let starts_inside = block.y + EPSILON >= top && block.y < bottom - EPSILON;
                if same_column && starts_inside && block.bottom() > bottom + EPSILON {
                    return Err(PlanViolation::ContainerMismatch {
                        container: container_index,
                        block: index,
                    });
                }
            }
        }

        Ok(())
    }
}

fn in_column(block_column: Column, column: Column) -> bool {
    block_column == column || block_column == Column::Full
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(kind: BlockKind, column: Column, y: f32, height: f32) -> PositionedBlock {
        PositionedBlock {
            kind,
            column,
            x: 36.0,
            y,
            width: 200.0,
            height,
            font_size: 10.0,
            content: "x".to_string(),
        }
    }

    fn plan(blocks: Vec<PositionedBlock>, page_height: f32) -> LayoutPlan {
        LayoutPlan {
            template: "professional".to_string(),
            page_width: 612.0,
            page_height,
            fonts: FontSizes {
                factor: 1.0,
                title: 12.0,
                body: 10.0,
                small: 8.0,
            },
            blocks,
            containers: Vec::new(),
            rescaled: false,
            trimmed: Vec::new(),
            overflow: false,
        }
    }

    #[test]
    fn test_stacked_blocks_verify() {
        let p = plan(
            vec![
                block(BlockKind::Header, Column::Full, 0.0, 60.0),
                block(BlockKind::Summary, Column::Main, 70.0, 30.0),
                block(BlockKind::Skills, Column::Side, 70.0, 90.0),
                block(BlockKind::Achievement, Column::Main, 100.0, 14.0),
            ],
            200.0,
        );
        assert_eq!(p.verify(), Ok(()));
        assert_eq!(p.column_bottom(Column::Main), 114.0);
        assert_eq!(p.column_bottom(Column::Side), 160.0);
    }

    #[test]
    fn test_overlap_in_same_column_rejected() {
        let p = plan(
            vec![
                block(BlockKind::Summary, Column::Main, 0.0, 30.0),
                block(BlockKind::Achievement, Column::Main, 20.0, 10.0),
            ],
            100.0,
        );
        assert!(matches!(p.verify(), Err(PlanViolation::Overlap { next: 1, .. })));
    }

    #[test]
    fn test_header_overlapping_side_column_rejected() {
        let p = plan(
            vec![
                block(BlockKind::Header, Column::Full, 0.0, 60.0),
                block(BlockKind::Skills, Column::Side, 40.0, 10.0),
            ],
            100.0,
        );
        assert!(matches!(p.verify(), Err(PlanViolation::Overlap { .. })));
    }

    #[test]
    fn test_short_page_rejected() {
        let p = plan(vec![block(BlockKind::Summary, Column::Main, 0.0, 30.0)], 20.0);
        assert!(matches!(p.verify(), Err(PlanViolation::PageTooShort { .. })));
    }

    #[test]
    fn test_negative_height_rejected() {
        let p = plan(vec![block(BlockKind::Summary, Column::Main, 0.0, -1.0)], 20.0);
        assert_eq!(p.verify(), Err(PlanViolation::NegativeExtent { index: 0 }));
    }

    #[test]
    fn test_block_escaping_container_rejected() {
        let mut p = plan(
            vec![
                block(BlockKind::JobHeader, Column::Main, 10.0, 20.0),
                block(BlockKind::Achievement, Column::Main, 30.0, 20.0),
            ],
            100.0,
        );
        p.containers.push(ContainerBox {
            kind: ContainerKind::Job,
            column: Column::Main,
            index: 0,
            x: 36.0,
            y: 10.0,
            width: 200.0,
            height: 30.0,
        });
        assert!(matches!(
            p.verify(),
            Err(PlanViolation::ContainerMismatch { block: 1, .. })
        ));
    }
}
