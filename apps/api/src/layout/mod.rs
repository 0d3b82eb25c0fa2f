// Layout engine: content selection, font tiering, measurement, stacking, page fill.
// Everything here is synchronous and pure; HTTP handlers call it via spawn_blocking.

pub mod engine;
pub mod font_metrics;
pub mod font_scale;
pub mod handlers;
pub mod page_fill;
pub mod plan;
pub mod text_fit;

// Re-export the public API consumed by handlers.
pub use engine::LayoutEngine;
pub use plan::LayoutPlan;
