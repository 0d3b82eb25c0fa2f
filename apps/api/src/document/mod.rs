// Canonical resume content and the normalizer that builds it from loose JSON records.

pub mod dates;
pub mod models;
pub mod normalize;

pub use models::ResumeDocument;
pub use normalize::normalize_with_title;
