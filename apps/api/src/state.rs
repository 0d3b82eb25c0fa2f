use std::sync::Arc;

use crate::config::Config;
use crate::scoring::{ContentScorer, ImpactScorer};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable bullet scorer. Default: ImpactScorer.
    pub scorer: Arc<dyn ContentScorer>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            scorer: Arc::new(ImpactScorer::new()),
        }
    }
}
