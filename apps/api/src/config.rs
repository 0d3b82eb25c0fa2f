use anyhow::{Context, Result};

use crate::templates::TemplateKind;

/// Application configuration loaded from environment variables.
/// Every variable has a default; startup fails only on values that do not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Template used when a layout request names none.
    pub default_template: TemplateKind,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            default_template: std::env::var("LAYOUT_DEFAULT_TEMPLATE")
                .unwrap_or_else(|_| TemplateKind::Professional.name().to_string())
                .parse::<TemplateKind>()
                .context("LAYOUT_DEFAULT_TEMPLATE must name a built-in template")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            default_template: TemplateKind::Professional,
        }
    }
}
