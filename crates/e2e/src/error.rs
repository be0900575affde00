//! Error types for UI verification runs

use thiserror::Error;
use toolbox_layout::LayoutError;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Browser script produced no frame capture for scenario '{0}'")]
    FrameMissing(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Scenario parse error: {0}")]
    ScenarioParse(String),

    #[error("Application at {url} not reachable after {attempts} attempts")]
    AppUnreachable { url: String, attempts: usize },

    #[error("Baseline not found: {0}")]
    BaselineNotFound(String),

    #[error("Layout check error: {0}")]
    Layout(#[from] LayoutError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type E2eResult<T> = Result<T, E2eError>;
