//! Verification run configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};
use crate::playwright::{Browser, PlaywrightConfig};
use crate::target::AppTarget;

/// Settings for one verification run, loadable from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Where the toolbox app is served
    pub base_url: String,

    /// Directory searched recursively for scenario YAML files
    pub scenarios_dir: PathBuf,

    /// Screenshots, baselines, diffs and results.json go here
    pub output_dir: PathBuf,

    /// Directory whose node_modules provides playwright
    pub project_dir: PathBuf,

    /// chromium, firefox or webkit
    pub browser: String,

    pub headless: bool,

    /// How long to wait for the app to answer before giving up
    pub readiness_timeout_secs: u64,

    /// Upper bound for one scenario's browser script
    pub script_timeout_secs: u64,

    pub action_timeout_ms: u64,

    /// Overwrite baselines with the current screenshots
    pub update_baselines: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            scenarios_dir: PathBuf::from("verification/scenarios"),
            output_dir: PathBuf::from("verification"),
            project_dir: PathBuf::from("."),
            browser: "chromium".to_string(),
            headless: true,
            readiness_timeout_secs: 30,
            script_timeout_secs: 60,
            action_timeout_ms: 5000,
            update_baselines: false,
        }
    }
}

impl VerifyConfig {
    /// Load from a TOML file; absent keys keep their defaults
    pub fn load(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> E2eResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn playwright(&self) -> E2eResult<PlaywrightConfig> {
        let browser = Browser::parse(&self.browser).ok_or_else(|| {
            E2eError::InvalidConfig(format!(
                "unknown browser '{}' (expected chromium, firefox or webkit)",
                self.browser
            ))
        })?;

        Ok(PlaywrightConfig {
            base_url: self.base_url.clone(),
            browser,
            headless: self.headless,
            project_dir: self.project_dir.clone(),
            script_timeout: Duration::from_secs(self.script_timeout_secs),
            action_timeout_ms: self.action_timeout_ms,
        })
    }

    pub fn target(&self) -> AppTarget {
        AppTarget::new(
            self.base_url.clone(),
            Duration::from_secs(self.readiness_timeout_secs),
        )
    }
}
