//! Declarative YAML verification scenarios

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use toolbox_layout::Invariant;
use walkdir::WalkDir;

use crate::artifacts::slugify;
use crate::error::{E2eError, E2eResult};

/// One verification scenario: drive the page, measure elements, check invariants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Viewport size for the browser
    #[serde(default)]
    pub viewport: Viewport,

    /// Page to open, relative to the base URL
    #[serde(default = "default_url")]
    pub url: String,

    /// Element that must be visible before any step runs
    #[serde(default)]
    pub ready: Option<Locator>,

    /// Interaction steps, executed in order
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Logical element names measured once all steps are done
    #[serde(default)]
    pub elements: BTreeMap<String, Locator>,

    /// Layout invariants over the measured elements
    #[serde(default)]
    pub invariants: Vec<Invariant>,

    /// Slug for the final full-page screenshot (defaults to the slugified name)
    #[serde(default)]
    pub screenshot: Option<String>,

    /// Compare the final screenshot against a stored baseline
    #[serde(default)]
    pub baseline: Option<BaselineSpec>,
}

fn default_url() -> String {
    "/".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280, height: 720 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineSpec {
    /// Allowed share of differing pixels (0.0 - 100.0 percent)
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    0.5
}

/// How to find an element on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Locator {
    /// Accessible role, optionally narrowed by accessible name
    Role {
        role: String,
        #[serde(default)]
        name: Option<String>,
    },
    /// Visible text
    Text { text: String },
    /// CSS selector
    Css { css: String },
    /// Input placeholder text
    Placeholder { placeholder: String },
}

impl Locator {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn css(css: impl Into<String>) -> Self {
        Self::Css { css: css.into() }
    }

    pub fn placeholder(placeholder: impl Into<String>) -> Self {
        Self::Placeholder {
            placeholder: placeholder.into(),
        }
    }

    pub fn role(role: impl Into<String>, name: Option<&str>) -> Self {
        Self::Role {
            role: role.into(),
            name: name.map(String::from),
        }
    }

    /// Short human-readable form used in step names and logs
    pub fn describe(&self) -> String {
        match self {
            Locator::Role { role, name: Some(name) } => format!("role={}[{}]", role, name),
            Locator::Role { role, name: None } => format!("role={}", role),
            Locator::Text { text } => format!("text={}", text),
            Locator::Css { css } => format!("css={}", css),
            Locator::Placeholder { placeholder } => format!("placeholder={}", placeholder),
        }
    }
}

/// A single interaction step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Navigate to another URL (relative to base)
    Navigate {
        url: String,
        #[serde(default)]
        ready: Option<Locator>,
    },

    /// Replace the value of an input field
    Fill { target: Locator, value: String },

    /// Click an element
    Click {
        target: Locator,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Wait for an element to reach a state
    Wait {
        target: Locator,
        #[serde(default = "default_wait_timeout")]
        timeout_ms: u64,
        #[serde(default)]
        state: WaitState,
    },

    /// Wait for a fixed amount of time (use sparingly)
    Sleep { ms: u64 },

    /// Fail the scenario unless the element is visible right now
    ExpectVisible { target: Locator },

    /// Take an intermediate screenshot
    Screenshot {
        name: String,
        #[serde(default = "default_full_page")]
        full_page: bool,
    },

    /// Log a message (for debugging)
    Log { message: String },
}

fn default_wait_timeout() -> u64 {
    5000
}

fn default_full_page() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl WaitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitState::Visible => "visible",
            WaitState::Hidden => "hidden",
            WaitState::Attached => "attached",
            WaitState::Detached => "detached",
        }
    }
}

impl Step {
    /// Label used in logs and in the generated script
    pub fn name(&self) -> String {
        match self {
            Step::Navigate { url, .. } => format!("navigate:{}", url),
            Step::Fill { target, .. } => format!("fill:{}", target.describe()),
            Step::Click { target, .. } => format!("click:{}", target.describe()),
            Step::Wait { target, state, .. } => {
                format!("wait:{}:{}", target.describe(), state.as_str())
            }
            Step::Sleep { ms } => format!("sleep:{}ms", ms),
            Step::ExpectVisible { target } => format!("expect_visible:{}", target.describe()),
            Step::Screenshot { name, .. } => format!("screenshot:{}", name),
            Step::Log { message } => {
                format!("log:{}", message.chars().take(30).collect::<String>())
            }
        }
    }
}

impl Scenario {
    /// Parse a scenario from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let scenario: Self = serde_yaml::from_str(yaml)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| match e {
            E2eError::Yaml(err) => {
                E2eError::ScenarioParse(format!("{}: {}", path.display(), err))
            }
            other => other,
        })
    }

    /// Load all scenarios under a directory, ordered by file name
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut scenarios = Vec::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            let is_yaml = entry
                .path()
                .extension()
                .map(|ext| ext == "yaml" || ext == "yml")
                .unwrap_or(false);

            if entry.file_type().is_file() && is_yaml {
                scenarios.push(Self::from_file(entry.path())?);
            }
        }

        Ok(scenarios)
    }

    /// Keep only scenarios carrying `tag`
    pub fn filter_by_tag(scenarios: Vec<Self>, tag: &str) -> Vec<Self> {
        scenarios
            .into_iter()
            .filter(|s| s.tags.iter().any(|t| t == tag))
            .collect()
    }

    /// File stem of the final screenshot
    pub fn artifact_slug(&self) -> String {
        match &self.screenshot {
            Some(slug) => slugify(slug),
            None => slugify(&self.name),
        }
    }

    fn validate(&self) -> E2eResult<()> {
        if self.name.trim().is_empty() {
            return Err(E2eError::ScenarioParse("scenario name is empty".to_string()));
        }
        if self.artifact_slug().is_empty() {
            return Err(E2eError::ScenarioParse(format!(
                "scenario '{}' has no usable screenshot slug",
                self.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolbox_layout::{InvariantKind, Severity};

    const UPLOAD_OVERLAP: &str = r#"
name: Image upload overlap
description: The file input must stay inside the drop zone
tags:
  - layout
  - image
ready:
  text: 程序员百宝箱
steps:
  - action: click
    target:
      text: 图片压缩/转换
  - action: wait
    target:
      text: Click to upload or drag and drop
elements:
  file_input:
    css: "input[type='file']"
  drop_zone:
    css: div.border-dashed
  header:
    text: Image Compressor & Converter
invariants:
  - description: File input is no taller than the drop zone
    kind: size_ratio
    subject: file_input
    reference: drop_zone
    factor: 1.5
  - description: File input does not cover the header
    severity: warning
    kind: non_overlap
    subject: file_input
    above: header
screenshot: repro_screenshot
"#;

    #[test]
    fn test_parse_layout_scenario() {
        let scenario = Scenario::from_yaml(UPLOAD_OVERLAP).unwrap();
        assert_eq!(scenario.url, "/");
        assert_eq!(scenario.viewport, Viewport::default());
        assert_eq!(scenario.steps.len(), 2);
        assert_eq!(scenario.elements.len(), 3);
        assert_eq!(scenario.elements["drop_zone"], Locator::css("div.border-dashed"));
        assert_eq!(scenario.ready, Some(Locator::text("程序员百宝箱")));

        assert!(matches!(
            scenario.invariants[0].kind,
            InvariantKind::SizeRatio { factor, .. } if factor == 1.5
        ));
        assert_eq!(scenario.invariants[1].severity, Severity::Warning);
        assert_eq!(scenario.artifact_slug(), "repro_screenshot");
    }

    #[test]
    fn test_parse_role_and_placeholder() {
        let yaml = r#"
name: headshot tool
steps:
  - action: fill
    target:
      placeholder: 搜索工具...
    value: 大头照
  - action: click
    target:
      role: button
      name: 大头照提取
  - action: expect_visible
    target:
      text: 大头照提取 (Headshot Extraction)
"#;
        let scenario = Scenario::from_yaml(yaml).unwrap();
        match &scenario.steps[1] {
            Step::Click { target, timeout_ms } => {
                assert_eq!(*target, Locator::role("button", Some("大头照提取")));
                assert!(timeout_ms.is_none());
            }
            other => panic!("unexpected step {:?}", other),
        }
        assert_eq!(scenario.steps[0].name(), "fill:placeholder=搜索工具...");
        assert_eq!(scenario.artifact_slug(), "headshot-tool");
    }

    #[test]
    fn test_wait_defaults() {
        let yaml = r##"
name: wait
steps:
  - action: wait
    target:
      css: "#app"
"##;
        let scenario = Scenario::from_yaml(yaml).unwrap();
        match &scenario.steps[0] {
            Step::Wait { timeout_ms, state, .. } => {
                assert_eq!(*timeout_ms, 5000);
                assert_eq!(*state, WaitState::Visible);
            }
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_rejects_empty_name() {
        let err = Scenario::from_yaml("name: '  '\n").unwrap_err();
        assert!(matches!(err, E2eError::ScenarioParse(_)));
    }

    #[test]
    fn test_rejects_unknown_action() {
        let yaml = "name: x\nsteps:\n  - action: teleport\n";
        assert!(matches!(Scenario::from_yaml(yaml), Err(E2eError::Yaml(_))));
    }

    #[test]
    fn test_filter_by_tag() {
        let layout = Scenario::from_yaml(UPLOAD_OVERLAP).unwrap();
        let plain = Scenario::from_yaml("name: plain\n").unwrap();
        let all = vec![layout, plain];
        let filtered = Scenario::filter_by_tag(all, "layout");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Image upload overlap");
    }
}
