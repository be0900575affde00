//! Playwright browser automation
//!
//! Each scenario becomes one Node.js script: open the page, run the steps,
//! read every element's bounding boxes back-to-back, print them as a single
//! marker line, then take the final screenshot.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command as TokioCommand;
use toolbox_layout::FrameCapture;
use tracing::{debug, info};

use crate::artifacts::{slugify, ArtifactStore};
use crate::error::{E2eError, E2eResult};
use crate::scenario::{Locator, Scenario, Step};

/// Prefix of the stdout line carrying the captured frame
pub const FRAME_MARKER: &str = "@@frame ";

static FRAME_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^@@frame (.+)$").expect("valid regex"));

/// What a driver hands back after running a scenario's page
#[derive(Debug, Clone)]
pub struct PageRun {
    /// Bounding boxes of every declared element, from one page state
    pub frame: FrameCapture,

    /// Screenshots written, in the order they were taken
    pub screenshots: Vec<PathBuf>,
}

/// The browser collaborator: drives a page through a scenario
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn run(&self, scenario: &Scenario, artifacts: &ArtifactStore) -> E2eResult<PageRun>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "chromium" => Some(Browser::Chromium),
            "firefox" => Some(Browser::Firefox),
            "webkit" => Some(Browser::Webkit),
            _ => None,
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub browser: Browser,
    pub headless: bool,

    /// Directory whose `node_modules` provides the `playwright` package
    pub project_dir: PathBuf,

    /// Upper bound for one scenario script
    pub script_timeout: Duration,

    /// Default timeout for clicks and the ready wait
    pub action_timeout_ms: u64,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            browser: Browser::Chromium,
            headless: true,
            project_dir: PathBuf::from("."),
            script_timeout: Duration::from_secs(60),
            action_timeout_ms: 5000,
        }
    }
}

/// Playwright browser handle
pub struct PlaywrightHandle {
    config: PlaywrightConfig,
}

impl PlaywrightHandle {
    pub fn new(config: PlaywrightConfig) -> Self {
        Self { config }
    }

    /// Check if Playwright is installed
    pub fn check_installed(&self) -> E2eResult<()> {
        let status = Command::new("npx")
            .args(["playwright", "--version"])
            .current_dir(&self.config.project_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Absolute URL for a scenario path
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!(
                "{}/{}",
                self.config.base_url.trim_end_matches('/'),
                url.trim_start_matches('/')
            )
        }
    }

    /// Build the Playwright script for a scenario
    pub fn build_script(&self, scenario: &Scenario, artifacts: &ArtifactStore) -> String {
        let slug = scenario.artifact_slug();
        let mut script = String::new();

        script.push_str(&format!(
            r#"const {{ chromium, firefox, webkit }} = require('playwright');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();

  try {{
    await page.goto({url});
"#,
            browser = self.config.browser.as_str(),
            headless = self.config.headless,
            width = scenario.viewport.width,
            height = scenario.viewport.height,
            url = js_str(&self.resolve_url(&scenario.url)),
        ));

        if let Some(ready) = &scenario.ready {
            script.push_str(&self.wait_visible_js(ready));
        }

        for (i, step) in scenario.steps.iter().enumerate() {
            script.push_str(&format!("\n    // Step {}: {}\n", i + 1, step.name()));
            script.push_str(&self.step_to_js(step, artifacts));
        }

        script.push_str("\n    // Measure all elements from the same page state\n");
        script.push_str("    const frame = { elements: {} };\n");
        script.push_str("    for (const [name, locator] of [\n");
        for (name, locator) in &scenario.elements {
            script.push_str(&format!("      [{}, {}],\n", js_str(name), locator_js(locator)));
        }
        script.push_str(
            r#"    ]) {
      const count = await locator.count();
      const boxes = [];
      for (let i = 0; i < count; i++) {
        boxes.push(await locator.nth(i).boundingBox());
      }
      frame.elements[name] = boxes;
    }
"#,
        );
        script.push_str(&format!(
            "    console.log({} + JSON.stringify(frame));\n",
            js_str(FRAME_MARKER)
        ));

        script.push_str(&format!(
            r#"    await page.screenshot({{ path: {path}, fullPage: true }});
  }} catch (error) {{
    try {{
      await page.screenshot({{ path: {error_path}, fullPage: true }});
    }} catch (_) {{}}
    console.error(JSON.stringify({{ success: false, error: error.message, stack: error.stack }}));
    process.exitCode = 1;
  }} finally {{
    await browser.close();
  }}
}})();
"#,
            path = js_str(&artifacts.screenshot_path(&slug).to_string_lossy()),
            error_path = js_str(&artifacts.error_screenshot_path(&slug).to_string_lossy()),
        ));

        script
    }

    fn wait_visible_js(&self, locator: &Locator) -> String {
        format!(
            "    await {}.waitFor({{ state: 'visible', timeout: {} }});\n",
            locator_js(locator),
            self.config.action_timeout_ms
        )
    }

    /// Convert a step to JavaScript code
    fn step_to_js(&self, step: &Step, artifacts: &ArtifactStore) -> String {
        match step {
            Step::Navigate { url, ready } => {
                let mut js = format!("    await page.goto({});\n", js_str(&self.resolve_url(url)));
                if let Some(ready) = ready {
                    js.push_str(&self.wait_visible_js(ready));
                }
                js
            }
            Step::Fill { target, value } => {
                format!("    await {}.fill({});\n", locator_js(target), js_str(value))
            }
            Step::Click { target, timeout_ms } => format!(
                "    await {}.click({{ timeout: {} }});\n",
                locator_js(target),
                timeout_ms.unwrap_or(self.config.action_timeout_ms)
            ),
            Step::Wait {
                target,
                timeout_ms,
                state,
            } => format!(
                "    await {}.waitFor({{ state: '{}', timeout: {} }});\n",
                locator_js(target),
                state.as_str(),
                timeout_ms
            ),
            Step::Sleep { ms } => format!("    await page.waitForTimeout({});\n", ms),
            Step::ExpectVisible { target } => format!(
                "    if (!(await {}.isVisible())) {{\n      throw new Error({});\n    }}\n",
                locator_js(target),
                js_str(&format!("expected {} to be visible", target.describe()))
            ),
            Step::Screenshot { name, full_page } => format!(
                "    await page.screenshot({{ path: {}, fullPage: {} }});\n",
                js_str(&artifacts.screenshot_path(&slugify(name)).to_string_lossy()),
                full_page
            ),
            Step::Log { message } => {
                format!("    console.log({});\n", js_str(&format!("[scenario] {}", message)))
            }
        }
    }

    /// Execute a script via node, returning its stdout
    pub async fn run_script(&self, script: &str) -> E2eResult<String> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("scenario.js");
        std::fs::write(&script_path, script)?;

        debug!("Running Playwright script: {}", script_path.display());

        let mut cmd = TokioCommand::new("node");
        cmd.arg(&script_path)
            .current_dir(&self.config.project_dir)
            .env("NODE_PATH", self.config.project_dir.join("node_modules"))
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.config.script_timeout, cmd.output())
            .await
            .map_err(|_| {
                E2eError::Playwright(format!(
                    "Script timed out after {}s",
                    self.config.script_timeout.as_secs()
                ))
            })??;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(E2eError::Playwright(format!(
                "Script failed:\nstdout: {}\nstderr: {}",
                stdout.trim(),
                stderr.trim()
            )));
        }

        Ok(stdout)
    }
}

#[async_trait]
impl PageDriver for PlaywrightHandle {
    async fn run(&self, scenario: &Scenario, artifacts: &ArtifactStore) -> E2eResult<PageRun> {
        let script = self.build_script(scenario, artifacts);
        let stdout = self.run_script(&script).await?;

        for line in stdout.lines().filter(|l| !l.starts_with(FRAME_MARKER)) {
            info!("[{}] {}", scenario.name, line);
        }

        let frame = parse_frame(&stdout)?
            .ok_or_else(|| E2eError::FrameMissing(scenario.name.clone()))?;

        let mut screenshots: Vec<PathBuf> = scenario
            .steps
            .iter()
            .filter_map(|step| match step {
                Step::Screenshot { name, .. } => Some(artifacts.screenshot_path(&slugify(name))),
                _ => None,
            })
            .collect();
        screenshots.push(artifacts.screenshot_path(&scenario.artifact_slug()));

        Ok(PageRun { frame, screenshots })
    }
}

/// Extract the captured frame from script output.
///
/// The last marker line wins; `None` when the script printed none.
pub fn parse_frame(stdout: &str) -> E2eResult<Option<FrameCapture>> {
    FRAME_LINE
        .captures_iter(stdout)
        .last()
        .map(|caps| serde_json::from_str(caps[1].trim_end()).map_err(E2eError::from))
        .transpose()
}

/// JavaScript expression locating `locator` on `page`
pub fn locator_js(locator: &Locator) -> String {
    match locator {
        Locator::Role { role, name: Some(name) } => {
            format!("page.getByRole({}, {{ name: {} }})", js_str(role), js_str(name))
        }
        Locator::Role { role, name: None } => format!("page.getByRole({})", js_str(role)),
        Locator::Text { text } => format!("page.getByText({})", js_str(text)),
        Locator::Css { css } => format!("page.locator({})", js_str(css)),
        Locator::Placeholder { placeholder } => {
            format!("page.getByPlaceholder({})", js_str(placeholder))
        }
    }
}

/// A JSON string literal is a valid JavaScript string literal
fn js_str(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}
