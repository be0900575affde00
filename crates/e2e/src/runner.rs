//! Runs scenarios one after another and collects their outcomes

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use toolbox_layout::{
    evaluate, measurements, CheckResult, FrameCapture, NamedElementMeasurement, Report, Severity,
};
use tracing::{debug, error, info};

use crate::artifacts::ArtifactStore;
use crate::error::{E2eError, E2eResult};
use crate::playwright::PageDriver;
use crate::scenario::Scenario;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    /// The scenario could not be checked at all
    Error,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub status: ScenarioStatus,
    pub duration_ms: u64,
    pub measurements: Vec<NamedElementMeasurement>,
    pub results: Vec<CheckResult>,
    pub screenshots: Vec<PathBuf>,
    pub error: Option<String>,
}

/// Result of running every selected scenario
#[derive(Debug, Clone, Serialize)]
pub struct SuiteOutcome {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub duration_ms: u64,
    pub scenarios: Vec<ScenarioOutcome>,
}

impl SuiteOutcome {
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }
}

struct Checked {
    measurements: Vec<NamedElementMeasurement>,
    results: Vec<CheckResult>,
    screenshots: Vec<PathBuf>,
}

/// A scenario that could not be checked, with whatever screenshots it left
struct Aborted {
    error: E2eError,
    screenshots: Vec<PathBuf>,
}

impl From<E2eError> for Aborted {
    fn from(error: E2eError) -> Self {
        Self {
            error,
            screenshots: vec![],
        }
    }
}

/// Drives each scenario's page, then checks it
pub struct ScenarioRunner<D> {
    driver: D,
    artifacts: ArtifactStore,
    output_dir: PathBuf,
    update_baselines: bool,
}

impl<D: PageDriver> ScenarioRunner<D> {
    pub fn new(driver: D, output_dir: &Path, update_baselines: bool) -> E2eResult<Self> {
        Ok(Self {
            driver,
            artifacts: ArtifactStore::new(output_dir)?,
            output_dir: output_dir.to_path_buf(),
            update_baselines,
        })
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    /// Run scenarios in order, printing each report to `out` as it finishes
    pub async fn run_all<W: Write>(
        &self,
        scenarios: &[Scenario],
        out: &mut W,
    ) -> E2eResult<SuiteOutcome> {
        let start = Instant::now();
        let mut outcomes = Vec::with_capacity(scenarios.len());

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            writeln!(out, "== {}", scenario.name)?;
            let outcome = self.run_scenario(scenario).await;

            if !outcome.results.is_empty() {
                write!(out, "{}", Report::new(outcome.results.clone()))?;
            }
            if let Some(e) = &outcome.error {
                writeln!(out, "ERROR {}", e)?;
            }
            for path in &outcome.screenshots {
                writeln!(out, "screenshot: {}", path.display())?;
            }

            outcomes.push(outcome);
        }

        let count = |status: ScenarioStatus| outcomes.iter().filter(|o| o.status == status).count();
        let passed = count(ScenarioStatus::Passed);
        let failed = count(ScenarioStatus::Failed);
        let errored = count(ScenarioStatus::Error);
        let duration_ms = start.elapsed().as_millis() as u64;

        writeln!(
            out,
            "\n{} passed, {} failed, {} errored ({} ms)",
            passed, failed, errored, duration_ms
        )?;

        Ok(SuiteOutcome {
            generated_at: Utc::now(),
            total: outcomes.len(),
            passed,
            failed,
            errored,
            duration_ms,
            scenarios: outcomes,
        })
    }

    /// Run one scenario; failures to check it end up in `error`
    pub async fn run_scenario(&self, scenario: &Scenario) -> ScenarioOutcome {
        let start = Instant::now();
        debug!("Running scenario: {}", scenario.name);

        let checked = self.check(scenario).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match checked {
            Ok(checked) => {
                let report = Report::new(checked.results.clone());
                let status = if report.is_success() {
                    info!("✓ {} ({} ms)", scenario.name, duration_ms);
                    ScenarioStatus::Passed
                } else {
                    error!("✗ {} - {} invariant(s) failed", scenario.name, report.failed);
                    ScenarioStatus::Failed
                };

                ScenarioOutcome {
                    name: scenario.name.clone(),
                    status,
                    duration_ms,
                    measurements: checked.measurements,
                    results: checked.results,
                    screenshots: checked.screenshots,
                    error: None,
                }
            }
            Err(aborted) => {
                error!("✗ {} - {}", scenario.name, aborted.error);

                let mut screenshots = aborted.screenshots;
                let error_shot = self.artifacts.error_screenshot_path(&scenario.artifact_slug());
                if error_shot.exists() {
                    screenshots.push(error_shot);
                }

                ScenarioOutcome {
                    name: scenario.name.clone(),
                    status: ScenarioStatus::Error,
                    duration_ms,
                    measurements: vec![],
                    results: vec![],
                    screenshots,
                    error: Some(aborted.error.to_string()),
                }
            }
        }
    }

    async fn check(&self, scenario: &Scenario) -> Result<Checked, Aborted> {
        // A stale error screenshot from an earlier run would be misleading
        let error_shot = self.artifacts.error_screenshot_path(&scenario.artifact_slug());
        if error_shot.exists() {
            std::fs::remove_file(&error_shot).map_err(E2eError::from)?;
        }

        let run = self.driver.run(scenario, &self.artifacts).await?;

        match self.check_frame(scenario, &run.frame) {
            Ok((measurements, results)) => Ok(Checked {
                measurements,
                results,
                screenshots: run.screenshots,
            }),
            Err(error) => Err(Aborted {
                error,
                screenshots: run.screenshots,
            }),
        }
    }

    fn check_frame(
        &self,
        scenario: &Scenario,
        frame: &FrameCapture,
    ) -> E2eResult<(Vec<NamedElementMeasurement>, Vec<CheckResult>)> {
        // Everything is captured before anything is evaluated
        let captured = frame.capture_all(scenario.elements.keys())?;
        let mut results = evaluate(&scenario.invariants, &measurements(&captured))?;

        if let Some(baseline) = &scenario.baseline {
            results.push(self.baseline_check(&scenario.artifact_slug(), baseline.threshold)?);
        }

        Ok((captured, results))
    }

    fn baseline_check(&self, slug: &str, threshold: f64) -> E2eResult<CheckResult> {
        let description = format!("screenshot '{}' matches baseline", slug);

        if self.update_baselines {
            self.artifacts.update_baseline(slug)?;
            return Ok(CheckResult::pass(description, "baseline updated"));
        }

        match self.artifacts.compare(slug, threshold) {
            Ok(diff) => Ok(diff.to_check_result(slug, threshold)),
            Err(E2eError::BaselineNotFound(_)) => {
                info!("No baseline for '{}' - create one with --update-baselines", slug);
                let mut result = CheckResult::fail(description, "no baseline recorded yet");
                result.severity = Severity::Warning;
                Ok(result)
            }
            Err(e) => Err(e),
        }
    }

    /// Write the suite outcome as pretty JSON
    pub fn write_results(&self, outcome: &SuiteOutcome) -> E2eResult<PathBuf> {
        let path = self.output_dir.join("results.json");
        std::fs::write(&path, serde_json::to_string_pretty(outcome)?)?;
        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
