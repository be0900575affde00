//! Toolbox UI verification
//!
//! Drives the developer toolbox web app through Playwright and checks what
//! the browser rendered:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 toolbox-verify (Rust)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  AppTarget::wait_until_ready()                              │
//! │  Scenario::load_all(dir) -> [Scenario]                      │
//! │  ScenarioRunner::run_all                                    │
//! │    ├── PageDriver::run(scenario) -> PageRun                 │
//! │    │     (steps, then one FrameCapture, then screenshot)    │
//! │    ├── FrameCapture::capture_all(elements)                  │
//! │    ├── toolbox_layout::evaluate(invariants)                 │
//! │    ├── ArtifactStore::compare(slug)   (optional baseline)   │
//! │    └── Report -> stdout, SuiteOutcome -> results.json       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod artifacts;
pub mod config;
pub mod error;
pub mod playwright;
pub mod runner;
pub mod scenario;
pub mod target;

pub use config::VerifyConfig;
pub use error::{E2eError, E2eResult};
pub use playwright::{PageDriver, PageRun, PlaywrightHandle};
pub use runner::{ScenarioOutcome, ScenarioRunner, ScenarioStatus, SuiteOutcome};
pub use scenario::{Locator, Scenario, Step};
