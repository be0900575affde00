//! toolbox-verify
//!
//! Runs every verification scenario against the locally served toolbox app
//! and prints one PASS/FAIL line per check. Exit status: 0 when everything
//! passed, 1 when a check failed or a scenario could not be checked, 2 when
//! the run itself could not be carried out.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use toolbox_e2e::{
    E2eError, E2eResult, PlaywrightHandle, Scenario, ScenarioRunner, VerifyConfig,
};

#[derive(Parser, Debug)]
#[command(name = "toolbox-verify")]
#[command(about = "Browser verification and layout checks for the developer toolbox")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory containing scenario YAML files
    #[arg(short, long)]
    scenarios: Option<PathBuf>,

    /// Base URL of the running app
    #[arg(long)]
    base_url: Option<String>,

    /// Output directory for screenshots and results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run only scenarios with this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only the scenario with this name
    #[arg(short, long)]
    name: Option<String>,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long)]
    browser: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Replace baselines with this run's screenshots
    #[arg(long)]
    update_baselines: bool,

    /// Do not wait for the app to answer before starting
    #[arg(long)]
    skip_readiness: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // stdout carries the report
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            return ExitCode::from(2);
        }
    };

    match runtime.block_on(run(args)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("Verification run aborted: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(args: Args) -> E2eResult<bool> {
    let mut config = match &args.config {
        Some(path) => VerifyConfig::load(path)?,
        None => VerifyConfig::default(),
    };

    if let Some(scenarios) = args.scenarios {
        config.scenarios_dir = scenarios;
    }
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if let Some(browser) = args.browser {
        config.browser = browser;
    }
    if args.headed {
        config.headless = false;
    }
    if args.update_baselines {
        config.update_baselines = true;
    }

    info!("toolbox-verify v{}", env!("CARGO_PKG_VERSION"));

    let mut scenarios = Scenario::load_all(&config.scenarios_dir)?;
    if let Some(tag) = &args.tag {
        scenarios = Scenario::filter_by_tag(scenarios, tag);
    }
    if let Some(name) = &args.name {
        scenarios.retain(|s| &s.name == name);
        if scenarios.is_empty() {
            return Err(E2eError::ScenarioParse(format!("Scenario not found: {}", name)));
        }
    }
    if scenarios.is_empty() {
        warn!("No scenarios found in {}", config.scenarios_dir.display());
    }

    if !args.skip_readiness {
        config.target().wait_until_ready().await?;
    }

    let driver = PlaywrightHandle::new(config.playwright()?);
    driver.check_installed()?;

    let runner = ScenarioRunner::new(driver, &config.output_dir, config.update_baselines)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = runner.run_all(&scenarios, &mut out).await?;
    runner.write_results(&outcome)?;

    Ok(outcome.is_success())
}
