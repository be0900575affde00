//! The application under test: a locally running web server

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Where the toolbox app is served and how long to wait for it
#[derive(Debug, Clone)]
pub struct AppTarget {
    pub base_url: String,
    pub readiness_timeout: Duration,
    pub poll_interval: Duration,
}

impl AppTarget {
    pub fn new(base_url: impl Into<String>, readiness_timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            readiness_timeout,
            poll_interval: Duration::from_millis(250),
        }
    }

    /// Poll the base URL until it answers with a success status
    pub async fn wait_until_ready(&self) -> E2eResult<()> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = Instant::now();
        let mut attempts = 0;

        loop {
            attempts += 1;

            match client.get(&self.base_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    info!("Application is up at {}", self.base_url);
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Readiness check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for {} ...", self.base_url);
                    }
                    // Connection refused is expected while the dev server starts
                    if !e.is_connect() {
                        warn!("Readiness check error: {}", e);
                    }
                }
            }

            if start.elapsed() >= self.readiness_timeout {
                return Err(E2eError::AppUnreachable {
                    url: self.base_url.clone(),
                    attempts,
                });
            }

            sleep(self.poll_interval).await;
        }
    }
}
