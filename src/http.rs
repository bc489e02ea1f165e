use crate::checks::{evaluate_all, Check, Observation};
use crate::driver::runner::{IterationBody, IterationOutcome};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

/// The iteration body the CLI runs: GET the scenario URL, time it, grade
/// the response. One client is shared by every virtual user so connections
/// get pooled.
pub struct HttpIteration {
    client: Client,
    url: String,
    checks: Vec<Check>,
}

impl HttpIteration {
    pub fn new(url: String, timeout: Duration, checks: Vec<Check>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url,
            checks,
        })
    }
}

#[async_trait]
impl IterationBody for HttpIteration {
    async fn run(&self) -> IterationOutcome {
        let started = Instant::now();

        match self.client.get(&self.url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                // Drain the body so the connection can be reused; the
                // measured time covers the full response.
                let _ = response.bytes().await;
                let duration = started.elapsed();

                let observation = Observation { status, duration };
                IterationOutcome::Completed {
                    status,
                    duration,
                    checks: evaluate_all(&self.checks, &observation),
                }
            }
            Err(e) => IterationOutcome::TransportError {
                error: e.to_string(),
            },
        }
    }
}
