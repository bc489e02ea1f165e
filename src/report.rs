use crate::driver::metrics::RunResults;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// JSON run report written with `--output`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub scenario: String,
    pub timestamp: DateTime<Utc>,
    pub results: RunResults,
}

impl RunReport {
    pub fn new(scenario: &str, results: RunResults) -> Self {
        Self {
            scenario: scenario.to_string(),
            timestamp: Utc::now(),
            results,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
