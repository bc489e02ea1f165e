use crate::driver::runner::IterationOutcome;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Pass/fail tally for one named check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckCounter {
    pub passes: u64,
    pub fails: u64,
}

/// Running totals for a single load run. Shared by every virtual user
/// behind one lock; all state dies with the run.
#[derive(Debug, Clone)]
pub struct RunMetrics {
    start_time: Instant,
    response_times: Vec<Duration>,
    iterations: u64,
    transport_errors: u64,
    last_transport_error: Option<String>,
    status_codes: HashMap<u16, u64>,
    checks: IndexMap<String, CheckCounter>,
}

impl RunMetrics {
    /// Check names are seeded up front so the summary lists every check
    /// even when no iteration ever completed.
    pub fn new(check_names: impl IntoIterator<Item = String>) -> Self {
        Self {
            start_time: Instant::now(),
            response_times: Vec::new(),
            iterations: 0,
            transport_errors: 0,
            last_transport_error: None,
            status_codes: HashMap::new(),
            checks: check_names
                .into_iter()
                .map(|name| (name, CheckCounter::default()))
                .collect(),
        }
    }

    pub fn record_iteration(&mut self, outcome: &IterationOutcome) {
        self.iterations += 1;

        match outcome {
            IterationOutcome::Completed {
                status,
                duration,
                checks,
            } => {
                self.response_times.push(*duration);
                *self.status_codes.entry(*status).or_insert(0) += 1;

                for check in checks {
                    let counter = self.checks.entry(check.name.clone()).or_default();
                    if check.passed {
                        counter.passes += 1;
                    } else {
                        counter.fails += 1;
                    }
                }
            }
            IterationOutcome::TransportError { error } => {
                self.transport_errors += 1;
                self.last_transport_error = Some(error.clone());
            }
        }
    }

    pub fn summarize(&self) -> RunResults {
        let total_duration = self.start_time.elapsed();

        if self.response_times.is_empty() {
            return RunResults {
                iterations: self.iterations,
                transport_errors: self.transport_errors,
                last_transport_error: self.last_transport_error.clone(),
                requests_per_second: 0.0,
                total_duration,
                average_response_time: Duration::ZERO,
                min_response_time: Duration::ZERO,
                max_response_time: Duration::ZERO,
                p50_response_time: Duration::ZERO,
                p95_response_time: Duration::ZERO,
                p99_response_time: Duration::ZERO,
                status_codes: self.status_codes.clone(),
                checks: self.checks.clone(),
            };
        }

        let mut sorted_times = self.response_times.clone();
        sorted_times.sort();

        let average = Duration::from_nanos(
            (sorted_times.iter().map(|d| d.as_nanos()).sum::<u128>() / sorted_times.len() as u128)
                as u64,
        );

        let p50_index = sorted_times.len() * 50 / 100;
        let p95_index = sorted_times.len() * 95 / 100;
        let p99_index = sorted_times.len() * 99 / 100;

        RunResults {
            iterations: self.iterations,
            transport_errors: self.transport_errors,
            last_transport_error: self.last_transport_error.clone(),
            requests_per_second: self.iterations as f64 / total_duration.as_secs_f64(),
            total_duration,
            average_response_time: average,
            min_response_time: sorted_times.first().copied().unwrap_or(Duration::ZERO),
            max_response_time: sorted_times.last().copied().unwrap_or(Duration::ZERO),
            p50_response_time: sorted_times.get(p50_index).copied().unwrap_or(Duration::ZERO),
            p95_response_time: sorted_times.get(p95_index).copied().unwrap_or(Duration::ZERO),
            p99_response_time: sorted_times.get(p99_index).copied().unwrap_or(Duration::ZERO),
            status_codes: self.status_codes.clone(),
            checks: self.checks.clone(),
        }
    }
}

/// Aggregate outcome of one finished (or in-flight, for progress reports)
/// load run.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunResults {
    pub iterations: u64,
    pub transport_errors: u64,
    pub last_transport_error: Option<String>,
    pub requests_per_second: f64,

    #[serde(with = "duration_millis")]
    pub total_duration: Duration,
    #[serde(with = "duration_millis")]
    pub average_response_time: Duration,
    #[serde(with = "duration_millis")]
    pub min_response_time: Duration,
    #[serde(with = "duration_millis")]
    pub max_response_time: Duration,
    #[serde(with = "duration_millis")]
    pub p50_response_time: Duration,
    #[serde(with = "duration_millis")]
    pub p95_response_time: Duration,
    #[serde(with = "duration_millis")]
    pub p99_response_time: Duration,

    pub status_codes: HashMap<u16, u64>,
    pub checks: IndexMap<String, CheckCounter>,
}

impl RunResults {
    /// Fraction of all check evaluations that passed; 1.0 when nothing has
    /// been evaluated yet.
    pub fn overall_pass_rate(&self) -> f64 {
        let (passes, total) = self
            .checks
            .values()
            .fold((0u64, 0u64), |(passes, total), counter| {
                (passes + counter.passes, total + counter.passes + counter.fails)
            });

        if total == 0 {
            1.0
        } else {
            passes as f64 / total as f64
        }
    }

    pub fn all_checks_passed(&self) -> bool {
        self.checks.values().all(|counter| counter.fails == 0)
    }
}

// Durations serialize as integer milliseconds in reports.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
