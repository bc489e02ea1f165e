use std::time::Duration;

/// The slice of a completed response that checks are allowed to look at.
#[derive(Debug, Clone, Copy)]
pub struct Observation {
    pub status: u16,
    pub duration: Duration,
}

/// A named boolean assertion over one response. Evaluation is a pure
/// predicate; a failing check is recorded, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Response status code equals the given code.
    StatusIs(u16),
    /// Response time is strictly below the given threshold.
    ResponseTimeUnder(Duration),
}

impl Check {
    pub fn name(&self) -> String {
        match self {
            Check::StatusIs(code) => format!("status is {}", code),
            Check::ResponseTimeUnder(limit) => {
                format!("response time is less than {}ms", limit.as_millis())
            }
        }
    }

    pub fn evaluate(&self, observation: &Observation) -> bool {
        match self {
            Check::StatusIs(code) => observation.status == *code,
            Check::ResponseTimeUnder(limit) => observation.duration < *limit,
        }
    }
}

/// Outcome of one check against one response.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
}

pub fn evaluate_all(checks: &[Check], observation: &Observation) -> Vec<CheckResult> {
    checks
        .iter()
        .map(|check| CheckResult {
            name: check.name(),
            passed: check.evaluate(observation),
        })
        .collect()
}
