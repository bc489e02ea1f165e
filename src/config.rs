use crate::checks::Check;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Problems a scenario file can have beyond not parsing at all. These are
/// rejected before any virtual user starts.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario has no stages")]
    NoStages,
    #[error("stage {index} has a zero duration")]
    ZeroDurationStage { index: usize },
    #[error("invalid target URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("unsupported URL scheme '{scheme}' (only http and https)")]
    UnsupportedScheme { scheme: String },
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
    #[error("response time limit must be greater than zero")]
    ZeroResponseTimeLimit,
}

/// A time-bounded ramp target for virtual-user concurrency.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Stage {
    #[serde(with = "duration_str")]
    pub duration: Duration,
    pub target: u32,
}

/// Thresholds behind the named per-response checks.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CheckConfig {
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default = "default_max_response_time", with = "duration_str")]
    pub max_response_time: Duration,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            status: default_status(),
            max_response_time: default_max_response_time(),
        }
    }
}

/// One load scenario: a target URL plus the concurrency ramp to drive at it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Scenario {
    pub name: Option<String>,
    pub url: String,
    pub stages: Vec<Stage>,
    /// Concurrency the first stage ramps from.
    #[serde(default = "default_start_vus")]
    pub start_vus: u32,
    /// Optional think time between iterations of one virtual user.
    #[serde(default, with = "opt_duration_str")]
    pub pause: Option<Duration>,
    /// Per-request timeout.
    #[serde(default = "default_timeout", with = "duration_str")]
    pub timeout: Duration,
    #[serde(default)]
    pub checks: CheckConfig,
}

fn default_status() -> u16 {
    200
}

fn default_max_response_time() -> Duration {
    Duration::from_millis(500)
}

fn default_start_vus() -> u32 {
    1
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;

        let scenario: Scenario = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML in scenario file: {}", path.display()))?;

        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.stages.is_empty() {
            return Err(ScenarioError::NoStages);
        }

        for (index, stage) in self.stages.iter().enumerate() {
            if stage.duration.is_zero() {
                return Err(ScenarioError::ZeroDurationStage { index });
            }
        }

        let url = Url::parse(&self.url).map_err(|e| ScenarioError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ScenarioError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
            });
        }

        if self.timeout.is_zero() {
            return Err(ScenarioError::ZeroTimeout);
        }
        if self.checks.max_response_time.is_zero() {
            return Err(ScenarioError::ZeroResponseTimeLimit);
        }

        Ok(())
    }

    /// The checks every iteration evaluates, in reporting order.
    pub fn checks(&self) -> Vec<Check> {
        vec![
            Check::StatusIs(self.checks.status),
            Check::ResponseTimeUnder(self.checks.max_response_time),
        ]
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed scenario")
    }
}

/// Serialize durations as the same human strings the scenario file uses.
pub(crate) mod duration_str {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&crate::utils::format_duration(duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        crate::utils::parse_duration(&raw).map_err(Error::custom)
    }
}

pub(crate) mod opt_duration_str {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&crate::utils::format_duration(d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => crate::utils::parse_duration(&raw)
                .map(Some)
                .map_err(Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smoke_yaml() -> &'static str {
        r#"
name: smoke
url: http://localhost:8080
stages:
  - duration: 5s
    target: 1
"#
    }

    #[test]
    fn parses_minimal_scenario_with_defaults() {
        let scenario: Scenario = serde_yaml::from_str(smoke_yaml()).unwrap();
        assert_eq!(scenario.name.as_deref(), Some("smoke"));
        assert_eq!(scenario.url, "http://localhost:8080");
        assert_eq!(scenario.stages.len(), 1);
        assert_eq!(scenario.stages[0].duration, Duration::from_secs(5));
        assert_eq!(scenario.stages[0].target, 1);
        assert_eq!(scenario.start_vus, 1);
        assert_eq!(scenario.pause, None);
        assert_eq!(scenario.timeout, Duration::from_secs(30));
        assert_eq!(scenario.checks.status, 200);
        assert_eq!(scenario.checks.max_response_time, Duration::from_millis(500));
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn parses_full_scenario() {
        let yaml = r#"
name: ramp
url: https://api.example.com/health
start_vus: 2
pause: 1s
timeout: 10s
stages:
  - duration: 30s
    target: 20
  - duration: 1m
    target: 20
  - duration: 30s
    target: 0
checks:
  status: 204
  max_response_time: 250ms
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(scenario.stages.len(), 3);
        assert_eq!(scenario.stages[1].duration, Duration::from_secs(60));
        assert_eq!(scenario.start_vus, 2);
        assert_eq!(scenario.pause, Some(Duration::from_secs(1)));
        assert_eq!(scenario.timeout, Duration::from_secs(10));
        assert_eq!(scenario.checks.status, 204);
        assert_eq!(scenario.checks.max_response_time, Duration::from_millis(250));
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn check_names_follow_configured_thresholds() {
        let scenario: Scenario = serde_yaml::from_str(smoke_yaml()).unwrap();
        let names: Vec<String> = scenario.checks().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec!["status is 200", "response time is less than 500ms"]
        );
    }

    #[test]
    fn rejects_empty_stage_list() {
        let yaml = r#"
url: http://localhost:8080
stages: []
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(scenario.validate(), Err(ScenarioError::NoStages)));
    }

    #[test]
    fn rejects_zero_duration_stage() {
        let yaml = r#"
url: http://localhost:8080
stages:
  - duration: 0s
    target: 1
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::ZeroDurationStage { index: 0 })
        ));
    }

    #[test]
    fn rejects_negative_stage_values_at_parse_time() {
        let yaml = r#"
url: http://localhost:8080
stages:
  - duration: -5s
    target: 1
"#;
        assert!(serde_yaml::from_str::<Scenario>(yaml).is_err());

        let yaml = r#"
url: http://localhost:8080
stages:
  - duration: 5s
    target: -1
"#;
        assert!(serde_yaml::from_str::<Scenario>(yaml).is_err());
    }

    #[test]
    fn rejects_non_http_url() {
        let yaml = r#"
url: ftp://localhost:8080
stages:
  - duration: 5s
    target: 1
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn rejects_unparsable_url() {
        let yaml = r#"
url: "not a url"
stages:
  - duration: 5s
    target: 1
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn rejects_zero_thresholds() {
        let yaml = r#"
url: http://localhost:8080
timeout: 0s
stages:
  - duration: 5s
    target: 1
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(scenario.validate(), Err(ScenarioError::ZeroTimeout)));

        let yaml = r#"
url: http://localhost:8080
stages:
  - duration: 5s
    target: 1
checks:
  max_response_time: 0ms
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::ZeroResponseTimeLimit)
        ));
    }

    #[test]
    fn scenario_serialization_round_trips() {
        let scenario: Scenario = serde_yaml::from_str(smoke_yaml()).unwrap();
        let yaml = serde_yaml::to_string(&scenario).unwrap();
        assert!(yaml.contains("5s"));

        let back: Scenario = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.stages[0].duration, Duration::from_secs(5));
        assert_eq!(back.checks.max_response_time, Duration::from_millis(500));
    }
}
