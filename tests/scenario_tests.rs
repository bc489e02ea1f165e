use std::fs;
use std::time::Duration;
use tempfile::TempDir;

use surge::config::Scenario;
use surge::driver::StagePlan;

fn write_scenario(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn loads_the_smoke_scenario() {
    let dir = TempDir::new().unwrap();
    let path = write_scenario(
        &dir,
        "smoke.yaml",
        r#"
name: smoke
url: http://localhost:8080
stages:
  - duration: 5s
    target: 1
checks:
  status: 200
  max_response_time: 500ms
"#,
    );

    let scenario = Scenario::load(&path).unwrap();
    assert_eq!(scenario.display_name(), "smoke");
    assert_eq!(scenario.stages.len(), 1);

    let plan = StagePlan::new(scenario.start_vus, &scenario.stages);
    assert_eq!(plan.total_duration(), Duration::from_secs(5));
    assert_eq!(plan.peak_target(), 1);
    assert_eq!(plan.target_at(Duration::from_secs(2)), Some(1));
    assert_eq!(plan.target_at(Duration::from_secs(5)), None);
}

#[test]
fn load_rejects_invalid_yaml() {
    let dir = TempDir::new().unwrap();
    let path = write_scenario(&dir, "broken.yaml", "stages: [not: valid");

    assert!(Scenario::load(&path).is_err());
}

#[test]
fn load_rejects_invalid_configuration() {
    let dir = TempDir::new().unwrap();
    let path = write_scenario(
        &dir,
        "zero.yaml",
        r#"
url: http://localhost:8080
stages:
  - duration: 0s
    target: 1
"#,
    );

    let err = Scenario::load(&path).unwrap_err();
    assert!(err.to_string().contains("zero duration"));
}

#[test]
fn load_rejects_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope.yaml");

    assert!(Scenario::load(&path).is_err());
}

#[test]
fn repo_smoke_scenario_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/smoke.yaml");

    let scenario = Scenario::load(&path).unwrap();
    assert_eq!(scenario.display_name(), "smoke");
    assert_eq!(scenario.stages.len(), 1);
    assert_eq!(scenario.stages[0].duration, Duration::from_secs(5));
    assert_eq!(scenario.stages[0].target, 1);

    let names: Vec<String> = scenario.checks().iter().map(|c| c.name()).collect();
    assert_eq!(
        names,
        vec!["status is 200", "response time is less than 500ms"]
    );
}
