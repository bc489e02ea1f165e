use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Scenario;
use crate::driver::monitor::print_summary;
use crate::driver::{LoadDriver, StagePlan};
use crate::http::HttpIteration;
use crate::report::RunReport;
use crate::utils::parse_duration;

pub struct RunOptions {
    pub scenario: PathBuf,
    pub output: Option<PathBuf>,
    pub report_interval: String,
    pub min_pass_rate: Option<f64>,
    pub quiet: bool,
}

pub async fn handle_run(options: RunOptions) -> Result<()> {
    let scenario = Scenario::load(&options.scenario)?;
    let report_interval = parse_duration(&options.report_interval)?;

    let plan = StagePlan::new(scenario.start_vus, &scenario.stages);
    let checks = scenario.checks();

    println!(
        "{} {}",
        "RUN".cyan().bold(),
        scenario.display_name().bright_white()
    );
    println!("Target: {}", scenario.url.bright_white());
    println!(
        "Stages: {} ({:?} total, peak {} vus)",
        plan.stage_count(),
        plan.total_duration(),
        plan.peak_target()
    );
    if let Some(pause) = scenario.pause {
        println!("Pause between iterations: {:?}", pause);
    }
    println!();

    let body = Arc::new(HttpIteration::new(
        scenario.url.clone(),
        scenario.timeout,
        checks.clone(),
    )?);

    let driver = LoadDriver::new(
        plan,
        body,
        checks.iter().map(|c| c.name()).collect(),
        scenario.pause,
        report_interval,
        options.quiet,
    );

    let results = driver.run().await?;

    print_summary(&results);

    let pass_rate = results.overall_pass_rate() * 100.0;
    let all_passed = results.all_checks_passed();

    if let Some(output) = options.output {
        let report = RunReport::new(scenario.display_name(), results);
        report.save(&output)?;
        println!();
        println!(
            "{} Report saved to {}",
            "✔".green(),
            output.display().to_string().bright_white()
        );
    }

    println!();
    if all_passed {
        println!("{} All checks passed", "✔".green().bold());
    } else {
        println!(
            "{} Some checks failed ({:.1}% passed)",
            "✖".red().bold(),
            pass_rate
        );
    }

    if let Some(min_pass_rate) = options.min_pass_rate {
        if pass_rate < min_pass_rate {
            anyhow::bail!(
                "Check pass rate {:.1}% is below the required {:.1}%",
                pass_rate,
                min_pass_rate
            );
        }
    }

    Ok(())
}
