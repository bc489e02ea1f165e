use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;

use crate::config::Scenario;
use crate::driver::StagePlan;

/// Validate a scenario file and print the resolved plan without running it.
pub fn handle_check(scenario_path: PathBuf) -> Result<()> {
    let scenario = Scenario::load(&scenario_path)?;
    let plan = StagePlan::new(scenario.start_vus, &scenario.stages);

    println!(
        "{} {} is valid",
        "✔".green().bold(),
        scenario_path.display().to_string().bright_white()
    );
    println!();
    println!("Scenario: {}", scenario.display_name().bright_white());
    println!("Target: {}", scenario.url.bright_white());
    println!();

    println!("{} Stages:", "📋".bright_white());
    for (index, (from, to, duration)) in plan.ramps().enumerate() {
        let shape = if from == to {
            format!("hold {} vus", to)
        } else {
            format!("{} -> {} vus", from, to)
        };
        println!("  {}. {} over {:?}", index + 1, shape, duration);
    }
    println!(
        "  Total: {:?}, peak {} vus",
        plan.total_duration(),
        plan.peak_target()
    );

    println!();
    println!("{} Checks:", "📋".bright_white());
    for check in scenario.checks() {
        println!("  - {}", check.name());
    }

    if let Some(pause) = scenario.pause {
        println!();
        println!("Pause between iterations: {:?}", pause);
    }

    Ok(())
}
