use crate::driver::metrics::{RunMetrics, RunResults};
use crate::driver::stages::StagePlan;
use crate::ui::progress::create_run_bar;
use owo_colors::OwoColorize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Live progress display for a run: a bar across the planned duration with
/// a rolling message. Ends on its own once the plan's window has elapsed.
pub struct RunMonitor;

impl RunMonitor {
    pub fn spawn(
        metrics: Arc<Mutex<RunMetrics>>,
        plan: StagePlan,
        report_interval: Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let start = Instant::now();
            let total = plan.total_duration();
            let deadline = tokio::time::Instant::now() + total;
            let bar = create_run_bar(total.as_millis() as u64);
            let mut tick = tokio::time::interval(report_interval);
            tick.tick().await; // the first tick fires immediately

            loop {
                tokio::select! {
                    _ = tick.tick() => {}
                    _ = tokio::time::sleep_until(deadline) => break,
                }

                let elapsed = start.elapsed();
                if elapsed >= total {
                    break;
                }

                bar.set_position(elapsed.as_millis() as u64);

                let snapshot = metrics.lock().await.summarize();
                let stage = plan
                    .stage_index_at(elapsed)
                    .map(|i| i + 1)
                    .unwrap_or(plan.stage_count());
                let vus = plan.target_at(elapsed).unwrap_or(0);

                bar.set_message(format!(
                    "stage {}/{} • {} vus • {} iters • {:.1}% checks",
                    stage,
                    plan.stage_count(),
                    vus,
                    snapshot.iterations,
                    snapshot.overall_pass_rate() * 100.0
                ));
            }

            bar.finish_and_clear();
        })
    }
}

/// Print the end-of-run summary: every check with its tally, then the
/// latency distribution and traffic totals.
pub fn print_summary(results: &RunResults) {
    println!();
    println!("{}", "=".repeat(60).dimmed());
    println!("{} Run Results", "🎯".bright_white());
    println!("{}", "=".repeat(60).dimmed());

    println!();
    println!("{} Checks:", "📋".bright_white());
    for (name, counter) in &results.checks {
        if counter.fails == 0 {
            println!(
                "  {} {} · {} passed",
                "✓".green(),
                name,
                counter.passes.to_string().green()
            );
        } else {
            println!(
                "  {} {} · {} passed, {} failed",
                "✗".red(),
                name,
                counter.passes.to_string().green(),
                counter.fails.to_string().red()
            );
        }
    }

    println!();
    println!("{} Traffic:", "⚡".bright_white());
    println!(
        "  Iterations: {}",
        results.iterations.to_string().bright_white()
    );
    if results.transport_errors > 0 {
        println!(
            "  {} Transport errors: {}",
            "⚠".yellow(),
            results.transport_errors.to_string().red()
        );
        if let Some(error) = &results.last_transport_error {
            println!("    last: {}", error.dimmed());
        }
    }
    println!(
        "  Requests/sec: {}",
        format!("{:.1}", results.requests_per_second).bright_white()
    );
    println!("  Total Duration: {:?}", results.total_duration.bright_white());

    println!();
    println!("{} Response Times:", "📊".bright_white());
    println!(
        "  Avg: {}ms · Min: {}ms · Max: {}ms",
        results.average_response_time.as_millis().to_string().bright_white(),
        results.min_response_time.as_millis().to_string().bright_white(),
        results.max_response_time.as_millis().to_string().bright_white()
    );
    println!(
        "  P50: {}ms · P95: {}ms · P99: {}ms",
        results.p50_response_time.as_millis().to_string().bright_white(),
        results.p95_response_time.as_millis().to_string().bright_white(),
        results.p99_response_time.as_millis().to_string().bright_white()
    );

    if !results.status_codes.is_empty() {
        println!();
        println!("{} Status Codes:", "🔍".bright_white());
        let mut sorted_codes: Vec<_> = results.status_codes.iter().collect();
        sorted_codes.sort_by_key(|(code, _)| *code);

        for (code, count) in sorted_codes {
            let count_str = count.to_string();
            if *code >= 200 && *code < 300 {
                println!("  {}: {}", code, count_str.green());
            } else if *code >= 400 {
                println!("  {}: {}", code, count_str.red());
            } else {
                println!("  {}: {}", code, count_str.yellow());
            }
        }
    }

    println!("{}", "=".repeat(60).dimmed());
}
