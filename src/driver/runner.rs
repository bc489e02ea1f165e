use crate::checks::CheckResult;
use crate::driver::metrics::{RunMetrics, RunResults};
use crate::driver::monitor::RunMonitor;
use crate::driver::stages::StagePlan;
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use owo_colors::OwoColorize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep};

/// How often the supervisor re-reads the ramp and adjusts the user pool.
const SCHEDULE_TICK: Duration = Duration::from_millis(100);

/// One pass of a virtual user's loop.
#[derive(Debug, Clone)]
pub enum IterationOutcome {
    /// The request produced a response; checks were evaluated against it.
    Completed {
        status: u16,
        duration: Duration,
        checks: Vec<CheckResult>,
    },
    /// The request never produced a response (connect failure, timeout).
    /// Counts as a failed iteration; the user carries on.
    TransportError { error: String },
}

/// The body a virtual user executes once per loop cycle. The CLI passes an
/// HTTP GET body; tests drive the supervisor with synthetic ones.
#[async_trait]
pub trait IterationBody: Send + Sync {
    async fn run(&self) -> IterationOutcome;
}

struct VirtualUser {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Ramps a pool of virtual users along a stage plan, each looping over the
/// iteration body until the plan runs out.
pub struct LoadDriver {
    plan: StagePlan,
    body: Arc<dyn IterationBody>,
    check_names: Vec<String>,
    pause: Option<Duration>,
    report_interval: Duration,
    quiet: bool,
}

impl LoadDriver {
    pub fn new(
        plan: StagePlan,
        body: Arc<dyn IterationBody>,
        check_names: Vec<String>,
        pause: Option<Duration>,
        report_interval: Duration,
        quiet: bool,
    ) -> Self {
        Self {
            plan,
            body,
            check_names,
            pause,
            report_interval,
            quiet,
        }
    }

    pub async fn run(&self) -> Result<RunResults> {
        let metrics = Arc::new(Mutex::new(RunMetrics::new(self.check_names.clone())));

        let monitor = if self.quiet {
            None
        } else {
            Some(RunMonitor::spawn(
                Arc::clone(&metrics),
                self.plan.clone(),
                self.report_interval,
            ))
        };

        let start = Instant::now();
        let mut users: Vec<VirtualUser> = Vec::new();
        let mut retired: Vec<JoinHandle<()>> = Vec::new();
        let mut tick = interval(SCHEDULE_TICK);

        loop {
            tick.tick().await;

            let Some(desired) = self.plan.target_at(start.elapsed()) else {
                break;
            };
            let desired = desired as usize;

            while users.len() < desired {
                users.push(self.spawn_user(Arc::clone(&metrics)));
            }
            // Retire the newest users first; each finishes its current
            // iteration before exiting.
            while users.len() > desired {
                if let Some(user) = users.pop() {
                    let _ = user.stop.send(true);
                    retired.push(user.handle);
                }
            }
        }

        // Final deadline: stop everyone, then wait for in-flight
        // iterations to finish.
        for user in &users {
            let _ = user.stop.send(true);
        }

        let mut draining: FuturesUnordered<JoinHandle<()>> = users
            .into_iter()
            .map(|user| user.handle)
            .chain(retired)
            .collect();
        while let Some(joined) = draining.next().await {
            if let Err(e) = joined {
                println!("{} virtual user task failed: {}", "⚠".yellow(), e);
            }
        }

        if let Some(monitor) = monitor {
            let _ = monitor.await;
        }

        let results = metrics.lock().await.summarize();
        Ok(results)
    }

    fn spawn_user(&self, metrics: Arc<Mutex<RunMetrics>>) -> VirtualUser {
        let (stop_tx, stop_rx) = watch::channel(false);
        let body = Arc::clone(&self.body);
        let pause = self.pause;

        let handle = tokio::spawn(user_loop(body, metrics, pause, stop_rx));

        VirtualUser {
            stop: stop_tx,
            handle,
        }
    }
}

/// request -> record -> optional pause -> repeat, until told to stop.
/// The stop flag is only consulted between iterations, so a request in
/// flight always runs to completion.
async fn user_loop(
    body: Arc<dyn IterationBody>,
    metrics: Arc<Mutex<RunMetrics>>,
    pause: Option<Duration>,
    mut stop: watch::Receiver<bool>,
) {
    while !*stop.borrow() {
        let outcome = body.run().await;
        metrics.lock().await.record_iteration(&outcome);

        if let Some(pause) = pause {
            tokio::select! {
                _ = sleep(pause) => {}
                _ = stop.changed() => {}
            }
        }
    }
}
