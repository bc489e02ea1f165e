pub mod metrics;
pub mod monitor;
pub mod runner;
pub mod stages;

pub use metrics::{CheckCounter, RunMetrics, RunResults};
pub use runner::{IterationBody, IterationOutcome, LoadDriver};
pub use stages::StagePlan;
