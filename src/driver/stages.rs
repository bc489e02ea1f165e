use crate::config::Stage;
use std::time::Duration;

/// The concurrency ramp for a whole run, precomputed from the scenario's
/// ordered stage list. Each stage interpolates linearly from the previous
/// stage's target (the first stage from `start_vus`) to its own target.
#[derive(Debug, Clone)]
pub struct StagePlan {
    start_vus: u32,
    stages: Vec<PlannedStage>,
    total: Duration,
}

#[derive(Debug, Clone)]
struct PlannedStage {
    starts_at: Duration,
    duration: Duration,
    from: u32,
    to: u32,
}

impl StagePlan {
    pub fn new(start_vus: u32, stages: &[Stage]) -> Self {
        let mut planned = Vec::with_capacity(stages.len());
        let mut offset = Duration::ZERO;
        let mut from = start_vus;

        for stage in stages {
            planned.push(PlannedStage {
                starts_at: offset,
                duration: stage.duration,
                from,
                to: stage.target,
            });
            offset += stage.duration;
            from = stage.target;
        }

        Self {
            start_vus,
            stages: planned,
            total: offset,
        }
    }

    pub fn total_duration(&self) -> Duration {
        self.total
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Highest concurrency the plan ever asks for.
    pub fn peak_target(&self) -> u32 {
        self.stages
            .iter()
            .map(|s| s.from.max(s.to))
            .max()
            .unwrap_or(self.start_vus)
    }

    /// Desired concurrent virtual users at `elapsed`, or `None` once the
    /// final stage has run out and all users should stop.
    pub fn target_at(&self, elapsed: Duration) -> Option<u32> {
        let stage = self.stage_at(elapsed)?;
        let into = elapsed.saturating_sub(stage.starts_at);
        let fraction = into.as_secs_f64() / stage.duration.as_secs_f64();
        let value = stage.from as f64 + (stage.to as f64 - stage.from as f64) * fraction;
        Some(value.round() as u32)
    }

    /// Zero-based index of the stage covering `elapsed`.
    pub fn stage_index_at(&self, elapsed: Duration) -> Option<usize> {
        if elapsed >= self.total {
            return None;
        }
        self.stages
            .iter()
            .position(|s| elapsed < s.starts_at + s.duration)
    }

    /// `(from, to)` targets of each stage, for plan printouts.
    pub fn ramps(&self) -> impl Iterator<Item = (u32, u32, Duration)> + '_ {
        self.stages.iter().map(|s| (s.from, s.to, s.duration))
    }

    fn stage_at(&self, elapsed: Duration) -> Option<&PlannedStage> {
        if elapsed >= self.total {
            return None;
        }
        self.stages
            .iter()
            .find(|s| elapsed < s.starts_at + s.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(duration: Duration, target: u32) -> Stage {
        Stage { duration, target }
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn flat_single_stage_holds_its_target() {
        // The smoke profile: one user for five seconds.
        let plan = StagePlan::new(1, &[stage(secs(5), 1)]);

        assert_eq!(plan.total_duration(), secs(5));
        assert_eq!(plan.peak_target(), 1);
        assert_eq!(plan.target_at(Duration::ZERO), Some(1));
        assert_eq!(plan.target_at(Duration::from_millis(2500)), Some(1));
        assert_eq!(plan.target_at(Duration::from_millis(4999)), Some(1));
        assert_eq!(plan.target_at(secs(5)), None);
        assert_eq!(plan.target_at(secs(60)), None);
    }

    #[test]
    fn ramp_up_interpolates_linearly() {
        let plan = StagePlan::new(0, &[stage(secs(4), 4)]);

        assert_eq!(plan.target_at(Duration::ZERO), Some(0));
        assert_eq!(plan.target_at(secs(1)), Some(1));
        assert_eq!(plan.target_at(secs(2)), Some(2));
        assert_eq!(plan.target_at(secs(3)), Some(3));
        assert_eq!(plan.target_at(Duration::from_millis(3999)), Some(4));
    }

    #[test]
    fn later_stages_ramp_from_previous_target() {
        let plan = StagePlan::new(0, &[stage(secs(4), 4), stage(secs(4), 0)]);

        assert_eq!(plan.total_duration(), secs(8));
        assert_eq!(plan.peak_target(), 4);
        // Second stage ramps 4 -> 0.
        assert_eq!(plan.target_at(secs(4)), Some(4));
        assert_eq!(plan.target_at(secs(6)), Some(2));
        assert_eq!(plan.target_at(Duration::from_millis(7990)), Some(0));
        assert_eq!(plan.target_at(secs(8)), None);
    }

    #[test]
    fn hold_stage_keeps_previous_target() {
        let plan = StagePlan::new(1, &[stage(secs(2), 20), stage(secs(10), 20)]);

        assert_eq!(plan.target_at(secs(3)), Some(20));
        assert_eq!(plan.target_at(secs(11)), Some(20));
    }

    #[test]
    fn stage_index_tracks_elapsed_time() {
        let plan = StagePlan::new(1, &[stage(secs(2), 2), stage(secs(3), 0)]);

        assert_eq!(plan.stage_index_at(Duration::ZERO), Some(0));
        assert_eq!(plan.stage_index_at(Duration::from_millis(1999)), Some(0));
        assert_eq!(plan.stage_index_at(secs(2)), Some(1));
        assert_eq!(plan.stage_index_at(Duration::from_millis(4999)), Some(1));
        assert_eq!(plan.stage_index_at(secs(5)), None);
    }
}
