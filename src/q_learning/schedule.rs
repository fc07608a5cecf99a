//! Exponential decay of exploration and learning rates

use crate::config::LearnerConfig;

/// Pure function of the cumulative step count.
///
/// Both rates interpolate geometrically from their start value to their end
/// value over `horizon` steps and stay at the end value afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSchedule {
    pub alpha_start: f64,
    pub alpha_end: f64,
    pub epsilon_start: f64,
    pub epsilon_end: f64,
    pub horizon: u64,
}

impl TrainingSchedule {
    pub fn from_config(config: &LearnerConfig) -> Self {
        Self {
            alpha_start: config.alpha_start,
            alpha_end: config.alpha_end,
            epsilon_start: config.epsilon_start,
            epsilon_end: config.epsilon_end,
            horizon: config.decay_steps,
        }
    }

    /// Exploration rate after `step` steps
    pub fn epsilon(&self, step: u64) -> f64 {
        interpolate(self.epsilon_start, self.epsilon_end, step, self.horizon)
    }

    /// Learning rate after `step` steps
    pub fn alpha(&self, step: u64) -> f64 {
        interpolate(self.alpha_start, self.alpha_end, step, self.horizon)
    }
}

fn interpolate(start: f64, end: f64, step: u64, horizon: u64) -> f64 {
    if step >= horizon || start <= 0.0 {
        return end;
    }
    let progress = step as f64 / horizon as f64;
    start * (end / start).powf(progress)
}
