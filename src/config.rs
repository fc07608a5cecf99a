//! Learner and training configuration, loadable from TOML

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

/// Weights of the per-ply shaping reward.
///
/// Only the relative ordering of these weights matters for behaviour; the
/// defaults are tuned values, not invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardShaping {
    /// Line fully held by the mover
    pub completed_line: f64,
    /// Two of the mover's pieces and one empty cell
    pub open_two: f64,
    /// Two opponent pieces and one empty cell
    pub opponent_open_two: f64,
    /// One of the mover's pieces and two empty cells
    pub open_one: f64,
    pub center: f64,
    /// Per corner held
    pub corner: f64,
    /// Per edge held
    pub edge: f64,
    /// Penalty per ply beyond `efficiency_after`
    pub efficiency_penalty: f64,
    pub efficiency_after: usize,
    /// Per simultaneous threat beyond the first
    pub fork: f64,
}

impl Default for RewardShaping {
    fn default() -> Self {
        Self {
            completed_line: 10.0,
            open_two: 2.0,
            opponent_open_two: 1.5,
            open_one: 0.3,
            center: 0.8,
            corner: 0.4,
            edge: 0.2,
            efficiency_penalty: 0.1,
            efficiency_after: 5,
            fork: 1.0,
        }
    }
}

/// Fixed rewards applied to the final moves of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalRewards {
    pub win: f64,
    pub loss: f64,
    pub draw: f64,
}

impl Default for TerminalRewards {
    fn default() -> Self {
        Self {
            win: 10.0,
            loss: -10.0,
            draw: 1.0,
        }
    }
}

/// Hyperparameters of the dual-table learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    pub alpha_start: f64,
    pub alpha_end: f64,
    pub gamma: f64,
    pub epsilon_start: f64,
    pub epsilon_end: f64,
    /// Steps over which α and ε decay from start to end
    pub decay_steps: u64,
    pub double_q: bool,
    pub dyna: bool,
    pub replay_capacity: usize,
    pub prioritized_replay: bool,
    /// Simulated updates after each live update
    pub planning_steps: usize,
    /// Buffer size required before planning kicks in
    pub planning_threshold: usize,
    /// Added to |TD error| so no transition has zero priority
    pub priority_floor: f64,
    pub random_start_probability: f64,
    /// Episodes before random start positions are used
    pub random_start_after: u64,
    /// Random playouts per candidate in late-game positions
    pub rollout_samples: usize,
    /// Legal-move count at or below which rollouts replace table lookup
    pub rollout_threshold: usize,
    pub shaping: RewardShaping,
    pub terminal: TerminalRewards,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            alpha_start: 0.1,
            alpha_end: 0.01,
            gamma: 0.99,
            epsilon_start: 1.0,
            epsilon_end: 0.001,
            decay_steps: 200_000,
            double_q: true,
            dyna: true,
            replay_capacity: 20_000,
            prioritized_replay: true,
            planning_steps: 10,
            planning_threshold: 100,
            priority_floor: 1e-6,
            random_start_probability: 0.3,
            random_start_after: 1_000,
            rollout_samples: 10,
            rollout_threshold: 3,
            shaping: RewardShaping::default(),
            terminal: TerminalRewards::default(),
        }
    }
}

impl LearnerConfig {
    /// Validate learner hyperparameters.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(Error::InvalidConfiguration {
                message: message.to_string(),
            })
        };

        if !(0.0..1.0).contains(&self.gamma) {
            return invalid("learner.gamma must be in [0, 1)");
        }
        if self.alpha_start <= 0.0 || self.alpha_end <= 0.0 {
            return invalid("learner.alpha_start and learner.alpha_end must be > 0");
        }
        if self.alpha_start > 1.0 || self.alpha_end > 1.0 {
            return invalid("learner.alpha_start and learner.alpha_end must be <= 1");
        }
        if self.epsilon_start <= 0.0 || self.epsilon_start > 1.0 {
            return invalid("learner.epsilon_start must be in (0, 1]");
        }
        if self.epsilon_end <= 0.0 || self.epsilon_end > self.epsilon_start {
            return invalid("learner.epsilon_end must be in (0, epsilon_start]");
        }
        if self.decay_steps == 0 {
            return invalid("learner.decay_steps must be > 0");
        }
        if self.replay_capacity == 0 {
            return invalid("learner.replay_capacity must be > 0");
        }
        if self.priority_floor <= 0.0 {
            return invalid("learner.priority_floor must be > 0");
        }
        if !(0.0..=1.0).contains(&self.random_start_probability) {
            return invalid("learner.random_start_probability must be in [0, 1]");
        }
        if self.rollout_samples == 0 {
            return invalid("learner.rollout_samples must be > 0");
        }
        Ok(())
    }
}

/// Self-play training run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub episodes: u64,
    /// Episodes played per coordinator round
    pub batch_size: usize,
    /// Worker threads; 0 uses every available core
    pub workers: usize,
    pub parallel: bool,
    /// Save the table every N episodes (0 disables)
    pub save_interval: u64,
    /// Log statistics every N episodes
    pub stats_interval: u64,
    pub early_stopping: bool,
    /// Convergence is declared when the mean standard deviation of recent
    /// win and draw percentages drops below this value
    pub convergence_threshold: f64,
    pub convergence_window: usize,
    pub convergence_min_episodes: u64,
    pub seed: Option<u64>,
    pub learner: LearnerConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 200_000,
            batch_size: 1_000,
            workers: 0,
            parallel: true,
            save_interval: 50_000,
            stats_interval: 10_000,
            early_stopping: true,
            convergence_threshold: 0.02,
            convergence_window: 20,
            convergence_min_episodes: 100_000,
            seed: None,
            learner: LearnerConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read config file {}", path.display()),
            source,
        })?;
        let config: TrainingConfig =
            toml::from_str(&content).map_err(|e| Error::InvalidConfiguration {
                message: format!("{}: {e}", path.display()),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(Error::InvalidConfiguration {
                message: message.to_string(),
            })
        };

        if self.episodes == 0 {
            return invalid("episodes must be > 0");
        }
        if self.batch_size == 0 {
            return invalid("batch_size must be > 0");
        }
        if self.stats_interval == 0 {
            return invalid("stats_interval must be > 0");
        }
        if self.convergence_window < 2 {
            return invalid("convergence_window must be >= 2");
        }
        if self.convergence_threshold <= 0.0 {
            return invalid("convergence_threshold must be > 0");
        }
        self.learner.validate()
    }
}
