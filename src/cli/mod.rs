//! Command-line interface for the oxo engine
//!
//! This module provides the command-line interface for training, evaluating
//! and playing against the engine, plus one-shot move and validation queries.

pub mod commands;
pub mod output;

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::{
    config::{LearnerConfig, TrainingConfig},
    pipeline::{GreedyAgent, HeuristicAgent, RandomAgent, SolverAgent, UnbeatableAgent},
    ports::Agent,
    q_learning::DualQLearner,
    tictactoe::GameState,
};

/// Engine used to answer move queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EngineKind {
    /// Learned table through the greedy hybrid policy
    Learner,
    Minimax,
    Unbeatable,
    Heuristic,
    Random,
}

impl EngineKind {
    /// Build the engine; the learner variant loads `table` (empty if missing)
    /// with the given learner settings.
    pub fn build(
        self,
        table: &Path,
        learner: &LearnerConfig,
        seed: Option<u64>,
    ) -> Box<dyn Agent> {
        match self {
            EngineKind::Learner => Box::new(GreedyAgent::new(load_learner(table, learner), seed)),
            EngineKind::Minimax => Box::new(SolverAgent::new(seed)),
            EngineKind::Unbeatable => Box::new(UnbeatableAgent::new(seed)),
            EngineKind::Heuristic => Box::new(HeuristicAgent::new(seed)),
            EngineKind::Random => Box::new(RandomAgent::new(seed)),
        }
    }
}

/// Learner settings a table is played with: the `[learner]` section of a
/// training config file, or the defaults.
pub fn learner_config(path: Option<&Path>) -> Result<LearnerConfig> {
    match path {
        Some(path) => Ok(TrainingConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?
            .learner),
        None => Ok(LearnerConfig::default()),
    }
}

/// Load a table for play, empty when the file is missing or unreadable.
pub fn load_learner(table: &Path, config: &LearnerConfig) -> DualQLearner {
    DualQLearner::load_or_empty(table, config.clone())
}

/// Parse `x`/`o` (or `1`/`-1`) into a wire mover sign.
pub fn parse_mover(value: &str) -> Result<i64> {
    match value.trim().to_ascii_lowercase().as_str() {
        "x" | "1" | "+1" => Ok(1),
        "o" | "-1" => Ok(-1),
        other => bail!("invalid mover '{other}' (expected x or o)"),
    }
}

/// Parse a board given either as nine comma-separated integers
/// (`"1,0,-1,..."`, brackets optional) or as a board string (`"XO.X....._O"`).
///
/// Returns the wire board and the mover named by a board-string suffix or
/// implied by its piece counts; the integer form leaves the mover open.
pub fn parse_board(input: &str) -> Result<(Vec<i64>, Option<i64>)> {
    let trimmed = input.trim();
    if trimmed.contains(',') || trimmed.starts_with('[') {
        let values = trimmed
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(',')
            .map(|v| {
                v.trim()
                    .parse::<i64>()
                    .with_context(|| format!("invalid board value '{}'", v.trim()))
            })
            .collect::<Result<Vec<_>>>()?;
        return Ok((values, None));
    }

    let state = GameState::parse(trimmed).context("invalid board string")?;
    let board = state.to_wire().iter().map(|&v| i64::from(v)).collect();
    Ok((board, Some(i64::from(state.to_move().sign()))))
}
