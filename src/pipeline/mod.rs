//! Training and evaluation pipeline
//!
//! This module provides:
//! - Batched self-play training on a worker pool with a single coordinator
//! - Baseline agents and head-to-head evaluation
//! - Observers recording progress during training

pub mod agents;
pub mod evaluation;
pub mod observers;
pub mod self_play;

pub use agents::{GreedyAgent, HeuristicAgent, RandomAgent, SolverAgent, UnbeatableAgent};
pub use evaluation::{EvaluationResult, OpponentKind, Seat, evaluate, play_game};
pub use observers::{JsonlObserver, MetricsObserver, ProgressObserver};
pub use self_play::{
    ConvergenceMetric, EpisodeTrace, SelfPlayTrainer, Step, TrainingReport, TrainingSnapshot,
    apply_trace, convergence_score, play_episode, random_start,
};

pub use crate::ports::{Agent, Observer};
