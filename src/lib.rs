//! oxo: a tic-tac-toe decision engine
//!
//! This crate provides:
//! - Game rules with symmetry-reduced, mover-relative position keys
//! - An exact alpha-beta solver with an optional opening book
//! - A double Q-learner with prioritized replay, Dyna planning and reward
//!   shaping, persisted as JSON or MessagePack
//! - A hybrid policy combining tactics, rollouts and the learned table
//! - Batched parallel self-play training and head-to-head evaluation
//! - Request/response types for move and validation queries

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod ports;
pub mod q_learning;
pub mod query;
pub mod solver;
pub mod tictactoe;
pub mod types;

pub use config::{LearnerConfig, TrainingConfig};
pub use error::{Error, Result};
pub use policy::HybridPolicy;
pub use q_learning::DualQLearner;
pub use solver::MinimaxSolver;
pub use tictactoe::{GameState, Outcome, Player, canonicalize};
pub use types::CanonicalKey;
