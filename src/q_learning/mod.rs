//! Dual-table temporal difference learning
//!
//! The learner keeps two action-value tables addressed by canonical key and
//! trains them with double Q-learning: every update changes one table and
//! bootstraps from the other, which removes the optimism of a single max.
//!
//! ## Components
//!
//! | Piece | Role |
//! |-------|------|
//! | [`QTable`] | Lazily grown map from key to nine values |
//! | [`TrainingSchedule`] | ε and α as pure functions of the step count |
//! | [`ReplayBuffer`] | Ring arena of transitions with priorities |
//! | [`shaped_reward`] | Per-ply reward for non-terminal moves |
//! | [`DualQLearner`] | Update rule, replay, planning and analytics |
//! | [`SavedTable`] | JSON or MessagePack persistence |
//!
//! ## Usage Example
//!
//! ```no_run
//! use oxo::{
//!     config::LearnerConfig,
//!     q_learning::DualQLearner,
//!     tictactoe::{GameState, canonicalize},
//! };
//!
//! let mut learner = DualQLearner::new(LearnerConfig::default()).with_seed(7);
//! let state = GameState::new();
//! let next = state.with_action(4).unwrap();
//! learner
//!     .observe(canonicalize(&state), 4, 0.5, canonicalize(&next), false)
//!     .unwrap();
//! learner.save("table.json").unwrap();
//! ```

pub mod learner;
pub mod q_table;
pub mod replay;
pub mod schedule;
pub mod serialization;
pub mod shaping;

pub use learner::{DualQLearner, LearnerStatistics, PositionPreference, ValueSummary};
pub use q_table::QTable;
pub use replay::{Experience, ReplayBuffer};
pub use schedule::TrainingSchedule;
pub use serialization::{SavedAnalytics, SavedTable, TableFormat, TrainingStats};
pub use shaping::shaped_reward;
