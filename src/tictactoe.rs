//! Tic-Tac-Toe rules, symmetry reduction and tactical helpers

pub mod board;
pub mod lines;
pub mod symmetry;
pub mod tactics;

pub use board::{Cell, GameState, Outcome, Player};
pub use lines::{LineAnalyzer, LineCount, WINNING_LINES};
pub use symmetry::{CanonicalContext, D4Transform, canonicalize};
pub use tactics::{immediate_block, immediate_win, tactical_move};
