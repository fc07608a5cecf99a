//! Exact game-theoretic play
//!
//! [`MinimaxSolver`] searches the full remaining game tree with alpha-beta
//! pruning; [`OpeningBook`] adds variety on the first two plies without ever
//! leaving the set of optimal moves.

pub mod minimax;
pub mod opening;

pub use minimax::{MAX_DEPTH, MinimaxSolver, TieBreak, WIN_SCORE};
pub use opening::OpeningBook;
