//! Agent port - one interface for every move-picking strategy
//!
//! Random and heuristic baselines, the exact solver, and the learned policy
//! all implement [`Agent`], so evaluation code can pit any two of them
//! against each other.

use crate::{Result, tictactoe::GameState};

/// Anything that can choose a move for the player to move.
///
/// # Examples
///
/// ```no_run
/// use oxo::{ports::Agent, tictactoe::GameState};
///
/// fn opening_move(agent: &mut dyn Agent) -> oxo::Result<usize> {
///     agent.select_move(&GameState::new())
/// }
/// ```
pub trait Agent: Send {
    /// Select a move (0-8) for the given state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NoLegalActions`] if the state is terminal.
    fn select_move(&mut self, state: &GameState) -> Result<usize>;

    /// Short human-readable name used in logs and reports.
    fn name(&self) -> &str;

    /// Reseed the agent's random source for reproducible games.
    ///
    /// Deterministic agents ignore the seed.
    fn set_rng_seed(&mut self, _seed: u64) {}
}
