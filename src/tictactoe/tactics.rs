//! One-ply tactical shortcuts shared by the solver and the hybrid policy

use super::{GameState, LineAnalyzer};

/// Lowest-indexed move that wins on the spot for the player to move.
pub fn immediate_win(state: &GameState) -> Option<usize> {
    if state.is_terminal() {
        return None;
    }
    LineAnalyzer::winning_moves(state.cells(), state.to_move())
        .into_iter()
        .next()
}

/// Lowest-indexed move that stops the opponent from winning next ply.
pub fn immediate_block(state: &GameState) -> Option<usize> {
    if state.is_terminal() {
        return None;
    }
    LineAnalyzer::winning_moves(state.cells(), state.to_move().opponent())
        .into_iter()
        .next()
}

/// Win if possible, otherwise block.
pub fn tactical_move(state: &GameState) -> Option<usize> {
    immediate_win(state).or_else(|| immediate_block(state))
}
