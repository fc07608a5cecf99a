//! Common test utilities for the oxo test suite.

#![allow(dead_code)]

use std::collections::HashSet;

use oxo::tictactoe::{Cell, GameState};

/// Every position reachable from the empty board by legal play, terminal
/// positions included.
pub fn reachable_states() -> Vec<GameState> {
    let mut seen = HashSet::new();
    let mut stack = vec![GameState::new()];
    let mut states = Vec::new();
    while let Some(state) = stack.pop() {
        if !seen.insert(state) {
            continue;
        }
        states.push(state);
        for action in state.legal_actions() {
            if let Ok(next) = state.with_action(action) {
                stack.push(next);
            }
        }
    }
    states
}

/// Swap X and O and hand the move to the other side.
pub fn relabel(state: &GameState) -> GameState {
    let mut cells = *state.cells();
    for cell in cells.iter_mut() {
        *cell = match *cell {
            Cell::X => Cell::O,
            Cell::O => Cell::X,
            Cell::Empty => Cell::Empty,
        };
    }
    GameState::from_cells(cells, state.to_move().opponent())
}

/// Mean and sample standard deviation
pub fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}
