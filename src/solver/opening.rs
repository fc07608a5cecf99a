//! Opening book for the first two plies

use rand::{Rng, seq::IndexedRandom};

use super::MinimaxSolver;
use crate::{Result, tictactoe::GameState};

const CENTER: usize = 4;
const CORNERS: [usize; 4] = [0, 2, 6, 8];

/// Adds variety to the first two plies.
///
/// Book moves are filtered through the solver's optimal set, so the book can
/// only choose between moves of equal value.
#[derive(Debug, Clone)]
pub struct OpeningBook {
    center_probability: f64,
}

impl Default for OpeningBook {
    fn default() -> Self {
        Self {
            center_probability: 0.7,
        }
    }
}

impl OpeningBook {
    pub fn new(center_probability: f64) -> Self {
        Self {
            center_probability: center_probability.clamp(0.0, 1.0),
        }
    }

    /// Suggest a book move, or `None` past ply 1 or when no book move is optimal.
    pub fn suggest<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        solver: &mut MinimaxSolver,
        rng: &mut R,
    ) -> Result<Option<usize>> {
        let preferred: Vec<usize> = match state.move_count() {
            0 => {
                if rng.random::<f64>() < self.center_probability {
                    vec![CENTER]
                } else {
                    CORNERS.to_vec()
                }
            }
            1 if state.is_empty(CENTER) => vec![CENTER],
            1 => CORNERS.iter().copied().filter(|&c| state.is_empty(c)).collect(),
            _ => return Ok(None),
        };

        let optimal = solver.optimal_actions(state)?;
        let candidates: Vec<usize> = preferred
            .into_iter()
            .filter(|a| optimal.contains(a))
            .collect();
        Ok(candidates.choose(rng).copied())
    }
}
