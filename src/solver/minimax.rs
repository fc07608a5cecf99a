//! Alpha-beta minimax over the remaining game tree

use rand::{Rng, seq::IndexedRandom};

use crate::{
    Error, Result,
    tictactoe::{GameState, Outcome, Player, tactics},
};

/// Deepest recursion the search can reach: one level per empty cell.
pub const MAX_DEPTH: usize = 9;

/// Base score of a win; the search depth is subtracted from it.
pub const WIN_SCORE: i32 = 10;

/// How the solver chooses between equally optimal moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Always the lowest board index
    #[default]
    Lowest,
    /// Uniformly at random among the optimal moves
    Random,
}

/// Exhaustive adversarial search with alpha-beta pruning.
///
/// Scores are taken from the point of view of the player who invoked the
/// search: `WIN_SCORE - depth` for a win, `depth - WIN_SCORE` for a loss,
/// zero for a draw. Faster wins and slower losses are preferred without ever
/// ranking a draw above a win.
#[derive(Debug, Clone, Default)]
pub struct MinimaxSolver {
    tie_break: TieBreak,
    nodes_evaluated: u64,
}

impl MinimaxSolver {
    pub fn new(tie_break: TieBreak) -> Self {
        Self {
            tie_break,
            nodes_evaluated: 0,
        }
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Nodes visited since construction or the last [`reset_stats`](Self::reset_stats).
    pub fn nodes_evaluated(&self) -> u64 {
        self.nodes_evaluated
    }

    pub fn reset_stats(&mut self) {
        self.nodes_evaluated = 0;
    }

    /// Pick the move to play.
    ///
    /// A forced single move, an immediate win, or a block of the opponent's
    /// immediate win are returned without searching. Otherwise every legal
    /// move is scored exactly and the best is chosen per the tie-break rule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoLegalActions`] if the state is terminal.
    pub fn best_action<R: Rng + ?Sized>(
        &mut self,
        state: &GameState,
        rng: &mut R,
    ) -> Result<usize> {
        let legal = state.legal_actions();
        match legal.as_slice() {
            [] => return Err(Error::NoLegalActions),
            [only] => return Ok(*only),
            _ => {}
        }

        if let Some(action) = tactics::tactical_move(state) {
            return Ok(action);
        }

        let optimal = self.optimal_actions(state)?;
        self.pick(&optimal, rng)
    }

    /// Every legal move paired with its exact minimax score.
    pub fn evaluate_actions(&mut self, state: &GameState) -> Result<Vec<(usize, i32)>> {
        let legal = state.legal_actions();
        if legal.is_empty() {
            return Err(Error::NoLegalActions);
        }

        let invoker = state.to_move();
        let mut scored = Vec::with_capacity(legal.len());
        for action in legal {
            let child = state.with_action(action)?;
            let score = self.search(&child, 0, i32::MIN, i32::MAX, invoker);
            scored.push((action, score));
        }
        Ok(scored)
    }

    /// All legal moves sharing the best score, ascending.
    pub fn optimal_actions(&mut self, state: &GameState) -> Result<Vec<usize>> {
        let scored = self.evaluate_actions(state)?;
        let best = scored
            .iter()
            .map(|&(_, score)| score)
            .max()
            .ok_or(Error::NoLegalActions)?;
        Ok(scored
            .into_iter()
            .filter(|&(_, score)| score == best)
            .map(|(action, _)| action)
            .collect())
    }

    /// Game-theoretic value of the position for the player to move.
    pub fn value(&mut self, state: &GameState) -> Result<i32> {
        self.evaluate_actions(state)?
            .into_iter()
            .map(|(_, score)| score)
            .max()
            .ok_or(Error::NoLegalActions)
    }

    fn pick<R: Rng + ?Sized>(&self, candidates: &[usize], rng: &mut R) -> Result<usize> {
        let chosen = match self.tie_break {
            TieBreak::Lowest => candidates.first(),
            TieBreak::Random => candidates.choose(rng),
        };
        chosen.copied().ok_or(Error::NoLegalActions)
    }

    fn search(
        &mut self,
        state: &GameState,
        depth: usize,
        mut alpha: i32,
        mut beta: i32,
        invoker: Player,
    ) -> i32 {
        self.nodes_evaluated += 1;

        match state.outcome() {
            Outcome::Win(winner) if winner == invoker => return WIN_SCORE - depth as i32,
            Outcome::Win(_) => return depth as i32 - WIN_SCORE,
            Outcome::Draw => return 0,
            Outcome::InProgress => {}
        }
        if depth >= MAX_DEPTH {
            return 0;
        }

        let maximizing = state.to_move() == invoker;
        let mut best = if maximizing { i32::MIN } else { i32::MAX };

        for action in state.legal_actions() {
            let Ok(child) = state.with_action(action) else {
                continue;
            };
            let score = self.search(&child, depth + 1, alpha, beta, invoker);
            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_immediate_win_shortcut() {
        let mut solver = MinimaxSolver::default();
        let mut rng = StdRng::seed_from_u64(1);
        let state = GameState::from_wire(&[1, 1, 0, 0, 0, 0, 0, 0, 0], 1).unwrap();
        assert_eq!(solver.best_action(&state, &mut rng).unwrap(), 2);
        assert_eq!(solver.nodes_evaluated(), 0);
    }

    #[test]
    fn test_immediate_block_shortcut() {
        let mut solver = MinimaxSolver::default();
        let mut rng = StdRng::seed_from_u64(1);
        let state = GameState::from_wire(&[-1, -1, 0, 0, 0, 0, 0, 0, 0], 1).unwrap();
        assert_eq!(solver.best_action(&state, &mut rng).unwrap(), 2);
    }

    #[test]
    fn test_empty_board_is_a_draw() {
        let mut solver = MinimaxSolver::default();
        assert_eq!(solver.value(&GameState::new()).unwrap(), 0);
    }

    #[test]
    fn test_every_opening_is_optimal() {
        let mut solver = MinimaxSolver::default();
        let optimal = solver.optimal_actions(&GameState::new()).unwrap();
        assert_eq!(optimal, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_reply_to_corner_must_be_center() {
        let mut solver = MinimaxSolver::default();
        let state = GameState::new().with_action(0).unwrap();
        assert_eq!(solver.optimal_actions(&state).unwrap(), vec![4]);
    }

    #[test]
    fn test_faster_win_scores_higher() {
        // X to move can win now at 2; search scores it above any slower win.
        let mut solver = MinimaxSolver::default();
        let state = GameState::parse("XX.OO....").unwrap();
        let scored = solver.evaluate_actions(&state).unwrap();
        let (_, win_now) = scored.iter().find(|(a, _)| *a == 2).copied().unwrap();
        assert_eq!(win_now, WIN_SCORE);
        assert!(scored.iter().all(|&(_, s)| s <= win_now));
    }

    #[test]
    fn test_terminal_state_is_rejected() {
        let mut solver = MinimaxSolver::default();
        let mut rng = StdRng::seed_from_u64(1);
        let state = GameState::parse("XXXOO....").unwrap();
        assert!(matches!(
            solver.best_action(&state, &mut rng),
            Err(Error::NoLegalActions)
        ));
    }

    #[test]
    fn test_lowest_tie_break_is_deterministic() {
        let mut solver = MinimaxSolver::new(TieBreak::Lowest);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(solver.best_action(&GameState::new(), &mut rng).unwrap(), 0);
        let state = GameState::new().with_action(4).unwrap();
        for _ in 0..5 {
            assert_eq!(solver.best_action(&state, &mut rng).unwrap(), 0);
        }
    }

    #[test]
    fn test_random_tie_break_stays_optimal() {
        let mut solver = MinimaxSolver::new(TieBreak::Random);
        let mut rng = StdRng::seed_from_u64(7);
        let state = GameState::new().with_action(4).unwrap();
        let optimal = solver.optimal_actions(&state).unwrap();
        assert_eq!(optimal, vec![0, 2, 6, 8]);
        for _ in 0..20 {
            let action = solver.best_action(&state, &mut rng).unwrap();
            assert!(optimal.contains(&action));
        }
    }
}
