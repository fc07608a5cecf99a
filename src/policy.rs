//! Single action-selection entry point over tactics, rollouts and the table

use rand::{Rng, seq::IndexedRandom};

use crate::{
    Error, Result,
    config::LearnerConfig,
    q_learning::DualQLearner,
    tictactoe::{GameState, Outcome, tactics},
};

/// Move selection built on a learned table.
///
/// Order of precedence:
/// 1. immediate win, then immediate block;
/// 2. with few legal moves left, random playouts per candidate;
/// 3. ε-greedy over the combined table values.
///
/// Guaranteed-optimal play needs [`crate::solver::MinimaxSolver`] directly;
/// this policy never consults it.
#[derive(Debug, Clone, Copy)]
pub struct HybridPolicy<'a> {
    learner: &'a DualQLearner,
    explore: bool,
    rollout_samples: usize,
    rollout_threshold: usize,
}

impl<'a> HybridPolicy<'a> {
    /// Policy that explores with the learner's current ε.
    pub fn new(learner: &'a DualQLearner) -> Self {
        let config: &LearnerConfig = learner.config();
        Self {
            learner,
            explore: true,
            rollout_samples: config.rollout_samples,
            rollout_threshold: config.rollout_threshold,
        }
    }

    /// Same precedence, but the table step is always greedy.
    pub fn greedy(learner: &'a DualQLearner) -> Self {
        Self {
            explore: false,
            ..Self::new(learner)
        }
    }

    pub fn learner(&self) -> &DualQLearner {
        self.learner
    }

    /// Choose a move for the player to move.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoLegalActions`] if the state is terminal.
    pub fn choose<R: Rng + ?Sized>(&self, state: &GameState, rng: &mut R) -> Result<usize> {
        let legal = state.legal_actions();
        if legal.is_empty() {
            return Err(Error::NoLegalActions);
        }

        if let Some(action) = tactics::tactical_move(state) {
            return Ok(action);
        }

        if legal.len() <= self.rollout_threshold {
            return self.rollout_choice(state, &legal, rng);
        }

        self.learner.select_action(state, self.explore, rng)
    }

    /// Score each candidate by random playouts: 1 per win for the mover,
    /// 0.5 per draw. The first best-scoring candidate wins.
    fn rollout_choice<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        legal: &[usize],
        rng: &mut R,
    ) -> Result<usize> {
        let mover = state.to_move();
        let mut best: Option<(usize, f64)> = None;

        for &action in legal {
            let mut score = 0.0;
            for _ in 0..self.rollout_samples {
                let mut sim = state.with_action(action)?;
                while !sim.is_terminal() {
                    let moves = sim.legal_actions();
                    let Some(&next) = moves.choose(rng) else {
                        break;
                    };
                    sim.apply(next)?;
                }
                score += match sim.outcome() {
                    Outcome::Win(winner) if winner == mover => 1.0,
                    Outcome::Draw => 0.5,
                    _ => 0.0,
                };
            }
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((action, score));
            }
        }

        best.map(|(action, _)| action).ok_or(Error::NoLegalActions)
    }
}
