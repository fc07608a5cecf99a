//! Baseline and learned agents behind the [`Agent`] port

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};

use crate::{
    Error, Result,
    policy::HybridPolicy,
    ports::Agent,
    q_learning::DualQLearner,
    solver::{MinimaxSolver, OpeningBook, TieBreak},
    tictactoe::{GameState, tactics},
};

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

fn random_legal<R: Rng + ?Sized>(state: &GameState, rng: &mut R) -> Result<usize> {
    state
        .legal_actions()
        .choose(rng)
        .copied()
        .ok_or(Error::NoLegalActions)
}

/// Uniformly random legal moves
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: rng_from(seed) }
    }
}

impl Agent for RandomAgent {
    fn select_move(&mut self, state: &GameState) -> Result<usize> {
        random_legal(state, &mut self.rng)
    }

    fn name(&self) -> &str {
        "random"
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

/// Win, block, centre, a random corner, then anything.
pub struct HeuristicAgent {
    rng: StdRng,
}

impl HeuristicAgent {
    const CENTER: usize = 4;
    const CORNERS: [usize; 4] = [0, 2, 6, 8];

    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: rng_from(seed) }
    }
}

impl Agent for HeuristicAgent {
    fn select_move(&mut self, state: &GameState) -> Result<usize> {
        if state.legal_actions().is_empty() {
            return Err(Error::NoLegalActions);
        }
        if let Some(action) = tactics::tactical_move(state) {
            return Ok(action);
        }
        if state.is_empty(Self::CENTER) {
            return Ok(Self::CENTER);
        }
        let corners: Vec<usize> = Self::CORNERS
            .into_iter()
            .filter(|&c| state.is_empty(c))
            .collect();
        if let Some(&corner) = corners.choose(&mut self.rng) {
            return Ok(corner);
        }
        random_legal(state, &mut self.rng)
    }

    fn name(&self) -> &str {
        "heuristic"
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

/// Exact minimax with a random choice among equally optimal moves
pub struct SolverAgent {
    solver: MinimaxSolver,
    rng: StdRng,
}

impl SolverAgent {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            solver: MinimaxSolver::new(TieBreak::Random),
            rng: rng_from(seed),
        }
    }

    pub fn nodes_evaluated(&self) -> u64 {
        self.solver.nodes_evaluated()
    }
}

impl Agent for SolverAgent {
    fn select_move(&mut self, state: &GameState) -> Result<usize> {
        self.solver.best_action(state, &mut self.rng)
    }

    fn name(&self) -> &str {
        "minimax"
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

/// Solver play with a varied but still optimal opening.
pub struct UnbeatableAgent {
    solver: MinimaxSolver,
    book: OpeningBook,
    rng: StdRng,
}

impl UnbeatableAgent {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            solver: MinimaxSolver::new(TieBreak::Random),
            book: OpeningBook::default(),
            rng: rng_from(seed),
        }
    }
}

impl Agent for UnbeatableAgent {
    fn select_move(&mut self, state: &GameState) -> Result<usize> {
        if let Some(action) = self.book.suggest(state, &mut self.solver, &mut self.rng)? {
            return Ok(action);
        }
        self.solver.best_action(state, &mut self.rng)
    }

    fn name(&self) -> &str {
        "unbeatable"
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

/// Frozen learner played through the greedy hybrid policy.
pub struct GreedyAgent {
    learner: DualQLearner,
    rng: StdRng,
}

impl GreedyAgent {
    pub fn new(learner: DualQLearner, seed: Option<u64>) -> Self {
        Self {
            learner,
            rng: rng_from(seed),
        }
    }

    pub fn learner(&self) -> &DualQLearner {
        &self.learner
    }
}

impl Agent for GreedyAgent {
    fn select_move(&mut self, state: &GameState) -> Result<usize> {
        HybridPolicy::greedy(&self.learner).choose(state, &mut self.rng)
    }

    fn name(&self) -> &str {
        "q-learner"
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LearnerConfig;

    fn all_agents() -> Vec<Box<dyn Agent>> {
        vec![
            Box::new(RandomAgent::new(Some(1))),
            Box::new(HeuristicAgent::new(Some(1))),
            Box::new(SolverAgent::new(Some(1))),
            Box::new(UnbeatableAgent::new(Some(1))),
            Box::new(GreedyAgent::new(
                DualQLearner::new(LearnerConfig::default()),
                Some(1),
            )),
        ]
    }

    #[test]
    fn test_every_agent_plays_legal_moves() {
        for mut agent in all_agents() {
            let mut state = GameState::new();
            while !state.is_terminal() {
                let action = agent.select_move(&state).unwrap();
                assert!(state.is_empty(action), "{} played {action}", agent.name());
                state.apply(action).unwrap();
            }
        }
    }

    #[test]
    fn test_every_agent_rejects_finished_games() {
        let done = GameState::parse("XXXOO....").unwrap();
        for mut agent in all_agents() {
            assert!(matches!(
                agent.select_move(&done),
                Err(Error::NoLegalActions)
            ));
        }
    }

    #[test]
    fn test_heuristic_prefers_center_then_corners() {
        let mut agent = HeuristicAgent::new(Some(3));
        assert_eq!(agent.select_move(&GameState::new()).unwrap(), 4);

        let after_center = GameState::parse("....X....").unwrap();
        let reply = agent.select_move(&after_center).unwrap();
        assert!([0, 2, 6, 8].contains(&reply));
    }

    #[test]
    fn test_seeded_agents_repeat() {
        let state = GameState::parse("X........").unwrap();
        let mut a = RandomAgent::new(None);
        let mut b = RandomAgent::new(None);
        a.set_rng_seed(42);
        b.set_rng_seed(42);
        for _ in 0..10 {
            assert_eq!(a.select_move(&state).unwrap(), b.select_move(&state).unwrap());
        }
    }

    #[test]
    fn test_unbeatable_opens_optimally() {
        let mut agent = UnbeatableAgent::new(Some(5));
        for _ in 0..20 {
            let action = agent.select_move(&GameState::new()).unwrap();
            assert!([0, 2, 4, 6, 8].contains(&action));
        }
    }
}
