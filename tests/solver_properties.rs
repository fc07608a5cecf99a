//! Optimality of the exact solver and the shared tactical shortcuts

use oxo::{
    HybridPolicy,
    config::LearnerConfig,
    pipeline::{HeuristicAgent, OpponentKind, RandomAgent, Seat, SolverAgent, evaluate},
    ports::Agent,
    q_learning::DualQLearner,
    solver::{MinimaxSolver, TieBreak},
    tictactoe::{GameState, Outcome},
};
use rand::{SeedableRng, rngs::StdRng};

mod optimality {
    use super::*;

    /// Two solvers from every opening square always draw.
    #[test]
    fn test_solver_self_play_draws_from_every_opening() {
        let mut x = MinimaxSolver::new(TieBreak::Random);
        let mut o = MinimaxSolver::new(TieBreak::Random);
        let mut rng = StdRng::seed_from_u64(2024);

        for opening in 0..9 {
            for trial in 0..100 {
                let mut state = GameState::new();
                state.apply(opening).unwrap();
                while !state.is_terminal() {
                    let solver = if state.move_count() % 2 == 0 {
                        &mut x
                    } else {
                        &mut o
                    };
                    let action = solver.best_action(&state, &mut rng).unwrap();
                    state.apply(action).unwrap();
                }
                assert_eq!(
                    state.outcome(),
                    Outcome::Draw,
                    "opening {opening}, trial {trial}: {}",
                    state.encode()
                );
            }
        }
    }

    #[test]
    fn test_solver_never_loses_to_random() {
        let mut solver = SolverAgent::new(Some(7));
        let mut random = RandomAgent::new(Some(8));

        for seat in [Seat::First, Seat::Second] {
            let result = evaluate(&mut solver, &mut random, 1000, seat).unwrap();
            assert_eq!(result.losses, 0, "seat {seat:?}");
            assert!(result.wins > result.draws, "seat {seat:?}");
        }
    }

    #[test]
    fn test_unbeatable_never_loses_to_any_baseline() {
        for kind in OpponentKind::ALL {
            let mut agent = OpponentKind::Unbeatable.build(Some(11));
            let mut opponent = kind.build(Some(12));
            let result = evaluate(agent.as_mut(), opponent.as_mut(), 100, Seat::Alternate).unwrap();
            assert_eq!(result.losses, 0, "against {kind}");
        }
    }

    #[test]
    fn test_every_reply_to_the_center_is_scored_exactly() {
        let mut solver = MinimaxSolver::default();
        let state = GameState::parse("....X....").unwrap();
        let scored = solver.evaluate_actions(&state).unwrap();
        for (action, score) in scored {
            match action {
                0 | 2 | 6 | 8 => assert_eq!(score, 0, "corner {action}"),
                _ => assert!(score < 0, "edge {action} should lose"),
            }
        }
    }
}

mod tactics {
    use super::*;

    fn win_board() -> GameState {
        GameState::from_wire(&[1, 1, 0, 0, 0, 0, 0, 0, 0], 1).unwrap()
    }

    fn block_board() -> GameState {
        GameState::from_wire(&[-1, -1, 0, 0, 0, 0, 0, 0, 0], 1).unwrap()
    }

    #[test]
    fn test_solver_takes_win_and_block() {
        let mut solver = MinimaxSolver::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(solver.best_action(&win_board(), &mut rng).unwrap(), 2);
        assert_eq!(solver.best_action(&block_board(), &mut rng).unwrap(), 2);
    }

    #[test]
    fn test_policy_takes_win_and_block() {
        let learner = DualQLearner::new(LearnerConfig::default()).with_seed(0);
        let policy = HybridPolicy::new(&learner);
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..50 {
            assert_eq!(policy.choose(&win_board(), &mut rng).unwrap(), 2);
            assert_eq!(policy.choose(&block_board(), &mut rng).unwrap(), 2);
        }
    }

    #[test]
    fn test_every_agent_takes_win_and_block() {
        let mut agents: Vec<Box<dyn Agent>> = vec![
            Box::new(HeuristicAgent::new(Some(1))),
            Box::new(SolverAgent::new(Some(1))),
            OpponentKind::Unbeatable.build(Some(1)),
        ];
        for agent in agents.iter_mut() {
            assert_eq!(agent.select_move(&win_board()).unwrap(), 2, "{}", agent.name());
            assert_eq!(agent.select_move(&block_board()).unwrap(), 2, "{}", agent.name());
        }
    }
}
