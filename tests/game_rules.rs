//! Rules, win detection and symmetry reduction over the full game tree

mod common;

use std::collections::HashSet;

use common::{reachable_states, relabel};
use oxo::{
    CanonicalKey,
    tictactoe::{Cell, D4Transform, GameState, Outcome, Player, WINNING_LINES, canonicalize},
};

mod state_space {
    use super::*;

    #[test]
    fn test_reachable_state_count() {
        // Standard count of legal tic-tac-toe positions
        assert_eq!(reachable_states().len(), 5478);
    }

    #[test]
    fn test_canonical_key_count() {
        let keys: HashSet<CanonicalKey> = reachable_states().iter().map(canonicalize).collect();
        // Piece counts already fix the mover in legal play, so the relative
        // encoding adds no merging beyond the eight symmetries.
        assert_eq!(keys.len(), 765);
    }
}

mod symmetry {
    use super::*;

    #[test]
    fn test_every_transform_preserves_the_key() {
        for state in reachable_states() {
            let key = canonicalize(&state);
            for t in D4Transform::all() {
                assert_eq!(
                    canonicalize(&state.transform(&t)),
                    key,
                    "transform {t:?} of {}",
                    state.encode()
                );
            }
        }
    }

    #[test]
    fn test_relabelled_transforms_preserve_the_key() {
        for state in reachable_states() {
            let swapped = relabel(&state);
            let key = canonicalize(&swapped);
            assert_eq!(key, canonicalize(&state));
            for t in D4Transform::all() {
                assert_eq!(canonicalize(&swapped.transform(&t)), key);
            }
        }
    }

    #[test]
    fn test_context_maps_moves_consistently() {
        for state in reachable_states().into_iter().filter(|s| !s.is_terminal()) {
            let ctx = state.canonical_context();
            let canonical_cells = ctx.cells;
            for action in state.legal_actions() {
                let canonical = ctx.map_to_canonical(action);
                assert_eq!(canonical_cells[canonical], 0);
                assert_eq!(ctx.map_to_original(canonical), action);
            }
        }
    }
}

mod win_detection {
    use super::*;

    #[test]
    fn test_each_line_wins_for_each_player() {
        for line in WINNING_LINES {
            for player in [Player::X, Player::O] {
                let mut cells = [Cell::Empty; 9];
                for pos in line {
                    cells[pos] = player.to_cell();
                }
                let state = GameState::from_cells(cells, player);
                assert_eq!(state.evaluate_terminal(), Outcome::Win(player));
                assert!(state.is_terminal());
                assert!(state.legal_actions().is_empty());
            }
        }
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        // X O X
        // X O O
        // O X X
        let state = GameState::parse("XOXXOOOXX").unwrap();
        assert_eq!(state.evaluate_terminal(), Outcome::Draw);
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn test_terminal_counts_match_known_totals() {
        let states = reachable_states();
        let x_wins = states
            .iter()
            .filter(|s| s.outcome() == Outcome::Win(Player::X))
            .count();
        let o_wins = states
            .iter()
            .filter(|s| s.outcome() == Outcome::Win(Player::O))
            .count();
        let draws = states.iter().filter(|s| s.outcome() == Outcome::Draw).count();
        assert_eq!(x_wins, 626);
        assert_eq!(o_wins, 316);
        assert_eq!(draws, 16);
    }

    #[test]
    fn test_moves_after_the_end_are_rejected() {
        let mut state = GameState::parse("XXXOO....").unwrap();
        let before = state;
        assert!(state.apply(5).is_err());
        assert_eq!(state, before);
    }
}
