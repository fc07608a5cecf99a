//! Per-ply shaping reward for non-terminal transitions

use crate::{
    config::RewardShaping,
    tictactoe::{Cell, LineAnalyzer, Player},
    types::BOARD_SIZE,
};

const CENTER: usize = 4;
const CORNERS: [usize; 4] = [0, 2, 6, 8];
const EDGES: [usize; 4] = [1, 3, 5, 7];

/// Score the board left after `player` made the `move_count`-th move.
///
/// Each line contributes at most one of: completed line, open two, opponent
/// open two, open one. Positional bonuses, the late-game penalty, and the
/// fork bonus are added on top.
pub fn shaped_reward(
    cells: &[Cell; BOARD_SIZE],
    player: Player,
    move_count: usize,
    weights: &RewardShaping,
) -> f64 {
    let mut reward = 0.0;

    for count in LineAnalyzer::line_counts(cells, player) {
        reward += match (count.own, count.opponent, count.empty) {
            (3, _, _) => weights.completed_line,
            (2, 0, 1) => weights.open_two,
            (0, 2, 1) => weights.opponent_open_two,
            (1, 0, 2) => weights.open_one,
            _ => 0.0,
        };
    }

    let own = player.to_cell();
    if cells[CENTER] == own {
        reward += weights.center;
    }
    reward += weights.corner * CORNERS.iter().filter(|&&i| cells[i] == own).count() as f64;
    reward += weights.edge * EDGES.iter().filter(|&&i| cells[i] == own).count() as f64;

    if move_count > weights.efficiency_after {
        reward -= weights.efficiency_penalty * (move_count - weights.efficiency_after) as f64;
    }

    let threats = LineAnalyzer::threat_count(cells, player);
    reward += weights.fork * threats.saturating_sub(1) as f64;

    reward
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tictactoe::GameState;

    fn reward(board: &str, player: Player, move_count: usize) -> f64 {
        let state = GameState::parse(board).unwrap();
        shaped_reward(state.cells(), player, move_count, &RewardShaping::default())
    }

    #[test]
    fn test_completed_line_beats_open_two() {
        let completed = reward("XXX......", Player::X, 3);
        let open_two = reward("XX.......", Player::X, 3);
        assert!(completed > open_two);
    }

    #[test]
    fn test_open_two_beats_scattered_pieces() {
        let mut weights = RewardShaping::default();
        weights.center = 0.0;
        weights.corner = 0.0;
        weights.edge = 0.0;
        let connected = GameState::parse("XX.......").unwrap();
        let scattered = GameState::parse("X....X...").unwrap();
        assert!(
            shaped_reward(connected.cells(), Player::X, 3, &weights)
                > shaped_reward(scattered.cells(), Player::X, 3, &weights)
        );
    }

    #[test]
    fn test_own_threat_outweighs_opponent_threat() {
        let mut weights = RewardShaping::default();
        weights.center = 0.0;
        weights.corner = 0.0;
        weights.edge = 0.0;
        weights.open_one = 0.0;
        let state = GameState::parse("XX.......").unwrap();
        let own = shaped_reward(state.cells(), Player::X, 3, &weights);
        let theirs = shaped_reward(state.cells(), Player::O, 3, &weights);
        assert!(own > theirs);
        assert!(theirs > 0.0);
    }

    #[test]
    fn test_center_preferred_over_corner_over_edge() {
        let center = reward("....X....", Player::X, 1);
        let corner = reward("X........", Player::X, 1);
        let edge = reward(".X.......", Player::X, 1);
        assert!(center > corner);
        assert!(corner > edge);
    }

    #[test]
    fn test_long_games_are_penalised() {
        let short = reward("X...O....", Player::X, 5);
        let long = reward("X...O....", Player::X, 8);
        assert!(short > long);
    }

    #[test]
    fn test_fork_earns_bonus() {
        let mut weights = RewardShaping::default();
        let state = GameState::parse("XX.X.....").unwrap();
        let with_fork = shaped_reward(state.cells(), Player::X, 3, &weights);
        weights.fork = 0.0;
        let without = shaped_reward(state.cells(), Player::X, 3, &weights);
        assert!(with_fork > without);
    }
}
