//! Head-to-head evaluation between two agents

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::agents::{HeuristicAgent, RandomAgent, SolverAgent, UnbeatableAgent};
use crate::{
    Error, Result,
    ports::Agent,
    tictactoe::{GameState, Outcome, Player},
};

/// Which side the evaluated agent plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    /// X in even games, O in odd games
    #[default]
    Alternate,
    First,
    Second,
}

impl Seat {
    fn player_for_game(self, game: usize) -> Player {
        match self {
            Seat::First => Player::X,
            Seat::Second => Player::O,
            Seat::Alternate if game % 2 == 0 => Player::X,
            Seat::Alternate => Player::O,
        }
    }
}

/// Built-in opponents for evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpponentKind {
    Random,
    Heuristic,
    Minimax,
    Unbeatable,
}

impl OpponentKind {
    pub const ALL: [OpponentKind; 4] = [
        OpponentKind::Random,
        OpponentKind::Heuristic,
        OpponentKind::Minimax,
        OpponentKind::Unbeatable,
    ];

    pub fn build(self, seed: Option<u64>) -> Box<dyn Agent> {
        match self {
            OpponentKind::Random => Box::new(RandomAgent::new(seed)),
            OpponentKind::Heuristic => Box::new(HeuristicAgent::new(seed)),
            OpponentKind::Minimax => Box::new(SolverAgent::new(seed)),
            OpponentKind::Unbeatable => Box::new(UnbeatableAgent::new(seed)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OpponentKind::Random => "random",
            OpponentKind::Heuristic => "heuristic",
            OpponentKind::Minimax => "minimax",
            OpponentKind::Unbeatable => "unbeatable",
        }
    }
}

impl fmt::Display for OpponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpponentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        OpponentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidConfiguration {
                message: format!(
                    "unknown opponent '{s}' (expected random, heuristic, minimax or unbeatable)"
                ),
            })
    }
}

/// Win/draw/loss tally from the evaluated agent's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub agent: String,
    pub opponent: String,
    pub games: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,
    pub avg_game_length: f64,
}

impl EvaluationResult {
    fn rate(count: usize, games: usize) -> f64 {
        if games == 0 {
            0.0
        } else {
            count as f64 / games as f64
        }
    }
}

/// Play one game to the end, X moving first.
pub fn play_game(x: &mut dyn Agent, o: &mut dyn Agent) -> Result<(Outcome, usize)> {
    let mut state = GameState::new();
    while !state.is_terminal() {
        let action = match state.to_move() {
            Player::X => x.select_move(&state)?,
            Player::O => o.select_move(&state)?,
        };
        state.apply(action)?;
    }
    Ok((state.outcome(), state.move_count()))
}

/// Play `games` games between `agent` and `opponent`.
///
/// # Errors
///
/// Propagates the first illegal move either agent makes.
pub fn evaluate(
    agent: &mut dyn Agent,
    opponent: &mut dyn Agent,
    games: usize,
    seat: Seat,
) -> Result<EvaluationResult> {
    let mut wins = 0;
    let mut draws = 0;
    let mut losses = 0;
    let mut total_length = 0;

    for game in 0..games {
        let seat_player = seat.player_for_game(game);
        let (outcome, length) = match seat_player {
            Player::X => play_game(agent, opponent)?,
            Player::O => play_game(opponent, agent)?,
        };
        total_length += length;
        match outcome {
            Outcome::Win(winner) if winner == seat_player => wins += 1,
            Outcome::Win(_) => losses += 1,
            _ => draws += 1,
        }
    }

    debug!(
        agent = agent.name(),
        opponent = opponent.name(),
        games,
        wins,
        draws,
        losses,
        "evaluation finished"
    );

    Ok(EvaluationResult {
        agent: agent.name().to_string(),
        opponent: opponent.name().to_string(),
        games,
        wins,
        draws,
        losses,
        win_rate: EvaluationResult::rate(wins, games),
        draw_rate: EvaluationResult::rate(draws, games),
        loss_rate: EvaluationResult::rate(losses, games),
        avg_game_length: if games == 0 {
            0.0
        } else {
            total_length as f64 / games as f64
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_kind_parsing() {
        assert_eq!("Minimax".parse::<OpponentKind>().unwrap(), OpponentKind::Minimax);
        assert_eq!(" random ".parse::<OpponentKind>().unwrap(), OpponentKind::Random);
        let err = "optimal".parse::<OpponentKind>().unwrap_err();
        assert_eq!(err.code(), "invalid_configuration");
    }

    #[test]
    fn test_solver_against_itself_draws() {
        let mut a = SolverAgent::new(Some(1));
        let mut b = SolverAgent::new(Some(2));
        let result = evaluate(&mut a, &mut b, 20, Seat::Alternate).unwrap();
        assert_eq!(result.draws, 20);
        assert_eq!(result.draw_rate, 1.0);
        assert_eq!(result.avg_game_length, 9.0);
    }

    #[test]
    fn test_counts_add_up() {
        let mut a = RandomAgent::new(Some(1));
        let mut b = HeuristicAgent::new(Some(2));
        let result = evaluate(&mut a, &mut b, 50, Seat::First).unwrap();
        assert_eq!(result.wins + result.draws + result.losses, 50);
        assert!((result.win_rate + result.draw_rate + result.loss_rate - 1.0).abs() < 1e-12);
        assert!(result.avg_game_length >= 5.0 && result.avg_game_length <= 9.0);
        assert_eq!(result.agent, "random");
        assert_eq!(result.opponent, "heuristic");
    }

    #[test]
    fn test_unbeatable_never_loses_to_heuristic() {
        let mut agent = OpponentKind::Unbeatable.build(Some(3));
        let mut opponent = OpponentKind::Heuristic.build(Some(4));
        let result = evaluate(agent.as_mut(), opponent.as_mut(), 40, Seat::Alternate).unwrap();
        assert_eq!(result.losses, 0);
    }

    #[test]
    fn test_zero_games() {
        let mut a = RandomAgent::new(Some(1));
        let mut b = RandomAgent::new(Some(2));
        let result = evaluate(&mut a, &mut b, 0, Seat::Second).unwrap();
        assert_eq!(result.games, 0);
        assert_eq!(result.win_rate, 0.0);
    }
}
