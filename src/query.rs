//! Request/response types for single-move queries
//!
//! These are the shapes an HTTP or CLI surface exchanges with the engine.
//! Boards travel as nine integers in row-major order: `1` for X, `-1` for
//! O, `0` for empty.

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::Agent,
    tictactoe::{GameState, Player},
};

/// Board plus whose turn it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveQuery {
    pub board: Vec<i64>,
    /// `1` or `-1`; inferred from piece counts when absent
    #[serde(default)]
    pub mover: Option<i64>,
}

/// Chosen move and the position it leads to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    pub action: usize,
    pub board: Vec<i8>,
    pub terminal: bool,
    /// `1`, `-1`, `0` for a draw, or null while the game continues
    pub winner: Option<i8>,
}

/// Structured failure for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveError {
    pub code: String,
    pub message: String,
    pub status: u16,
}

impl From<&Error> for MoveError {
    fn from(err: &Error) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            status: err.status(),
        }
    }
}

impl From<Error> for MoveError {
    fn from(err: Error) -> Self {
        MoveError::from(&err)
    }
}

/// Legality report for a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub terminal: bool,
    pub winner: Option<i8>,
    pub legal_actions: Vec<usize>,
    /// Reason the board was rejected, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Decode a wire board; without a mover, it is inferred from piece counts.
pub fn decode_board(board: &[i64], mover: Option<i64>) -> Result<GameState> {
    let state = GameState::from_wire(board, mover.unwrap_or(1))?;
    if mover.is_some() {
        return Ok(state);
    }
    let cells = *state.cells();
    Ok(GameState::from_cells(cells, GameState::infer_mover(&cells)))
}

/// Ask `agent` for a move on the queried board and apply it.
///
/// # Errors
///
/// Returns a malformed-input error for bad boards or movers, and
/// [`Error::BoardAlreadyDecided`] when the board is already won or full.
pub fn choose_move(agent: &mut dyn Agent, query: &MoveQuery) -> Result<MoveResponse> {
    let mut state = decode_board(&query.board, query.mover)?;
    if state.is_terminal() {
        return Err(Error::BoardAlreadyDecided);
    }

    let action = agent.select_move(&state)?;
    state.apply(action)?;

    let outcome = state.outcome();
    Ok(MoveResponse {
        action,
        board: state.to_wire().to_vec(),
        terminal: outcome.is_terminal(),
        winner: outcome.winner_sign(),
    })
}

/// Same as [`choose_move`] but with failures rendered as [`MoveError`].
pub fn answer(
    agent: &mut dyn Agent,
    query: &MoveQuery,
) -> std::result::Result<MoveResponse, MoveError> {
    choose_move(agent, query).map_err(MoveError::from)
}

/// Check a board without choosing a move. The mover is inferred.
pub fn validate(board: &[i64]) -> ValidationResponse {
    match decode_board(board, None) {
        Ok(state) => {
            let outcome = state.outcome();
            ValidationResponse {
                valid: true,
                terminal: outcome.is_terminal(),
                winner: outcome.winner_sign(),
                legal_actions: state.legal_actions(),
                error: None,
            }
        }
        Err(err) => ValidationResponse {
            valid: false,
            terminal: false,
            winner: None,
            legal_actions: Vec::new(),
            error: Some(err.to_string()),
        },
    }
}

/// Player a query's mover resolves to.
pub fn resolve_mover(query: &MoveQuery) -> Result<Player> {
    decode_board(&query.board, query.mover).map(|state| state.to_move())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{RandomAgent, SolverAgent};

    #[test]
    fn test_move_query_takes_the_win() {
        let mut agent = SolverAgent::new(Some(1));
        let query = MoveQuery {
            board: vec![1, 1, 0, -1, -1, 0, 0, 0, 0],
            mover: Some(1),
        };
        let response = choose_move(&mut agent, &query).unwrap();
        assert_eq!(response.action, 2);
        assert_eq!(response.board, vec![1, 1, 1, -1, -1, 0, 0, 0, 0]);
        assert!(response.terminal);
        assert_eq!(response.winner, Some(1));
    }

    #[test]
    fn test_move_query_blocks() {
        let mut agent = SolverAgent::new(Some(1));
        let query = MoveQuery {
            board: vec![-1, -1, 0, 0, 0, 0, 0, 0, 0],
            mover: Some(1),
        };
        let response = choose_move(&mut agent, &query).unwrap();
        assert_eq!(response.action, 2);
        assert!(!response.terminal);
        assert_eq!(response.winner, None);
    }

    #[test]
    fn test_malformed_boards_are_rejected() {
        let mut agent = RandomAgent::new(Some(1));
        let short = MoveQuery {
            board: vec![0; 8],
            mover: Some(1),
        };
        let err = answer(&mut agent, &short).unwrap_err();
        assert_eq!(err.code, "malformed_input");
        assert_eq!(err.status, 400);

        let bad_symbol = MoveQuery {
            board: vec![0, 0, 2, 0, 0, 0, 0, 0, 0],
            mover: Some(1),
        };
        assert_eq!(answer(&mut agent, &bad_symbol).unwrap_err().code, "malformed_input");

        let bad_mover = MoveQuery {
            board: vec![0; 9],
            mover: Some(0),
        };
        assert_eq!(answer(&mut agent, &bad_mover).unwrap_err().code, "malformed_input");
    }

    #[test]
    fn test_decided_board_is_rejected() {
        let mut agent = RandomAgent::new(Some(1));
        let query = MoveQuery {
            board: vec![1, 1, 1, -1, -1, 0, 0, 0, 0],
            mover: Some(-1),
        };
        let err = answer(&mut agent, &query).unwrap_err();
        assert_eq!(err.code, "board_decided");
        assert_eq!(err.status, 400);
    }

    #[test]
    fn test_mover_is_inferred() {
        let query: MoveQuery = serde_json::from_str(r#"{"board":[1,0,0,0,0,0,0,0,0]}"#).unwrap();
        assert_eq!(resolve_mover(&query).unwrap(), Player::O);
    }

    #[test]
    fn test_validation() {
        let open = validate(&[1, -1, 0, 0, 0, 0, 0, 0, 0]);
        assert!(open.valid);
        assert!(!open.terminal);
        assert_eq!(open.legal_actions, vec![2, 3, 4, 5, 6, 7, 8]);

        let won = validate(&[-1, -1, -1, 1, 1, 0, 1, 0, 0]);
        assert!(won.valid);
        assert!(won.terminal);
        assert_eq!(won.winner, Some(-1));
        assert!(won.legal_actions.is_empty());

        let drawn = validate(&[1, -1, 1, 1, -1, -1, -1, 1, 1]);
        assert!(drawn.terminal);
        assert_eq!(drawn.winner, Some(0));

        let broken = validate(&[1, 1]);
        assert!(!broken.valid);
        assert!(broken.error.is_some());
    }

    #[test]
    fn test_response_json_shape() {
        let response = MoveResponse {
            action: 4,
            board: vec![0, 0, 0, 0, 1, 0, 0, 0, 0],
            terminal: false,
            winner: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["action"], 4);
        assert!(json["winner"].is_null());
    }
}
