//! Board state representation and the rules of play

use std::fmt;

use serde::{Deserialize, Serialize};

use super::lines::LineAnalyzer;
use crate::{Error, Result, types::BOARD_SIZE};

/// A cell on the Tic-Tac-Toe board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    X,
    O,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }

    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' | ' ' | '-' | '_' => Some(Cell::Empty),
            'X' | 'x' => Some(Cell::X),
            'O' | 'o' | '0' => Some(Cell::O),
            _ => None,
        }
    }

    /// Wire value of the cell: X = +1, O = -1, empty = 0.
    pub fn to_wire(self) -> i8 {
        match self {
            Cell::Empty => 0,
            Cell::X => 1,
            Cell::O => -1,
        }
    }

    pub fn from_wire(value: i8) -> Option<Cell> {
        match value {
            0 => Some(Cell::Empty),
            1 => Some(Cell::X),
            -1 => Some(Cell::O),
            _ => None,
        }
    }

    /// Get the player occupying this cell, if any
    pub fn to_player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Player::X),
            Cell::O => Some(Player::O),
        }
    }
}

/// A player in the game. X always opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Get the opponent player
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Convert player to cell
    pub fn to_cell(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }

    /// Wire sign of the player: X = +1, O = -1.
    pub fn sign(self) -> i8 {
        match self {
            Player::X => 1,
            Player::O => -1,
        }
    }

    pub fn from_sign(value: i64) -> Option<Player> {
        match value {
            1 => Some(Player::X),
            -1 => Some(Player::O),
            _ => None,
        }
    }
}

/// Outcome of a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    InProgress,
    Win(Player),
    Draw,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    /// Winner as a wire value: +1, -1, 0 for a draw, `None` while in progress.
    pub fn winner_sign(self) -> Option<i8> {
        match self {
            Outcome::InProgress => None,
            Outcome::Win(player) => Some(player.sign()),
            Outcome::Draw => Some(0),
        }
    }
}

/// Complete game state: cells, whose turn it is, and the cached outcome.
///
/// `GameState` is `Copy`, so every lookahead branch owns an independent
/// value. Once the outcome is terminal no further move is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameState {
    cells: [Cell; BOARD_SIZE],
    to_move: Player,
    outcome: Outcome,
    move_count: u8,
}

impl GameState {
    /// Create a new empty board with X to move
    pub fn new() -> Self {
        GameState {
            cells: [Cell::Empty; BOARD_SIZE],
            to_move: Player::X,
            outcome: Outcome::InProgress,
            move_count: 0,
        }
    }

    /// Build a state from raw cells and the player to move.
    ///
    /// Piece counts are not checked, which lets analysis code pose
    /// hypothetical positions. The outcome and move count are derived from
    /// the cells.
    pub fn from_cells(cells: [Cell; BOARD_SIZE], to_move: Player) -> Self {
        let move_count = cells.iter().filter(|&&c| c != Cell::Empty).count() as u8;
        GameState {
            cells,
            to_move,
            outcome: Self::evaluate_cells(&cells),
            move_count,
        }
    }

    /// Parse a board string such as `"XO.X....."` with an optional `_X`/`_O`
    /// suffix naming the player to move. Without a suffix the mover is
    /// inferred from the piece counts (X opens).
    pub fn parse(s: &str) -> Result<Self> {
        let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let (board_part, suffix) = match cleaned.split_once('_') {
            Some((board, suffix)) => (board, Some(suffix)),
            None => (cleaned.as_str(), None),
        };

        let chars: Vec<char> = board_part.chars().collect();
        if chars.len() != BOARD_SIZE {
            return Err(Error::InvalidBoardString {
                input: s.to_string(),
                reason: format!("expected {BOARD_SIZE} cells, got {}", chars.len()),
            });
        }

        let mut cells = [Cell::Empty; BOARD_SIZE];
        for (i, &c) in chars.iter().enumerate() {
            cells[i] = Cell::from_char(c).ok_or_else(|| Error::InvalidBoardString {
                input: s.to_string(),
                reason: format!("invalid character '{c}' at position {i}"),
            })?;
        }

        let to_move = match suffix {
            Some("X") | Some("x") => Player::X,
            Some("O") | Some("o") => Player::O,
            Some(other) => {
                return Err(Error::InvalidBoardString {
                    input: s.to_string(),
                    reason: format!("invalid player suffix '{other}'"),
                });
            }
            None => Self::infer_mover(&cells),
        };

        Ok(Self::from_cells(cells, to_move))
    }

    /// Decode a wire board (nine values in {-1, 0, 1}) and the mover sign.
    pub fn from_wire(board: &[i64], mover: i64) -> Result<Self> {
        if board.len() != BOARD_SIZE {
            return Err(Error::MalformedBoard {
                expected: BOARD_SIZE,
                got: board.len(),
            });
        }
        let mut cells = [Cell::Empty; BOARD_SIZE];
        for (position, (&value, slot)) in board.iter().zip(cells.iter_mut()).enumerate() {
            *slot = i8::try_from(value)
                .ok()
                .and_then(Cell::from_wire)
                .ok_or(Error::InvalidCellValue { value, position })?;
        }
        let to_move = Player::from_sign(mover).ok_or(Error::InvalidMover { value: mover })?;
        Ok(Self::from_cells(cells, to_move))
    }

    /// Mover implied by piece counts: X when counts are equal, O otherwise.
    pub fn infer_mover(cells: &[Cell; BOARD_SIZE]) -> Player {
        let x = cells.iter().filter(|&&c| c == Cell::X).count();
        let o = cells.iter().filter(|&&c| c == Cell::O).count();
        if x > o { Player::O } else { Player::X }
    }

    pub fn cells(&self) -> &[Cell; BOARD_SIZE] {
        &self.cells
    }

    pub fn to_move(&self) -> Player {
        self.to_move
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Number of occupied cells
    pub fn move_count(&self) -> usize {
        self.move_count as usize
    }

    /// Get cell at position (0-8)
    pub fn get(&self, pos: usize) -> Cell {
        self.cells[pos]
    }

    /// Check if a position is empty
    pub fn is_empty(&self, pos: usize) -> bool {
        self.cells[pos] == Cell::Empty
    }

    /// Get all empty positions
    pub fn empty_positions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == Cell::Empty)
            .map(|(i, _)| i)
            .collect()
    }

    /// Legal actions: empty cells while the game is undecided, nothing after.
    pub fn legal_actions(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.empty_positions()
    }

    /// Claim `action` for the player to move.
    ///
    /// The state is left untouched when the move is rejected. The turn only
    /// passes to the opponent if the game continues.
    pub fn apply(&mut self, action: usize) -> Result<()> {
        if self.is_terminal() {
            return Err(Error::NoLegalActions);
        }
        if action >= BOARD_SIZE || !self.is_empty(action) {
            return Err(Error::InvalidMove { position: action });
        }

        self.cells[action] = self.to_move.to_cell();
        self.move_count += 1;
        self.outcome = self.evaluate_terminal();
        if !self.outcome.is_terminal() {
            self.to_move = self.to_move.opponent();
        }
        Ok(())
    }

    /// Apply a move to a copy and return it
    #[must_use = "with_action returns a new state; the original is unchanged"]
    pub fn with_action(&self, action: usize) -> Result<GameState> {
        let mut next = *self;
        next.apply(action)?;
        Ok(next)
    }

    /// Recompute the outcome from the cells.
    pub fn evaluate_terminal(&self) -> Outcome {
        Self::evaluate_cells(&self.cells)
    }

    fn evaluate_cells(cells: &[Cell; BOARD_SIZE]) -> Outcome {
        if LineAnalyzer::has_won(cells, Player::X) {
            Outcome::Win(Player::X)
        } else if LineAnalyzer::has_won(cells, Player::O) {
            Outcome::Win(Player::O)
        } else if cells.contains(&Cell::Empty) {
            Outcome::InProgress
        } else {
            Outcome::Draw
        }
    }

    /// Check if the game is over (win or draw)
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }

    /// Get the winner if there is one
    pub fn winner(&self) -> Option<Player> {
        match self.outcome {
            Outcome::Win(player) => Some(player),
            _ => None,
        }
    }

    /// Check if a player has a completed line
    pub fn has_won(&self, player: Player) -> bool {
        LineAnalyzer::has_won(&self.cells, player)
    }

    /// Cells relabelled from the mover's point of view: +1 for the player to
    /// move, -1 for the opponent, 0 for empty.
    pub fn relative_cells(&self) -> [i8; BOARD_SIZE] {
        let mut relative = [0i8; BOARD_SIZE];
        for (slot, cell) in relative.iter_mut().zip(self.cells.iter()) {
            *slot = match cell.to_player() {
                None => 0,
                Some(p) if p == self.to_move => 1,
                Some(_) => -1,
            };
        }
        relative
    }

    /// Absolute wire encoding (X = +1, O = -1)
    pub fn to_wire(&self) -> [i8; BOARD_SIZE] {
        let mut wire = [0i8; BOARD_SIZE];
        for (slot, cell) in wire.iter_mut().zip(self.cells.iter()) {
            *slot = cell.to_wire();
        }
        wire
    }

    /// Compact string form, e.g. `"XO......._X"`
    pub fn encode(&self) -> String {
        format!(
            "{}_{}",
            self.cells.iter().map(|&c| c.to_char()).collect::<String>(),
            match self.to_move {
                Player::X => 'X',
                Player::O => 'O',
            }
        )
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            let c = |col: usize| match self.cells[row * 3 + col] {
                Cell::Empty => ' ',
                other => other.to_char(),
            };
            writeln!(f, " {} | {} | {}", c(0), c(1), c(2))?;
            if row < 2 {
                writeln!(f, "---+---+---")?;
            }
        }
        Ok(())
    }
}
