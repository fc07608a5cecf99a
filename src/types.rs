//! Newtype wrappers shared across the solver and the learner.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Board size constant for Tic-Tac-Toe.
pub const BOARD_SIZE: usize = 9;

/// One learned value per board position.
///
/// Only entries at empty positions of the associated state are meaningful.
pub type ActionValues = [f64; BOARD_SIZE];

/// A validated canonical state key.
///
/// The key is the row-major serialization of a mover-relative board
/// (`1` for the player to move, `-1` for the opponent, `0` for empty), for
/// example `"[1, 0, -1, 0, 0, 0, 0, 0, 0]"`. It is the lexicographically
/// smallest such string among the eight symmetric images of the board.
///
/// # Examples
///
/// ```
/// use oxo::tictactoe::{GameState, canonicalize};
/// use oxo::types::CanonicalKey;
///
/// let key = canonicalize(&GameState::new());
/// assert_eq!(key.as_str(), "[0, 0, 0, 0, 0, 0, 0, 0, 0]");
///
/// let parsed = CanonicalKey::parse("[0, 0, 0, 0, 0, 0, 0, 0, 0]").unwrap();
/// assert_eq!(parsed, key);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Serialize relative cells into key form (no canonicalization applied).
    pub fn serialize_cells(cells: &[i8; BOARD_SIZE]) -> String {
        let body = cells
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("[{body}]")
    }

    /// Wrap an already-canonical serialization (for internal use).
    pub(crate) fn from_canonical(serialized: String) -> Self {
        CanonicalKey(serialized)
    }

    /// Parse and validate a key string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidKey`] if the string is not nine
    /// comma-separated values in {-1, 0, 1} wrapped in brackets.
    pub fn parse(s: &str) -> Result<Self, crate::Error> {
        let cells = Self::decode(s).ok_or_else(|| crate::Error::InvalidKey { key: s.to_string() })?;
        Ok(CanonicalKey(Self::serialize_cells(&cells)))
    }

    fn decode(s: &str) -> Option<[i8; BOARD_SIZE]> {
        let inner = s.trim().strip_prefix('[')?.strip_suffix(']')?;
        let mut cells = [0i8; BOARD_SIZE];
        let mut count = 0;
        for part in inner.split(',') {
            let value: i8 = part.trim().parse().ok()?;
            if !(-1..=1).contains(&value) || count >= BOARD_SIZE {
                return None;
            }
            cells[count] = value;
            count += 1;
        }
        (count == BOARD_SIZE).then_some(cells)
    }

    /// Relative cell values encoded by this key.
    pub fn cells(&self) -> [i8; BOARD_SIZE] {
        Self::decode(&self.0).unwrap_or([0; BOARD_SIZE])
    }

    /// Positions that are empty in the keyed board.
    pub fn empty_positions(&self) -> Vec<usize> {
        self.cells()
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == 0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the underlying String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for CanonicalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
