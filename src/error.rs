//! Error types for the oxo crate

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the oxo crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid move: position {position} is occupied or out of range")]
    InvalidMove { position: usize },

    #[error("no legal actions available")]
    NoLegalActions,

    #[error("board must contain exactly {expected} cells, got {got}")]
    MalformedBoard { expected: usize, got: usize },

    #[error("invalid value {value} at position {position} (expected -1, 0 or 1)")]
    InvalidCellValue { value: i64, position: usize },

    #[error("invalid mover {value} (expected 1 or -1)")]
    InvalidMover { value: i64 },

    #[error("invalid board string '{input}': {reason}")]
    InvalidBoardString { input: String, reason: String },

    #[error("board is already decided")]
    BoardAlreadyDecided,

    #[error("invalid canonical key '{key}'")]
    InvalidKey { key: String },

    #[error("persistence failure for {path:?}: {message}")]
    Persistence { path: PathBuf, message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("invalid progress bar template: {message}")]
    ProgressBarTemplate { message: String },
}

impl Error {
    /// Stable machine-readable code used by request/response surfaces.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidMove { .. } => "invalid_move",
            Error::BoardAlreadyDecided => "board_decided",
            Error::NoLegalActions => "no_legal_actions",
            Error::MalformedBoard { .. }
            | Error::InvalidCellValue { .. }
            | Error::InvalidMover { .. }
            | Error::InvalidBoardString { .. }
            | Error::InvalidKey { .. } => "malformed_input",
            Error::InvalidConfiguration { .. } => "invalid_configuration",
            Error::Persistence { .. }
            | Error::Io { .. }
            | Error::Serialization(_)
            | Error::SerializationContext { .. }
            | Error::ProgressBarTemplate { .. } => "internal",
        }
    }

    /// HTTP-equivalent status: caller mistakes are 400, everything else 500.
    pub fn status(&self) -> u16 {
        match self.code() {
            "internal" => 500,
            _ => 400,
        }
    }
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_map_to_statuses() {
        assert_eq!(Error::MalformedBoard { expected: 9, got: 3 }.status(), 400);
        assert_eq!(Error::BoardAlreadyDecided.code(), "board_decided");
        assert_eq!(Error::InvalidMove { position: 4 }.status(), 400);
        let io = Error::from(std::io::Error::other("disk gone"));
        assert_eq!(io.code(), "internal");
        assert_eq!(io.status(), 500);
    }
}
