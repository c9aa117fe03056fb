//! Error types for board and search operations

use thiserror::Error;

/// Errors raised by the board model and the search engine
///
/// Every error is a caller bug rather than a transient condition, so none of
/// them are retried or recovered inside the crate.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid move: cell ({row}, {column}) is already occupied")]
    InvalidMove { row: usize, column: usize },

    #[error("invalid move: cell ({row}, {column}) is off the board")]
    OutOfBounds { row: usize, column: usize },

    #[error("invalid move: cell number {0} is not between 1 and 9")]
    InvalidCellNumber(usize),

    #[error("invalid state: the game is already over")]
    GameOver,

    #[error("invalid state: the game is still in progress")]
    GameInProgress,

    #[error("could not parse '{0}' as a board cell or move")]
    InvalidCharacter(char),

    #[error("board string has {0} cells, expected 9")]
    InvalidLength(usize),

    #[error("invalid piece counts: X={x_count}, O={o_count} (must be equal or X ahead by 1)")]
    InvalidPieceCounts { x_count: usize, o_count: usize },
}

impl Error {
    /// Whether this error reports a move that cannot be played on the board
    pub fn is_invalid_move(&self) -> bool {
        matches!(
            self,
            Error::InvalidMove { .. } | Error::OutOfBounds { .. } | Error::InvalidCellNumber(_)
        )
    }

    /// Whether this error reports an operation called in the wrong game phase
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Error::GameOver | Error::GameInProgress)
    }
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;
