use alloc::string::String;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Position is outside of the grid")]
    OutOfBounds,
    #[error("Operation is not valid for the current cell or game state")]
    InvalidState,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Unknown difficulty")]
    UnknownDifficulty,
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failure to restore a saved game. Hosts treat any of these as "no saved game".
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Saved game is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Saved game does not describe a valid grid: {0}")]
    Grid(#[from] GameError),
    #[error("Encoded cell {index} is malformed: {reason}")]
    Cell { index: usize, reason: String },
    #[error("Saved counters do not match the encoded grid")]
    Counts,
}
