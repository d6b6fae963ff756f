use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Too many bombs for the board size")]
    TooManyBombs,
    #[error("Fixed-capacity {0} buffer is full")]
    CapacityExceeded(&'static str),
}

pub type Result<T> = core::result::Result<T, GameError>;
