use std::io;

use minesweeper_common::models::{Outcome, Pos};
use thiserror::Error;

/// A difficulty setting that cannot become a board.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid height {value}: must be between {min} and {max}")]
    Height { value: usize, min: usize, max: usize },
    #[error("invalid width {value}: must be between {min} and {max}")]
    Width { value: usize, min: usize, max: usize },
    #[error("invalid number of mines {value}: must be between {min} and {max}")]
    Mines { value: usize, min: usize, max: usize },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("position {pos} is outside the {width}x{height} board")]
pub struct BoundsError {
    pub pos: Pos,
    pub width: usize,
    pub height: usize,
}

/// A board request that was refused. Nothing was changed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    OutOfBounds(#[from] BoundsError),
    #[error("square {0} is already revealed")]
    AlreadyRevealed(Pos),
    #[error("the game is over ({0}), start a new one")]
    SessionEnded(Outcome),
    #[error(transparent)]
    InvalidBoard(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read savegame: {0}")]
    Io(#[from] io::Error),
    #[error("savegame is not readable: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported savegame version {0}")]
    UnsupportedVersion(u32),
    #[error("savegame has invalid dimensions: {0}")]
    InvalidDimensions(#[source] ConfigError),
    #[error("savegame has {found} squares, expected {expected}")]
    CellCountMismatch { expected: usize, found: usize },
    #[error("savegame has {found} mines, expected {expected}")]
    MineCountMismatch { expected: usize, found: usize },
    #[error("savegame is inconsistent: {0}")]
    Inconsistent(&'static str),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("could not write savegame: {0}")]
    Io(#[from] io::Error),
    #[error("could not encode savegame: {0}")]
    Encode(#[from] serde_json::Error),
}
