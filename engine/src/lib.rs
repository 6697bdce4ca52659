//! The game-state engine behind a minesweeper UI.
//!
//! A [`GameSession`] owns a [`Board`] and turns reveal and flag requests into
//! board changes plus a win/loss verdict. Mines are laid out on the first
//! reveal, never under it. Empty regions open with an iterative flood fill,
//! so even the largest boards cannot exhaust the stack.
//!
//! ```
//! use minesweeper_engine::{Difficulty, GameSession, Limits, Outcome, Pos};
//!
//! let mut session = GameSession::from_difficulty(&Difficulty::Beginner, &Limits::default())?;
//! session.handle_reveal(Pos::new(4, 4))?;
//! assert_ne!(session.outcome(), Outcome::Lost);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod logic;
pub mod persist;
pub mod session;

pub use config::Limits;
pub use data::{Board, MAX_SIDE, Square, SquareState};
pub use error::{BoundsError, ConfigError, GameError, LoadError, SaveError};
pub use logic::{FlagOutcome, RevealOutcome};
pub use persist::{SaveGame, read_savegame, write_savegame};
pub use session::GameSession;

pub use minesweeper_common::{
    models::{CellView, Difficulty, GameParams, Outcome, Pos},
    protocol::CellUpdate,
};
