//! Types shared between the minesweeper engine and anything that drives it.
//!
//! `models` holds what a UI can see of a game; `protocol` holds the messages
//! exchanged with a remote session host.

pub mod models;
pub mod protocol;
