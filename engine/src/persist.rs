//! Savegames.
//!
//! A savegame is a full snapshot of a [`GameSession`]: dimensions, every
//! square and the outcome. It is stored as JSON in a `.mssg` file. Loading
//! checks the snapshot against the board invariants before anything is
//! replaced, so a corrupt or foreign file leaves the running game alone.

use std::{
    fs,
    path::{Path, PathBuf},
};

use minesweeper_common::models::Outcome;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    data::{Board, Square},
    error::{LoadError, SaveError},
    session::GameSession,
};

pub const SAVEGAME_EXTENSION: &str = "mssg";
pub const SAVEGAME_DESCRIPTION: &str = "Minesweeper Savegames (.mssg files)";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveGame {
    pub version: u32,
    pub width: usize,
    pub height: usize,
    pub mines: usize,
    pub first_click_done: bool,
    pub outcome: Outcome,
    #[serde(default)]
    pub elapsed_seconds: u64,
    /// Row-major.
    pub squares: Vec<Square>,
}

impl GameSession {
    pub fn save(&self) -> SaveGame {
        SaveGame {
            version: FORMAT_VERSION,
            width: self.board.width,
            height: self.board.height,
            mines: self.board.mines,
            first_click_done: self.board.first_click_done,
            outcome: self.outcome,
            elapsed_seconds: self.elapsed_seconds,
            squares: self.board.squares.clone(),
        }
    }

    /// Rebuilds a session from a snapshot, rejecting anything that could not
    /// have come from a real game.
    pub fn restore(save: SaveGame) -> Result<Self, LoadError> {
        if save.version != FORMAT_VERSION {
            return Err(LoadError::UnsupportedVersion(save.version));
        }

        let mut board =
            Board::new(save.width, save.height, save.mines).map_err(LoadError::InvalidDimensions)?;

        if save.squares.len() != board.squares.len() {
            return Err(LoadError::CellCountMismatch {
                expected: board.squares.len(),
                found: save.squares.len(),
            });
        }

        let mined = save.squares.iter().filter(|s| s.has_mine()).count();
        let revealed = save.squares.iter().filter(|s| s.is_revealed()).count();
        let flagged = save.squares.iter().filter(|s| s.is_flagged()).count();
        let revealed_mines = save
            .squares
            .iter()
            .filter(|s| s.has_mine() && s.is_revealed())
            .count();

        if save.first_click_done {
            if mined != save.mines {
                return Err(LoadError::MineCountMismatch {
                    expected: save.mines,
                    found: mined,
                });
            }
        } else {
            if mined != 0 {
                return Err(LoadError::MineCountMismatch {
                    expected: 0,
                    found: mined,
                });
            }
            if revealed != 0 {
                return Err(LoadError::Inconsistent(
                    "squares are open before the first click",
                ));
            }
        }

        let safe_open = revealed - revealed_mines;
        match save.outcome {
            Outcome::InProgress if revealed_mines > 0 => {
                return Err(LoadError::Inconsistent("a mine is open in a running game"));
            }
            Outcome::InProgress if save.first_click_done && safe_open == board.safe_squares() => {
                return Err(LoadError::Inconsistent(
                    "every safe square is open in a running game",
                ));
            }
            Outcome::Lost if revealed_mines == 0 => {
                return Err(LoadError::Inconsistent("a lost game has no open mine"));
            }
            Outcome::Won if revealed_mines > 0 || safe_open != board.safe_squares() => {
                return Err(LoadError::Inconsistent(
                    "a won game must have exactly the safe squares open",
                ));
            }
            _ => {}
        }

        board.squares = save.squares;
        board.first_click_done = save.first_click_done;
        board.revealed = revealed;
        board.flagged = flagged;

        Ok(Self {
            board,
            outcome: save.outcome,
            elapsed_seconds: save.elapsed_seconds,
        })
    }

    /// Replaces this session with the snapshot. On error the session is
    /// left as it was.
    pub fn load(&mut self, save: SaveGame) -> Result<(), LoadError> {
        *self = Self::restore(save)?;
        Ok(())
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<PathBuf, SaveError> {
        write_savegame(self, path)
    }

    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        *self = read_savegame(path)?;
        Ok(())
    }
}

pub fn encode(save: &SaveGame) -> Result<Vec<u8>, SaveError> {
    Ok(serde_json::to_vec_pretty(save)?)
}

pub fn decode(bytes: &[u8]) -> Result<SaveGame, LoadError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Whether `path` names a savegame, judged by its extension alone.
pub fn is_savegame(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case(SAVEGAME_EXTENSION))
}

/// `path` with `.mssg` appended, unless it already ends in it.
pub fn savegame_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if is_savegame(path) {
        return path.to_path_buf();
    }

    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(SAVEGAME_EXTENSION);
    PathBuf::from(name)
}

/// Writes the session to `path` (see [`savegame_path`]) and returns where
/// it ended up.
#[instrument(level = "trace", skip_all, fields(path = %path.as_ref().display()))]
pub fn write_savegame(session: &GameSession, path: impl AsRef<Path>) -> Result<PathBuf, SaveError> {
    let path = savegame_path(path);
    let bytes = encode(&session.save())?;
    fs::write(&path, bytes)?;
    info!("Saved game to {}", path.display());
    Ok(path)
}

#[instrument(level = "trace", skip_all, fields(path = %path.as_ref().display()))]
pub fn read_savegame(path: impl AsRef<Path>) -> Result<GameSession, LoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let session = decode(&bytes)
        .and_then(GameSession::restore)
        .inspect_err(|e| warn!("Rejected savegame {}: {}", path.display(), e))?;
    info!("Loaded game from {}", path.display());
    Ok(session)
}

#[cfg(test)]
mod tests {
    use minesweeper_common::models::{GameParams, Pos};
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::data::SquareState;

    fn played() -> GameSession {
        let mut session = GameSession::new(GameParams::new(9, 9, 10)).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        session.handle_reveal_with(Pos::new(4, 4), &mut rng).unwrap();
        session.tick();
        session
    }

    #[test]
    fn snapshot_round_trips() {
        let session = played();
        let restored = GameSession::restore(session.save()).unwrap();
        assert_eq!(restored, session);
    }

    #[test]
    fn snapshot_before_first_click_round_trips() {
        let session = GameSession::new(GameParams::new(16, 16, 40)).unwrap();
        let restored = GameSession::restore(session.save()).unwrap();
        assert_eq!(restored, session);
        assert!(!restored.board().first_click_done());
    }

    #[test]
    fn bytes_round_trip() {
        let session = played();
        let bytes = encode(&session.save()).unwrap();
        let restored = GameSession::restore(decode(&bytes).unwrap()).unwrap();
        assert_eq!(restored, session);
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(decode(b"not a savegame"), Err(LoadError::Malformed(_))));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut save = played().save();
        save.version = 7;
        assert!(matches!(
            GameSession::restore(save),
            Err(LoadError::UnsupportedVersion(7))
        ));
    }

    #[test]
    fn rejects_truncated_grid() {
        let mut save = played().save();
        save.squares.pop();
        assert!(matches!(
            GameSession::restore(save),
            Err(LoadError::CellCountMismatch {
                expected: 81,
                found: 80
            })
        ));
    }

    #[test]
    fn rejects_bad_dimensions() {
        let mut save = played().save();
        save.width = 0;
        assert!(matches!(
            GameSession::restore(save),
            Err(LoadError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn rejects_wrong_mine_count() {
        let mut save = played().save();
        let index = save.squares.iter().position(|s| s.has_mine()).unwrap();
        save.squares[index].clear_mine();
        assert!(matches!(
            GameSession::restore(save),
            Err(LoadError::MineCountMismatch {
                expected: 10,
                found: 9
            })
        ));
    }

    #[test]
    fn rejects_open_mine_in_running_game() {
        let mut save = played().save();
        let index = save.squares.iter().position(|s| s.has_mine()).unwrap();
        save.squares[index].set_state(SquareState::Revealed);
        assert!(matches!(
            GameSession::restore(save),
            Err(LoadError::Inconsistent(_))
        ));
    }

    #[test]
    fn failed_load_keeps_session() {
        let mut session = played();
        let before = session.clone();
        let mut save = session.save();
        save.mines = 11;
        assert!(session.load(save).is_err());
        assert_eq!(session, before);
    }

    #[test]
    fn recognises_savegame_extension() {
        assert!(is_savegame(Path::new("game.mssg")));
        assert!(is_savegame(Path::new("saves/Game.MSSG")));
        assert!(!is_savegame(Path::new("game.txt")));
        assert!(!is_savegame(Path::new(".mssg")));
        assert!(!is_savegame(Path::new("mssg")));
    }

    #[test]
    fn appends_extension_when_missing() {
        assert_eq!(savegame_path("game"), PathBuf::from("game.mssg"));
        assert_eq!(savegame_path("game.mssg"), PathBuf::from("game.mssg"));
        assert_eq!(savegame_path("game.v2"), PathBuf::from("game.v2.mssg"));
    }
}
