use minesweeper_common::models::{CellView, Difficulty, GameParams, Outcome, Pos};
use rand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::Limits,
    data::Board,
    error::{BoundsError, ConfigError, GameError},
    logic::{FlagOutcome, RevealOutcome},
};

/// One playthrough: the board, how it ended, and the time spent on it.
///
/// Once the outcome is decided the board is frozen; further reveal and
/// flag requests fail with [`GameError::SessionEnded`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    pub(crate) board: Board,
    pub(crate) outcome: Outcome,
    pub(crate) elapsed_seconds: u64,
}

impl GameSession {
    #[instrument(level = "trace")]
    pub fn new(params: GameParams) -> Result<Self, ConfigError> {
        let board = Board::from_params(&params)?;
        info!(
            "Creating new game: {}x{} with {} mines",
            params.width, params.height, params.mines
        );
        Ok(Self::from_board(board))
    }

    pub fn from_difficulty(difficulty: &Difficulty, limits: &Limits) -> Result<Self, ConfigError> {
        Self::new(limits.resolve(difficulty)?)
    }

    /// Starts a session on a prepared board.
    pub fn from_board(board: Board) -> Self {
        Self {
            board,
            outcome: Outcome::InProgress,
            elapsed_seconds: 0,
        }
    }

    /// Throws the current board away and starts over. On error the current
    /// game is kept.
    pub fn new_game(&mut self, params: GameParams) -> Result<(), ConfigError> {
        *self = Self::new(params)?;
        Ok(())
    }

    fn ensure_in_progress(&self) -> Result<(), GameError> {
        if self.outcome.is_over() {
            return Err(GameError::SessionEnded(self.outcome));
        }
        Ok(())
    }

    pub fn handle_reveal(&mut self, pos: Pos) -> Result<RevealOutcome, GameError> {
        self.handle_reveal_with(pos, &mut rand::rng())
    }

    #[instrument(level = "trace", skip(self, rng), fields(x = pos.x, y = pos.y))]
    pub fn handle_reveal_with<R: Rng + ?Sized>(
        &mut self,
        pos: Pos,
        rng: &mut R,
    ) -> Result<RevealOutcome, GameError> {
        self.ensure_in_progress()?;

        let outcome = self.board.reveal_with(pos, rng)?;
        match &outcome {
            RevealOutcome::MineHit { mines, .. } => {
                self.outcome = Outcome::Lost;
                warn!("Mine hit at {} - game over, {} mines shown", pos, mines.len());
            }
            RevealOutcome::Revealed(updates) if self.board.is_cleared() => {
                self.outcome = Outcome::Won;
                info!(
                    "Game won after {}s, last reveal opened {} squares",
                    self.elapsed_seconds,
                    updates.len()
                );
            }
            RevealOutcome::Revealed(updates) => {
                debug!("Revealed {} squares, game continues", updates.len());
            }
            RevealOutcome::Ignored => {}
        }

        Ok(outcome)
    }

    #[instrument(level = "trace", skip(self), fields(x = pos.x, y = pos.y))]
    pub fn handle_flag(&mut self, pos: Pos) -> Result<FlagOutcome, GameError> {
        self.ensure_in_progress()?;

        let outcome = self.board.toggle_flag(pos)?;
        debug!(
            "Square {} {}, {} mines remaining",
            pos,
            if outcome.flagged { "flagged" } else { "unflagged" },
            outcome.mines_remaining
        );
        Ok(outcome)
    }

    /// Advances the clock by one second. The clock only runs between the
    /// first reveal and the end of the game; returns the new time when it
    /// moved.
    pub fn tick(&mut self) -> Option<u64> {
        if self.outcome.is_over() || !self.board.first_click_done() {
            return None;
        }
        self.elapsed_seconds += 1;
        Some(self.elapsed_seconds)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn params(&self) -> GameParams {
        self.board.params()
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn mines_remaining(&self) -> isize {
        self.board.mines_remaining()
    }

    pub fn cell_view(&self, pos: Pos) -> Result<CellView, BoundsError> {
        self.board.cell_view(pos)
    }

    pub fn view(&self) -> Vec<Vec<CellView>> {
        self.board.view()
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn new_session_is_in_progress() {
        let session = GameSession::new(GameParams::new(9, 9, 10)).unwrap();
        assert_eq!(session.outcome(), Outcome::InProgress);
        assert_eq!(session.elapsed_seconds(), 0);
        assert_eq!(session.mines_remaining(), 10);
    }

    #[test]
    fn from_difficulty_validates_custom() {
        let limits = Limits::default();
        let session = GameSession::from_difficulty(&Difficulty::Intermediate, &limits).unwrap();
        assert_eq!(session.params(), GameParams::new(16, 16, 40));

        let err = GameSession::from_difficulty(
            &Difficulty::Custom {
                width: 9,
                height: 9,
                mines: 80,
            },
            &limits,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Mines { value: 80, .. }));
    }

    #[test]
    fn mine_hit_loses() {
        let board = Board::with_mines(3, 3, &[Pos::new(0, 0)]).unwrap();
        let mut session = GameSession::from_board(board);
        let outcome = session.handle_reveal(Pos::new(0, 0)).unwrap();
        assert!(matches!(outcome, RevealOutcome::MineHit { .. }));
        assert_eq!(session.outcome(), Outcome::Lost);
    }

    #[test]
    fn clearing_every_safe_square_wins() {
        // Every square touches the center mine, so each reveal opens one.
        let board = Board::with_mines(3, 3, &[Pos::new(1, 1)]).unwrap();
        let mut session = GameSession::from_board(board);
        let safe: Vec<Pos> = (0..9)
            .map(|i| Pos::new(i % 3, i / 3))
            .filter(|p| *p != Pos::new(1, 1))
            .collect();

        for (opened, pos) in safe.iter().enumerate() {
            assert_eq!(session.outcome(), Outcome::InProgress);
            session.handle_reveal(*pos).unwrap();
            assert_eq!(session.board().revealed_count(), opened + 1);
        }
        assert_eq!(session.outcome(), Outcome::Won);
        assert_eq!(session.board().revealed_count(), 8);
    }

    #[test]
    fn ended_session_rejects_moves() {
        let board = Board::with_mines(3, 3, &[Pos::new(0, 0)]).unwrap();
        let mut session = GameSession::from_board(board);
        session.handle_reveal(Pos::new(0, 0)).unwrap();
        let frozen = session.clone();

        assert_eq!(
            session.handle_reveal(Pos::new(2, 2)),
            Err(GameError::SessionEnded(Outcome::Lost))
        );
        assert_eq!(
            session.handle_flag(Pos::new(2, 2)),
            Err(GameError::SessionEnded(Outcome::Lost))
        );
        assert_eq!(session, frozen);
    }

    #[test]
    fn clock_runs_only_during_play() {
        let mut session = GameSession::new(GameParams::new(9, 9, 10)).unwrap();
        assert_eq!(session.tick(), None);

        let mut rng = StdRng::seed_from_u64(3);
        session.handle_reveal_with(Pos::new(4, 4), &mut rng).unwrap();
        assert_eq!(session.tick(), Some(1));
        assert_eq!(session.tick(), Some(2));

        session.outcome = Outcome::Lost;
        assert_eq!(session.tick(), None);
        assert_eq!(session.elapsed_seconds(), 2);
    }

    #[test]
    fn new_game_replaces_board_and_resets_state() {
        let board = Board::with_mines(3, 3, &[Pos::new(0, 0)]).unwrap();
        let mut session = GameSession::from_board(board);
        session.handle_reveal(Pos::new(0, 0)).unwrap();

        session.new_game(GameParams::new(16, 16, 40)).unwrap();
        assert_eq!(session.outcome(), Outcome::InProgress);
        assert_eq!(session.params(), GameParams::new(16, 16, 40));
        assert!(!session.board().first_click_done());
        assert_eq!(session.elapsed_seconds(), 0);
    }

    #[test]
    fn failed_new_game_keeps_current_one() {
        let mut session = GameSession::new(GameParams::new(9, 9, 10)).unwrap();
        let before = session.clone();
        assert!(session.new_game(GameParams::new(0, 9, 10)).is_err());
        assert_eq!(session, before);
    }
}
