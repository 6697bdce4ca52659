use serde::{Deserialize, Serialize};

/// Largest width or height a board may have.
pub const MAX_SIDE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SquareState {
    #[default]
    #[serde(rename = "hidden")]
    Hidden,
    #[serde(rename = "revealed")]
    Revealed,
    #[serde(rename = "flagged")]
    Flagged,
}

/// One cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Square {
    mine: bool,
    state: SquareState,
}

impl Square {
    pub fn set_mine(&mut self) {
        self.mine = true;
    }

    pub fn clear_mine(&mut self) {
        self.mine = false;
    }

    pub fn has_mine(&self) -> bool {
        self.mine
    }

    pub fn set_state(&mut self, state: SquareState) {
        self.state = state;
    }

    pub fn state(&self) -> SquareState {
        self.state
    }

    pub fn is_revealed(&self) -> bool {
        self.state == SquareState::Revealed
    }

    pub fn is_flagged(&self) -> bool {
        self.state == SquareState::Flagged
    }
}

/// The grid of squares plus the counters kept in step with it.
///
/// Squares are stored row-major, `x + y * width`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) mines: usize,
    pub(crate) squares: Vec<Square>,
    pub(crate) first_click_done: bool,
    pub(crate) revealed: usize,
    pub(crate) flagged: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_square_is_hidden_and_safe() {
        let square = Square::default();
        assert!(!square.has_mine());
        assert_eq!(square.state(), SquareState::Hidden);
    }

    #[test]
    fn mine_can_be_set_and_cleared() {
        let mut square = Square::default();
        square.set_mine();
        assert!(square.has_mine());
        square.clear_mine();
        assert!(!square.has_mine());
    }

    #[test]
    fn state_changes_are_local() {
        let mut square = Square::default();
        square.set_mine();
        square.set_state(SquareState::Flagged);
        assert!(square.is_flagged());
        assert!(square.has_mine());

        square.set_state(SquareState::Revealed);
        assert!(square.is_revealed());
        assert!(!square.is_flagged());
    }
}
