use std::collections::HashSet;

use minesweeper_common::{
    models::{CellView, GameParams, Pos},
    protocol::CellUpdate,
};
use rand::Rng;
use tracing::debug;

use crate::{
    data::{Board, MAX_SIDE, Square, SquareState},
    error::{BoundsError, ConfigError, GameError},
};

/// Result of a reveal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Every square opened by the request, with the count it shows.
    Revealed(Vec<CellUpdate>),
    /// The square at `pos` held a mine. `mines` lists every mine, all of
    /// which are now revealed.
    MineHit { pos: Pos, mines: Vec<CellUpdate> },
    /// The square was flagged or already open; nothing changed.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagOutcome {
    pub pos: Pos,
    pub flagged: bool,
    /// Mines minus flags. Negative when the player over-flags.
    pub mines_remaining: isize,
}

const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

impl Board {
    /// An empty board: every square hidden, no mines yet.
    ///
    /// Mines are placed by the first reveal so that it can never hit one.
    pub fn new(width: usize, height: usize, mines: usize) -> Result<Self, ConfigError> {
        if height == 0 || height > MAX_SIDE {
            return Err(ConfigError::Height {
                value: height,
                min: 1,
                max: MAX_SIDE,
            });
        }

        if width == 0 || width > MAX_SIDE {
            return Err(ConfigError::Width {
                value: width,
                min: 1,
                max: MAX_SIDE,
            });
        }

        let area = width * height;
        if mines >= area {
            return Err(ConfigError::Mines {
                value: mines,
                min: 0,
                max: area - 1,
            });
        }

        Ok(Self {
            width,
            height,
            mines,
            squares: vec![Square::default(); area],
            first_click_done: false,
            revealed: 0,
            flagged: 0,
        })
    }

    pub fn from_params(params: &GameParams) -> Result<Self, ConfigError> {
        Self::new(params.width, params.height, params.mines)
    }

    /// A board with mines at exactly the given positions, already past its
    /// first click. Duplicate positions count once.
    pub fn with_mines(width: usize, height: usize, positions: &[Pos]) -> Result<Self, GameError> {
        let unique: HashSet<Pos> = positions.iter().copied().collect();
        let mut board = Self::new(width, height, unique.len())?;
        for pos in unique {
            let index = board.index_of(pos)?;
            board.squares[index].set_mine();
        }
        board.first_click_done = true;
        Ok(board)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn mine_count(&self) -> usize {
        self.mines
    }

    pub fn params(&self) -> GameParams {
        GameParams::new(self.width, self.height, self.mines)
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged
    }

    pub fn first_click_done(&self) -> bool {
        self.first_click_done
    }

    pub fn safe_squares(&self) -> usize {
        self.squares.len() - self.mines
    }

    /// All safe squares are open.
    pub fn is_cleared(&self) -> bool {
        self.revealed == self.safe_squares()
    }

    pub fn mines_remaining(&self) -> isize {
        self.mines as isize - self.flagged as isize
    }

    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    fn index_of(&self, pos: Pos) -> Result<usize, BoundsError> {
        if self.in_bounds(pos) {
            Ok(pos.x + pos.y * self.width)
        } else {
            Err(BoundsError {
                pos,
                width: self.width,
                height: self.height,
            })
        }
    }

    fn pos_of(&self, index: usize) -> Pos {
        Pos::new(index % self.width, index / self.width)
    }

    pub fn square(&self, pos: Pos) -> Result<&Square, BoundsError> {
        let index = self.index_of(pos)?;
        Ok(&self.squares[index])
    }

    /// In-bounds 8-connected neighbors of `pos`.
    fn neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> + '_ {
        NEIGHBOR_OFFSETS.iter().filter_map(move |&(dx, dy)| {
            let x = pos.x.checked_add_signed(dx)?;
            let y = pos.y.checked_add_signed(dy)?;
            let neighbor = Pos::new(x, y);
            self.in_bounds(neighbor).then_some(neighbor)
        })
    }

    fn adjacent_mines(&self, pos: Pos) -> u8 {
        self.neighbors(pos)
            .filter(|n| self.squares[n.x + n.y * self.width].has_mine())
            .count() as u8
    }

    /// Mines among the squares around `pos`. Neighbors past the edge of the
    /// board are not counted.
    pub fn neighbor_mine_count(&self, pos: Pos) -> Result<u8, BoundsError> {
        self.index_of(pos)?;
        Ok(self.adjacent_mines(pos))
    }

    /// Lays out the mines, never on `safe`.
    ///
    /// Every other square is equally likely to receive a mine. Only the first
    /// call has an effect.
    pub fn place_mines_avoiding<R: Rng + ?Sized>(
        &mut self,
        safe: Pos,
        rng: &mut R,
    ) -> Result<(), BoundsError> {
        let safe_index = self.index_of(safe)?;
        if self.first_click_done {
            return Ok(());
        }

        let mut mines_left = self.mines;
        let mut cells_left = self.squares.len() - 1;
        for (index, square) in self.squares.iter_mut().enumerate() {
            if index == safe_index {
                continue;
            }

            if rng.random_ratio(mines_left as u32, cells_left as u32) {
                square.set_mine();
                mines_left -= 1;
            }
            cells_left -= 1;
        }

        self.first_click_done = true;
        debug!("Placed {} mines avoiding {}", self.mines, safe);
        Ok(())
    }

    pub fn reveal(&mut self, pos: Pos) -> Result<RevealOutcome, GameError> {
        self.reveal_with(pos, &mut rand::rng())
    }

    /// Opens the square at `pos`, placing the mines first if this is the
    /// first reveal on the board.
    pub fn reveal_with<R: Rng + ?Sized>(
        &mut self,
        pos: Pos,
        rng: &mut R,
    ) -> Result<RevealOutcome, GameError> {
        let index = self.index_of(pos)?;
        if self.squares[index].state() != SquareState::Hidden {
            debug!("Ignoring reveal on open or flagged square {}", pos);
            return Ok(RevealOutcome::Ignored);
        }

        self.place_mines_avoiding(pos, rng)?;

        if self.squares[index].has_mine() {
            self.squares[index].set_state(SquareState::Revealed);
            self.revealed += 1;
            let mines = self.reveal_mines(pos);
            return Ok(RevealOutcome::MineHit { pos, mines });
        }

        Ok(RevealOutcome::Revealed(self.flood_fill(pos)))
    }

    /// Opens `start` and every square reachable from it through squares
    /// with no adjacent mines.
    fn flood_fill(&mut self, start: Pos) -> Vec<CellUpdate> {
        let mut updates = Vec::new();
        let mut pending = vec![start];

        while let Some(pos) = pending.pop() {
            let index = pos.x + pos.y * self.width;
            if self.squares[index].state() != SquareState::Hidden {
                continue;
            }

            self.squares[index].set_state(SquareState::Revealed);
            self.revealed += 1;

            let adjacent = self.adjacent_mines(pos);
            updates.push(CellUpdate {
                pos,
                value: CellView::Revealed { adjacent },
            });

            if adjacent != 0 {
                continue;
            }

            pending.extend(
                self.neighbors(pos)
                    .filter(|n| self.squares[n.x + n.y * self.width].state() == SquareState::Hidden),
            );
        }

        debug!("Flood fill from {} opened {} squares", start, updates.len());
        updates
    }

    /// Opens every mine for the end-of-game display. Flags on mines are
    /// dropped so the counters stay in step with the grid.
    fn reveal_mines(&mut self, hit: Pos) -> Vec<CellUpdate> {
        let mut updates = vec![CellUpdate {
            pos: hit,
            value: CellView::Mine,
        }];

        for index in 0..self.squares.len() {
            let square = &mut self.squares[index];
            if !square.has_mine() || square.is_revealed() {
                continue;
            }

            if square.is_flagged() {
                self.flagged -= 1;
            }
            square.set_state(SquareState::Revealed);
            self.revealed += 1;
            updates.push(CellUpdate {
                pos: self.pos_of(index),
                value: CellView::Mine,
            });
        }

        updates
    }

    /// Flags a hidden square or removes the flag from a flagged one.
    pub fn toggle_flag(&mut self, pos: Pos) -> Result<FlagOutcome, GameError> {
        let index = self.index_of(pos)?;
        let square = &mut self.squares[index];

        let flagged = match square.state() {
            SquareState::Revealed => return Err(GameError::AlreadyRevealed(pos)),
            SquareState::Hidden => {
                square.set_state(SquareState::Flagged);
                self.flagged += 1;
                true
            }
            SquareState::Flagged => {
                square.set_state(SquareState::Hidden);
                self.flagged -= 1;
                false
            }
        };

        Ok(FlagOutcome {
            pos,
            flagged,
            mines_remaining: self.mines_remaining(),
        })
    }

    fn view_of(&self, pos: Pos, square: &Square) -> CellView {
        match square.state() {
            SquareState::Hidden => CellView::Hidden,
            SquareState::Flagged => CellView::Flagged,
            SquareState::Revealed if square.has_mine() => CellView::Mine,
            SquareState::Revealed => CellView::Revealed {
                adjacent: self.adjacent_mines(pos),
            },
        }
    }

    pub fn cell_view(&self, pos: Pos) -> Result<CellView, BoundsError> {
        let square = self.square(pos)?;
        Ok(self.view_of(pos, square))
    }

    /// The whole board as a player sees it, one `Vec` per row.
    pub fn view(&self) -> Vec<Vec<CellView>> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| {
                        let pos = Pos::new(x, y);
                        self.view_of(pos, &self.squares[x + y * self.width])
                    })
                    .collect()
            })
            .collect()
    }
}
