use serde::{Deserialize, Serialize};

use crate::models::{CellView, Difficulty, Outcome, Pos};

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "action")]
pub enum ClientMessage {
    #[serde(rename = "reveal")]
    Reveal { pos: Pos },
    #[serde(rename = "flag")]
    Flag { pos: Pos },
    #[serde(rename = "restart")]
    Restart { difficulty: Difficulty },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellUpdate {
    pub pos: Pos,
    pub value: CellView,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "init")]
    Init {
        width: usize,
        height: usize,
        mines: usize,
        mines_remaining: isize,
        elapsed: u64,
        outcome: Outcome,
        field: Vec<Vec<CellView>>,
    },
    #[serde(rename = "update")]
    Update {
        updates: Vec<CellUpdate>,
        mines_remaining: isize,
        outcome: Outcome,
    },
    #[serde(rename = "tick")]
    Tick { elapsed: u64 },
    #[serde(rename = "error")]
    Error { message: String },
}
