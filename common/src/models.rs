use std::fmt;

use serde::{Deserialize, Serialize};

/// What a player is allowed to see of a single square.
///
/// A flagged square never reveals whether it holds a mine.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "state")]
pub enum CellView {
    #[serde(rename = "hidden")]
    Hidden,
    #[serde(rename = "flagged")]
    Flagged,
    #[serde(rename = "revealed")]
    Revealed { adjacent: u8 },
    #[serde(rename = "mine")]
    Mine,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct GameParams {
    pub width: usize,
    pub height: usize,
    pub mines: usize,
}

impl GameParams {
    pub const fn new(width: usize, height: usize, mines: usize) -> Self {
        Self {
            width,
            height,
            mines,
        }
    }

    pub const fn area(&self) -> usize {
        self.width * self.height
    }
}

impl Default for GameParams {
    fn default() -> Self {
        Difficulty::Beginner.params()
    }
}

/// Difficulty chosen when starting a game.
///
/// Presets carry fixed dimensions; `Custom` still has to pass validation
/// before a board is built from it.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "level")]
pub enum Difficulty {
    #[serde(rename = "beginner")]
    Beginner,
    #[serde(rename = "intermediate")]
    Intermediate,
    #[serde(rename = "expert")]
    Expert,
    #[serde(rename = "custom")]
    Custom {
        width: usize,
        height: usize,
        mines: usize,
    },
}

impl Difficulty {
    /// Board parameters as requested, without any validation.
    pub const fn params(&self) -> GameParams {
        match *self {
            Difficulty::Beginner => GameParams::new(9, 9, 10),
            Difficulty::Intermediate => GameParams::new(16, 16, 40),
            Difficulty::Expert => GameParams::new(30, 16, 99),
            Difficulty::Custom {
                width,
                height,
                mines,
            } => GameParams::new(width, height, mines),
        }
    }

    pub const fn is_custom(&self) -> bool {
        matches!(self, Difficulty::Custom { .. })
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Expert => "Expert",
            Difficulty::Custom { .. } => "Custom",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.params();
        write!(
            f,
            "{} ({}x{}, {} mines)",
            self.name(),
            params.width,
            params.height,
            params.mines
        )
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    #[serde(rename = "in_progress")]
    InProgress,
    #[serde(rename = "won")]
    Won,
    #[serde(rename = "lost")]
    Lost,
}

impl Outcome {
    pub const fn is_over(&self) -> bool {
        !matches!(self, Outcome::InProgress)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::InProgress => "in progress",
            Outcome::Won => "won",
            Outcome::Lost => "lost",
        })
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateResponse {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_match_classic_sizes() {
        assert_eq!(Difficulty::Beginner.params(), GameParams::new(9, 9, 10));
        assert_eq!(Difficulty::Intermediate.params(), GameParams::new(16, 16, 40));
        assert_eq!(Difficulty::Expert.params(), GameParams::new(30, 16, 99));
        assert_eq!(GameParams::default(), Difficulty::Beginner.params());
    }

    #[test]
    fn difficulty_uses_level_tag() {
        let json = serde_json::to_string(&Difficulty::Expert).unwrap();
        assert_eq!(json, r#"{"level":"expert"}"#);

        let custom: Difficulty =
            serde_json::from_str(r#"{"level":"custom","width":12,"height":8,"mines":20}"#)
                .unwrap();
        assert_eq!(custom.params(), GameParams::new(12, 8, 20));
        assert!(custom.is_custom());
    }

    #[test]
    fn cell_view_hides_flagged_contents() {
        let json = serde_json::to_string(&CellView::Flagged).unwrap();
        assert_eq!(json, r#"{"state":"flagged"}"#);

        let json = serde_json::to_string(&CellView::Revealed { adjacent: 3 }).unwrap();
        assert_eq!(json, r#"{"state":"revealed","adjacent":3}"#);
    }

    #[test]
    fn outcome_reports_end_of_game() {
        assert!(!Outcome::InProgress.is_over());
        assert!(Outcome::Won.is_over());
        assert!(Outcome::Lost.is_over());
        assert_eq!(Outcome::default(), Outcome::InProgress);
    }
}
