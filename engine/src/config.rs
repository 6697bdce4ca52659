use std::env;

use minesweeper_common::models::{Difficulty, GameParams};
use tracing::warn;

use crate::{data::MAX_SIDE, error::ConfigError};

/// Bounds a custom difficulty has to respect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub min_width: usize,
    pub max_width: usize,
    pub min_height: usize,
    pub max_height: usize,
    pub min_mines: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_width: 2,
            max_width: 30,
            min_height: 2,
            max_height: 24,
            min_mines: 1,
        }
    }
}

fn parse_side(name: &str, value: Option<String>, default: usize) -> usize {
    let Some(value) = value else {
        return default;
    };

    match value.parse::<usize>() {
        Ok(side) => side.clamp(1, MAX_SIDE),
        Err(_) => {
            warn!("Ignoring {}={:?}, using {}", name, value, default);
            default
        }
    }
}

impl Limits {
    /// Defaults, with the maximum custom size overridable through
    /// `MINESWEEPER_MAX_WIDTH` and `MINESWEEPER_MAX_HEIGHT`.
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Like [`Limits::from_env`], reading variables through `lookup`.
    ///
    /// Unparsable values fall back to the defaults. Overrides are clamped to
    /// [`MAX_SIDE`] and never drop below the minimum side.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let max_width = parse_side(
            "MINESWEEPER_MAX_WIDTH",
            lookup("MINESWEEPER_MAX_WIDTH"),
            defaults.max_width,
        );
        let max_height = parse_side(
            "MINESWEEPER_MAX_HEIGHT",
            lookup("MINESWEEPER_MAX_HEIGHT"),
            defaults.max_height,
        );

        Self {
            max_width: max_width.max(defaults.min_width),
            max_height: max_height.max(defaults.min_height),
            ..defaults
        }
    }

    /// Turns a difficulty into board parameters.
    ///
    /// Presets are accepted as they are. Custom settings are checked field by
    /// field (height, then width, then mines) and the first bad one is
    /// reported. At most `(width - 1) * (height - 1)` mines are allowed so a
    /// safe region always remains.
    pub fn resolve(&self, difficulty: &Difficulty) -> Result<GameParams, ConfigError> {
        let params = difficulty.params();
        if !difficulty.is_custom() {
            return Ok(params);
        }

        if params.height < self.min_height || params.height > self.max_height {
            return Err(ConfigError::Height {
                value: params.height,
                min: self.min_height,
                max: self.max_height,
            });
        }

        if params.width < self.min_width || params.width > self.max_width {
            return Err(ConfigError::Width {
                value: params.width,
                min: self.min_width,
                max: self.max_width,
            });
        }

        let max_mines = params.width.saturating_sub(1) * params.height.saturating_sub(1);
        if params.mines < self.min_mines || params.mines > max_mines {
            return Err(ConfigError::Mines {
                value: params.mines,
                min: self.min_mines,
                max: max_mines,
            });
        }

        Ok(params)
    }
}
