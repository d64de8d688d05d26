//! Setup - initial layout definition

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::board::{Cell, STANDARD_HEIGHT, STANDARD_WIDTH};
use crate::error::RulesError;
use crate::state::Board;

/// Standard tile cluster (row, col): a 19-tile hexagon
pub(crate) const STANDARD_TILES: &[(usize, usize)] = &[
    (3, 5), (3, 7), (3, 9),
    (4, 4), (4, 6), (4, 8), (4, 10),
    (5, 3), (5, 5), (5, 7), (5, 9), (5, 11),
    (6, 4), (6, 6), (6, 8), (6, 10),
    (7, 5), (7, 7), (7, 9),
];

/// Red pieces on alternate corners of the hexagon
pub(crate) const STANDARD_RED: &[(usize, usize)] = &[(3, 5), (7, 5), (5, 11)];

/// Black pieces on the remaining corners
pub(crate) const STANDARD_BLACK: &[(usize, usize)] = &[(3, 9), (7, 9), (5, 3)];

/// A named starting layout
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setup {
    pub name: String,
    pub height: usize,
    pub width: usize,
    pub tiles: Vec<Cell>,
    pub red: Vec<Cell>,
    pub black: Vec<Cell>,
}

impl Setup {
    /// The standard opening position
    pub fn standard() -> Self {
        let cells = |list: &[(usize, usize)]| -> Vec<Cell> {
            list.iter().map(|&(r, c)| Cell::new(r, c)).collect()
        };
        Self {
            name: "standard".to_string(),
            height: STANDARD_HEIGHT,
            width: STANDARD_WIDTH,
            tiles: cells(STANDARD_TILES),
            red: cells(STANDARD_RED),
            black: cells(STANDARD_BLACK),
        }
    }

    /// Convert to a phase-0 board, validating the layout
    pub fn to_board(&self) -> Result<Board, RulesError> {
        Board::from_cells(self.height, self.width, &self.tiles, &self.red, &self.black)
    }

    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading setup {}", path.display()))?;
        let setup: Setup = serde_json::from_str(&content)
            .with_context(|| format!("parsing setup {}", path.display()))?;

        // Reject layouts that would not produce a valid board
        setup.to_board()?;
        Ok(setup)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for Setup {
    fn default() -> Self {
        Self::standard()
    }
}
