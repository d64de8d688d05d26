//! Moves and the flat action index space
//!
//! Piece moves use an action space of `height * width * 6` (cell x direction),
//! tile lifts and placements use `height * width` (cell). The flat index of a
//! move is what the oracle's policy heads and the search statistics speak.

use serde::{Deserialize, Serialize};

use crate::board::{Cell, NUM_DIRECTIONS};
use crate::error::RulesError;
use crate::state::Phase;

/// A move for one phase of a turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    /// Phase 0: slide the piece on `cell` in direction `dir` (0-5)
    PieceMove { cell: Cell, dir: u8 },
    /// Phase 1: pick up the empty tile on `cell`
    TileLift { cell: Cell },
    /// Phase 2: put the lifted tile down on `cell`
    TilePlacement { cell: Cell },
}

impl Move {
    /// Phase in which this move is played
    pub fn phase(&self) -> Phase {
        match self {
            Move::PieceMove { .. } => Phase::MovePiece,
            Move::TileLift { .. } => Phase::LiftTile,
            Move::TilePlacement { .. } => Phase::PlaceTile,
        }
    }

    /// Cell the move starts from (or targets, for placements)
    pub fn cell(&self) -> Cell {
        match *self {
            Move::PieceMove { cell, .. } | Move::TileLift { cell } | Move::TilePlacement { cell } => {
                cell
            }
        }
    }

    /// Flat action index on a board of the given width
    pub fn index(&self, width: usize) -> usize {
        match *self {
            Move::PieceMove { cell, dir } => cell.index(width) * NUM_DIRECTIONS + dir as usize,
            Move::TileLift { cell } | Move::TilePlacement { cell } => cell.index(width),
        }
    }

    /// Decode a flat action index for the given phase
    pub fn from_index(
        phase: Phase,
        index: usize,
        height: usize,
        width: usize,
    ) -> Result<Move, RulesError> {
        let size = action_size(phase, height, width);
        if index >= size {
            return Err(RulesError::ActionOutOfRange { phase, index, size });
        }

        Ok(match phase {
            Phase::MovePiece => Move::PieceMove {
                cell: Cell::from_index(index / NUM_DIRECTIONS, width),
                dir: (index % NUM_DIRECTIONS) as u8,
            },
            Phase::LiftTile => Move::TileLift {
                cell: Cell::from_index(index, width),
            },
            Phase::PlaceTile => Move::TilePlacement {
                cell: Cell::from_index(index, width),
            },
        })
    }
}

/// Size of the flat action space for a phase
pub fn action_size(phase: Phase, height: usize, width: usize) -> usize {
    match phase {
        Phase::MovePiece => height * width * NUM_DIRECTIONS,
        Phase::LiftTile | Phase::PlaceTile => height * width,
    }
}
