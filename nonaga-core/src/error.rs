//! Rules engine errors

use thiserror::Error;

use crate::board::Cell;
use crate::moves::Move;
use crate::state::Phase;

/// Errors raised by board construction and move application.
///
/// All of these indicate a caller bug (an index or move that did not come
/// from the engine's own enumeration, or a malformed board). Search and
/// orchestration code treat them as fatal for the current game.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("action index {index} out of range for {phase:?} (action space {size})")]
    ActionOutOfRange { phase: Phase, index: usize, size: usize },

    #[error("move {mv:?} is not legal in phase {phase:?}")]
    IllegalMove { mv: Move, phase: Phase },

    #[error("direction {0} is not one of the six slide directions")]
    InvalidDirection(u8),

    #[error("cell {cell} is outside the {height}x{width} board")]
    OutOfBounds { cell: Cell, height: usize, width: usize },

    #[error("invalid board: {0}")]
    InvalidBoard(String),
}
