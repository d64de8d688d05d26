//! NONAGA Core - Game rules engine
//!
//! This crate provides the rules of Nonaga:
//! - Grid geometry (hex tiles embedded in a rectangular grid)
//! - Board state with tile, piece and marker layers
//! - The three-phase turn (move piece, lift tile, place tile)
//! - Move generation, move application and win detection
//! - Fingerprints used as search statistics keys

pub mod board;
pub mod error;
pub mod fingerprint;
pub mod moves;
pub mod rules;
pub mod setup;
pub mod state;

// Re-exports for convenient access
pub use board::{Cell, DIRECTIONS, MAX_DIMENSION, NUM_DIRECTIONS, STANDARD_HEIGHT, STANDARD_WIDTH};
pub use error::RulesError;
pub use fingerprint::Fingerprint;
pub use moves::{action_size, Move};
pub use rules::WIN_PATTERNS;
pub use setup::Setup;
pub use state::{Board, Outcome, Phase, Player, NUM_PLANES, PIECES_PER_PLAYER};
