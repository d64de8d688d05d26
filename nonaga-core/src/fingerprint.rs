//! State fingerprints: the hash key for search statistics
//!
//! A fingerprint packs everything that matters strategically (dimensions,
//! phase, markers, tile and piece layout) into a short byte string. Two boards
//! share a fingerprint iff they are cell-for-cell identical, regardless of
//! the move sequence that produced them.

use std::fmt;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::board::Cell;
use crate::state::Board;

/// Marker value for "no cell" in the header
const NO_CELL: u16 = u16::MAX;

/// Header bytes: height, width, phase, last moved (u16), selected (u16)
const HEADER_LEN: usize = 7;

/// Cell codes (2 bits each)
const CODE_EMPTY: u8 = 0;
const CODE_TILE: u8 = 1;
const CODE_OWN: u8 = 2;
const CODE_OPPONENT: u8 = 3;

/// Immutable, lossless key for a board
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(Box<[u8]>);

impl Fingerprint {
    /// Fingerprint of a board (normally called through [`Board::fingerprint`])
    pub fn of(board: &Board) -> Self {
        let (height, width) = (board.height(), board.width());
        let area = height * width;
        let mut bytes = Vec::with_capacity(HEADER_LEN + area.div_ceil(4));

        bytes.push(height as u8);
        bytes.push(width as u8);
        bytes.push(board.phase().value());
        bytes.extend_from_slice(&encode_cell(board.last_moved(), width).to_le_bytes());
        bytes.extend_from_slice(&encode_cell(board.selected(), width).to_le_bytes());

        let mut packed = 0u8;
        for (idx, cell) in board.cells().enumerate() {
            let code = match (board.has_tile(cell), board.piece(cell)) {
                (false, _) => CODE_EMPTY,
                (true, 0) => CODE_TILE,
                (true, p) if p > 0 => CODE_OWN,
                (true, _) => CODE_OPPONENT,
            };
            packed |= code << ((idx % 4) * 2);
            if idx % 4 == 3 {
                bytes.push(packed);
                packed = 0;
            }
        }
        if area % 4 != 0 {
            bytes.push(packed);
        }

        Self(bytes.into_boxed_slice())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// 64-bit digest, used to seed per-state randomness
    pub fn digest(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.0.hash(&mut hasher);
        hasher.finish()
    }
}

/// Valid boards are at most `MAX_DIMENSION` square, so every index fits
/// below `NO_CELL`
fn encode_cell(cell: Option<Cell>, width: usize) -> u16 {
    cell.map_or(NO_CELL, |c| c.index(width) as u16)
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Phase, Player};
    use rustc_hash::FxHashSet;

    fn layers(board: &Board) -> (Vec<u8>, Vec<i8>) {
        let tiles = board.cells().map(|c| board.has_tile(c) as u8).collect();
        let pieces = board.cells().map(|c| board.piece(c)).collect();
        (tiles, pieces)
    }

    #[test]
    fn test_identical_boards_share_fingerprint() {
        let a = Board::initial();
        let b = Board::initial();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().to_string(), b.fingerprint().to_string());
    }

    #[test]
    fn test_fingerprint_is_cached() {
        let board = Board::initial();
        let first = board.fingerprint() as *const Fingerprint;
        let second = board.fingerprint() as *const Fingerprint;
        assert_eq!(first, second);
    }

    #[test]
    fn test_perspective_changes_fingerprint() {
        let board = Board::initial();
        let red = board.canonical(Player::Red);
        let black = board.canonical(Player::Black);
        assert_ne!(red.fingerprint(), black.fingerprint());
    }

    #[test]
    fn test_single_cell_changes_fingerprint() {
        let base = Board::initial();
        let (tiles, pieces) = layers(&base);
        let mut seen = FxHashSet::default();
        seen.insert(base.fingerprint().clone());

        // Toggle each free cell's tile and check for a fresh key every time
        for cell in base.cells() {
            if base.piece(cell) != 0 {
                continue;
            }
            let mut t = tiles.clone();
            let idx = cell.index(base.width());
            t[idx] = 1 - t[idx];
            let board = Board::from_layers(12, 15, t, pieces.clone(), None, None, Phase::MovePiece).unwrap();
            assert!(seen.insert(board.fingerprint().clone()), "collision at {}", cell);
        }
    }

    #[test]
    fn test_markers_and_phase_change_fingerprint() {
        let base = Board::initial();
        let (tiles, pieces) = layers(&base);

        let lift = Board::from_layers(12, 15, tiles.clone(), pieces.clone(), None, None, Phase::LiftTile).unwrap();
        let marked = Board::from_layers(12, 15, tiles.clone(), pieces.clone(), Some(Cell::new(5, 7)), None, Phase::LiftTile).unwrap();
        let placing = Board::from_layers(12, 15, tiles, pieces, None, Some(Cell::new(5, 7)), Phase::PlaceTile).unwrap();

        let keys: FxHashSet<_> = [&base, &lift, &marked, &placing]
            .iter()
            .map(|b| b.fingerprint().clone())
            .collect();
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn test_last_cell_of_largest_board_is_not_no_cell() {
        use crate::board::MAX_DIMENSION;

        let side = MAX_DIMENSION;
        let corner = Cell::new(side - 1, side - 1);
        let mut tiles = vec![0u8; side * side];
        let mut pieces = vec![0i8; side * side];
        for c in 0..6 {
            let idx = Cell::new(0, c * 2).index(side);
            tiles[idx] = 1;
            pieces[idx] = if c < 3 { 1 } else { -1 };
        }
        tiles[corner.index(side)] = 1;

        let plain =
            Board::from_layers(side, side, tiles.clone(), pieces.clone(), None, None, Phase::MovePiece).unwrap();
        let marked = Board::from_layers(side, side, tiles, pieces, Some(corner), None, Phase::MovePiece).unwrap();
        assert_ne!(plain.fingerprint(), marked.fingerprint());
    }

    #[test]
    fn test_digest_is_stable() {
        let board = Board::initial();
        assert_eq!(board.fingerprint().digest(), Board::initial().fingerprint().digest());
    }
}
