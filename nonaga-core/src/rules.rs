//! Rules engine: legal moves, move application and win detection
//!
//! ## Turn structure
//! 1. MovePiece - slide one of your pieces as far as it goes
//! 2. LiftTile - pick up an empty tile from the rim of the cluster
//! 3. PlaceTile - put it down touching at least two other tiles
//!
//! The player to move only changes once the placement completes.

use crate::board::{Cell, NUM_DIRECTIONS};
use crate::error::RulesError;
use crate::moves::{action_size, Move};
use crate::state::{Board, Outcome, Phase, Player};

// ============================================================================
// CONSTANTS
// ============================================================================

/// A tile with more tiled hex neighbors than this is locked in place
const MAX_LIFT_NEIGHBORS: usize = 4;

/// A placed tile must touch at least this many other tiles
const MIN_PLACE_NEIGHBORS: usize = 2;

/// Winning formations: three mutually connected hex cells, as (d_row, d_col)
/// offsets from the formation's row-major first cell.
///
/// The set is every connected triple of hex cells (lines, triangles and bent
/// shapes), which gives 11 anchored shapes.
pub const WIN_PATTERNS: [[(i32, i32); 3]; 11] = [
    // Straight lines
    [(0, 0), (0, 2), (0, 4)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 0), (1, -1), (2, -2)],
    // Triangles
    [(0, 0), (0, 2), (1, 1)],
    [(0, 0), (1, -1), (1, 1)],
    // Bent
    [(0, 0), (0, 2), (1, -1)],
    [(0, 0), (0, 2), (1, 3)],
    [(0, 0), (1, 1), (2, 0)],
    [(0, 0), (1, -1), (1, -3)],
    [(0, 0), (1, 1), (1, 3)],
    [(0, 0), (1, -1), (2, 0)],
];

impl Board {
    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// Size of the action space for the current phase
    pub fn action_size(&self) -> usize {
        action_size(self.phase(), self.height(), self.width())
    }

    /// All legal moves for `player` in the current phase, in flat-index order
    pub fn legal_moves(&self, player: Player) -> Vec<Move> {
        match self.phase() {
            Phase::MovePiece => self
                .pieces_of(player)
                .flat_map(|cell| (0..NUM_DIRECTIONS as u8).map(move |dir| Move::PieceMove { cell, dir }))
                .filter(|&mv| self.is_legal(player, mv))
                .collect(),
            Phase::LiftTile => self
                .tiles()
                .filter(|&cell| self.can_lift(cell))
                .map(|cell| Move::TileLift { cell })
                .collect(),
            Phase::PlaceTile => self
                .cells()
                .filter(|&cell| self.can_place(cell))
                .map(|cell| Move::TilePlacement { cell })
                .collect(),
        }
    }

    /// Legality mask over the current phase's action space
    pub fn legal_mask(&self, player: Player) -> Vec<bool> {
        let mut mask = vec![false; self.action_size()];
        for mv in self.legal_moves(player) {
            mask[mv.index(self.width())] = true;
        }
        mask
    }

    /// Is `mv` legal for `player` right now?
    pub fn is_legal(&self, player: Player, mv: Move) -> bool {
        if mv.phase() != self.phase() || !mv.cell().in_bounds(self.height(), self.width()) {
            return false;
        }

        match mv {
            Move::PieceMove { cell, dir } => self.can_move_piece(player, cell, dir),
            Move::TileLift { cell } => self.can_lift(cell),
            Move::TilePlacement { cell } => self.can_place(cell),
        }
    }

    fn can_move_piece(&self, player: Player, cell: Cell, dir: u8) -> bool {
        if dir as usize >= NUM_DIRECTIONS || self.piece(cell) != player.sign() {
            return false;
        }
        // Only the first step has to be free; the slide resolves the rest
        match cell.neighbor(dir, self.height(), self.width()) {
            Some(next) => self.is_free(next),
            None => false,
        }
    }

    fn can_lift(&self, cell: Cell) -> bool {
        self.has_tile(cell)
            && self.piece(cell) == 0
            && self.last_moved() != Some(cell)
            && self.tiled_neighbors(cell, None) <= MAX_LIFT_NEIGHBORS
    }

    fn can_place(&self, cell: Cell) -> bool {
        let Some(lifted) = self.selected() else {
            return false;
        };

        if self.has_tile(cell) {
            return false;
        }

        // Tiles only ever touch along hex edges
        if cell
            .orthogonal_neighbors(self.height(), self.width())
            .any(|n| self.has_tile(n))
        {
            return false;
        }

        self.tiled_neighbors(cell, Some(lifted)) >= MIN_PLACE_NEIGHBORS
    }

    /// A tiled cell without a piece
    fn is_free(&self, cell: Cell) -> bool {
        self.has_tile(cell) && self.piece(cell) == 0
    }

    /// Count tiled hex neighbors, ignoring `exclude`
    fn tiled_neighbors(&self, cell: Cell, exclude: Option<Cell>) -> usize {
        cell.hex_neighbors(self.height(), self.width())
            .filter(|&n| Some(n) != exclude && self.has_tile(n))
            .count()
    }

    /// Where a piece starting on `from` ends up when pushed in `dir`:
    /// it keeps sliding while the next cell is a free tile.
    pub fn slide_target(&self, from: Cell, dir: u8) -> Result<Cell, RulesError> {
        if dir as usize >= NUM_DIRECTIONS {
            return Err(RulesError::InvalidDirection(dir));
        }
        if !from.in_bounds(self.height(), self.width()) {
            return Err(RulesError::OutOfBounds {
                cell: from,
                height: self.height(),
                width: self.width(),
            });
        }

        let mut current = from;
        while let Some(next) = current.neighbor(dir, self.height(), self.width()) {
            if !self.is_free(next) {
                break;
            }
            current = next;
        }
        Ok(current)
    }

    // ========================================================================
    // APPLY MOVE
    // ========================================================================

    /// Apply a move, returning the new board and the player to act next
    pub fn apply(&self, player: Player, mv: Move) -> Result<(Board, Player), RulesError> {
        if !self.is_legal(player, mv) {
            return Err(RulesError::IllegalMove { mv, phase: self.phase() });
        }

        let mut next = self.derive();
        let next_player = match mv {
            Move::PieceMove { cell, dir } => {
                let target = self.slide_target(cell, dir)?;
                next.set_piece(cell, 0);
                next.set_piece(target, player.sign());
                next.set_phase(Phase::LiftTile);
                player
            }

            Move::TileLift { cell } => {
                next.set_selected(Some(cell));
                next.set_phase(Phase::PlaceTile);
                player
            }

            Move::TilePlacement { cell } => {
                let lifted = self
                    .selected()
                    .ok_or_else(|| RulesError::InvalidBoard("placing without a lifted tile".to_string()))?;
                next.set_tile(lifted, false);
                next.set_tile(cell, true);
                next.set_selected(None);
                next.set_last_moved(Some(cell));
                next.set_phase(Phase::MovePiece);
                player.opponent()
            }
        };

        debug_assert!(next.validate().is_ok(), "move {:?} broke the board", mv);
        Ok((next, next_player))
    }

    /// Decode a flat action index for the current phase and apply it
    pub fn apply_action(&self, player: Player, index: usize) -> Result<(Board, Player), RulesError> {
        let mv = Move::from_index(self.phase(), index, self.height(), self.width())?;
        self.apply(player, mv)
    }

    // ========================================================================
    // GAME END
    // ========================================================================

    /// Outcome from `player`'s point of view.
    ///
    /// A formation for `player` wins, then a formation for the opponent loses;
    /// otherwise a player with no legal move in the current phase loses.
    pub fn result(&self, player: Player) -> Outcome {
        if self.has_formation(player) {
            return Outcome::Win;
        }
        if self.has_formation(player.opponent()) {
            return Outcome::Loss;
        }
        if self.legal_moves(player).is_empty() {
            return Outcome::Loss;
        }
        Outcome::Ongoing
    }

    /// Do three of `player`'s pieces form a connected group?
    pub fn has_formation(&self, player: Player) -> bool {
        let sign = player.sign();
        self.cells().any(|anchor| {
            self.piece(anchor) == sign
                && WIN_PATTERNS.iter().any(|pattern| {
                    pattern.iter().all(|&(dr, dc)| {
                        anchor
                            .offset(dr, dc, self.height(), self.width())
                            .is_some_and(|cell| self.piece(cell) == sign)
                    })
                })
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
