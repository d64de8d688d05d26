//! Board state: tiles, pieces, markers and turn phase
//!
//! A [`Board`] is an immutable value. Rules operations (see `rules.rs`) take a
//! board by reference and return a fresh one, so search branches never share
//! mutable state.

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::board::{Cell, MAX_DIMENSION, STANDARD_HEIGHT, STANDARD_WIDTH};
use crate::error::RulesError;
use crate::fingerprint::Fingerprint;
use crate::setup::{STANDARD_BLACK, STANDARD_RED, STANDARD_TILES};

/// Pieces per player
pub const PIECES_PER_PLAYER: usize = 3;

/// Number of planes produced by [`Board::to_planes`]
pub const NUM_PLANES: usize = 5;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player (sign +1 for Red, -1 for Black)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Red,
    Black,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Red => Player::Black,
            Player::Black => Player::Red,
        }
    }

    /// Piece-layer value of this player's pieces
    pub fn sign(self) -> i8 {
        match self {
            Player::Red => 1,
            Player::Black => -1,
        }
    }

    pub fn from_sign(sign: i8) -> Option<Self> {
        match sign {
            1 => Some(Player::Red),
            -1 => Some(Player::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Red => write!(f, "red"),
            Player::Black => write!(f, "black"),
        }
    }
}

/// Turn phase. A turn runs MovePiece -> LiftTile -> PlaceTile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    MovePiece = 0,
    LiftTile = 1,
    PlaceTile = 2,
}

impl Phase {
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Phase::MovePiece),
            1 => Some(Phase::LiftTile),
            2 => Some(Phase::PlaceTile),
            _ => None,
        }
    }

    /// Phase that follows this one
    pub fn next(self) -> Self {
        match self {
            Phase::MovePiece => Phase::LiftTile,
            Phase::LiftTile => Phase::PlaceTile,
            Phase::PlaceTile => Phase::MovePiece,
        }
    }
}

/// Game outcome from one player's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Ongoing,
    Win,
    Loss,
}

impl Outcome {
    /// Numeric value: +1 win, -1 loss, 0 ongoing
    pub fn value(self) -> f64 {
        match self {
            Outcome::Ongoing => 0.0,
            Outcome::Win => 1.0,
            Outcome::Loss => -1.0,
        }
    }

    /// Same outcome seen by the other player
    pub fn flip(self) -> Self {
        match self {
            Outcome::Ongoing => Outcome::Ongoing,
            Outcome::Win => Outcome::Loss,
            Outcome::Loss => Outcome::Win,
        }
    }

    pub fn is_over(self) -> bool {
        self != Outcome::Ongoing
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// Full board state (clone to derive)
#[derive(Clone, Debug)]
pub struct Board {
    height: usize,
    width: usize,

    /// 1 where a tile exists
    tiles: Vec<u8>,
    /// +1 Red piece, -1 Black piece, 0 empty
    pieces: Vec<i8>,

    /// Tile placed on the previous turn (cannot be lifted this turn)
    last_moved: Option<Cell>,
    /// Tile lifted in the current turn, set only during PlaceTile
    selected: Option<Cell>,

    phase: Phase,

    /// Lazily computed statistics key
    fingerprint: OnceLock<Fingerprint>,
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.height == other.height
            && self.width == other.width
            && self.tiles == other.tiles
            && self.pieces == other.pieces
            && self.last_moved == other.last_moved
            && self.selected == other.selected
            && self.phase == other.phase
    }
}

impl Eq for Board {}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// The standard opening position (19 tiles, Red to set the pace)
    pub fn initial() -> Self {
        let mut board = Self::empty(STANDARD_HEIGHT, STANDARD_WIDTH);
        for &(row, col) in STANDARD_TILES {
            board.tiles[row * STANDARD_WIDTH + col] = 1;
        }
        for &(row, col) in STANDARD_RED {
            board.pieces[row * STANDARD_WIDTH + col] = Player::Red.sign();
        }
        for &(row, col) in STANDARD_BLACK {
            board.pieces[row * STANDARD_WIDTH + col] = Player::Black.sign();
        }
        board
    }

    /// Build a phase-0 board from cell lists
    pub fn from_cells(
        height: usize,
        width: usize,
        tiles: &[Cell],
        red: &[Cell],
        black: &[Cell],
    ) -> Result<Self, RulesError> {
        let mut board = Self::empty(height, width);

        for &cell in tiles.iter().chain(red).chain(black) {
            if !cell.in_bounds(height, width) {
                return Err(RulesError::OutOfBounds { cell, height, width });
            }
        }

        for &cell in tiles {
            board.tiles[cell.index(width)] = 1;
        }
        for (cells, player) in [(red, Player::Red), (black, Player::Black)] {
            for &cell in cells {
                let idx = cell.index(width);
                if board.pieces[idx] != 0 {
                    return Err(RulesError::InvalidBoard(format!("two pieces on {}", cell)));
                }
                board.pieces[idx] = player.sign();
            }
        }

        board.validate()?;
        Ok(board)
    }

    /// Build a board from raw layers, checking every invariant
    pub fn from_layers(
        height: usize,
        width: usize,
        tiles: Vec<u8>,
        pieces: Vec<i8>,
        last_moved: Option<Cell>,
        selected: Option<Cell>,
        phase: Phase,
    ) -> Result<Self, RulesError> {
        let board = Self {
            height,
            width,
            tiles,
            pieces,
            last_moved,
            selected,
            phase,
            fingerprint: OnceLock::new(),
        };
        board.validate()?;
        Ok(board)
    }

    fn empty(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            tiles: vec![0; height * width],
            pieces: vec![0; height * width],
            last_moved: None,
            selected: None,
            phase: Phase::MovePiece,
            fingerprint: OnceLock::new(),
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_moved(&self) -> Option<Cell> {
        self.last_moved
    }

    pub fn selected(&self) -> Option<Cell> {
        self.selected
    }

    /// Does `cell` hold a tile? Out-of-bounds cells never do.
    pub fn has_tile(&self, cell: Cell) -> bool {
        cell.in_bounds(self.height, self.width) && self.tiles[cell.index(self.width)] == 1
    }

    /// Piece-layer value at `cell` (0 when empty or out of bounds)
    pub fn piece(&self, cell: Cell) -> i8 {
        if !cell.in_bounds(self.height, self.width) {
            return 0;
        }
        self.pieces[cell.index(self.width)]
    }

    /// Owner of the piece on `cell`
    pub fn owner(&self, cell: Cell) -> Option<Player> {
        Player::from_sign(self.piece(cell))
    }

    /// Iterate all grid cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let width = self.width;
        (0..self.height * width).map(move |idx| Cell::from_index(idx, width))
    }

    /// Iterate tiled cells in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells().filter(|&cell| self.has_tile(cell))
    }

    /// Iterate cells holding `player`'s pieces in row-major order
    pub fn pieces_of(&self, player: Player) -> impl Iterator<Item = Cell> + '_ {
        let sign = player.sign();
        self.cells().filter(move |&cell| self.piece(cell) == sign)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.iter().filter(|&&t| t == 1).count()
    }

    // ========================================================================
    // DERIVED VIEWS
    // ========================================================================

    /// Board seen from `player`: their pieces become +1
    pub fn canonical(&self, player: Player) -> Board {
        match player {
            Player::Red => self.clone(),
            Player::Black => {
                let mut flipped = Self {
                    fingerprint: OnceLock::new(),
                    ..self.clone()
                };
                for value in flipped.pieces.iter_mut() {
                    *value = -*value;
                }
                flipped
            }
        }
    }

    /// Statistics key, computed on first use and cached
    pub fn fingerprint(&self) -> &Fingerprint {
        self.fingerprint.get_or_init(|| Fingerprint::of(self))
    }

    /// Flat tensor of shape `[NUM_PLANES, height, width]`:
    /// tiles, pieces, last moved tile, selected tile, phase (replicated)
    pub fn to_planes(&self) -> Vec<f32> {
        let area = self.height * self.width;
        let mut planes = vec![0.0f32; NUM_PLANES * area];

        for idx in 0..area {
            planes[idx] = self.tiles[idx] as f32;
            planes[area + idx] = self.pieces[idx] as f32;
            planes[4 * area + idx] = self.phase.value() as f32;
        }
        if let Some(cell) = self.last_moved {
            planes[2 * area + cell.index(self.width)] = 1.0;
        }
        if let Some(cell) = self.selected {
            planes[3 * area + cell.index(self.width)] = 1.0;
        }

        planes
    }

    // ========================================================================
    // INVARIANTS
    // ========================================================================

    /// Check every structural invariant of a board
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.height > MAX_DIMENSION || self.width > MAX_DIMENSION {
            return Err(RulesError::InvalidBoard(format!(
                "{}x{} exceeds the {}x{} limit",
                self.height, self.width, MAX_DIMENSION, MAX_DIMENSION
            )));
        }

        let area = self.height * self.width;
        if self.tiles.len() != area || self.pieces.len() != area {
            return Err(RulesError::InvalidBoard(format!(
                "layer sizes {}/{} do not match {}x{}",
                self.tiles.len(),
                self.pieces.len(),
                self.height,
                self.width
            )));
        }

        if let Some(idx) = self.tiles.iter().position(|&t| t > 1) {
            return Err(RulesError::InvalidBoard(format!("tile layer value {} at index {}", self.tiles[idx], idx)));
        }

        for cell in self.cells() {
            let value = self.piece(cell);
            if value != 0 && Player::from_sign(value).is_none() {
                return Err(RulesError::InvalidBoard(format!("piece value {} on {}", value, cell)));
            }
            if value != 0 && !self.has_tile(cell) {
                return Err(RulesError::InvalidBoard(format!("piece on {} has no tile", cell)));
            }
        }

        for player in [Player::Red, Player::Black] {
            let count = self.pieces_of(player).count();
            if count != PIECES_PER_PLAYER {
                return Err(RulesError::InvalidBoard(format!("{} has {} pieces", player, count)));
            }
        }

        if let Some(cell) = self.last_moved {
            self.check_marker(cell, "last moved")?;
        }

        match (self.phase, self.selected) {
            (Phase::PlaceTile, Some(cell)) => self.check_marker(cell, "selected")?,
            (Phase::PlaceTile, None) => {
                return Err(RulesError::InvalidBoard("no selected tile while placing".to_string()));
            }
            (_, Some(cell)) => {
                return Err(RulesError::InvalidBoard(format!(
                    "selected tile {} outside the placement phase",
                    cell
                )));
            }
            (_, None) => {}
        }

        Ok(())
    }

    fn check_marker(&self, cell: Cell, what: &str) -> Result<(), RulesError> {
        if !cell.in_bounds(self.height, self.width) {
            return Err(RulesError::OutOfBounds { cell, height: self.height, width: self.width });
        }
        if !self.has_tile(cell) {
            return Err(RulesError::InvalidBoard(format!("{} marker {} has no tile", what, cell)));
        }
        Ok(())
    }

    // ========================================================================
    // MUTATION HELPERS (rules engine only, always on a fresh clone)
    // ========================================================================

    /// Clone without the cached fingerprint, ready to be modified
    pub(crate) fn derive(&self) -> Board {
        Self {
            fingerprint: OnceLock::new(),
            ..self.clone()
        }
    }

    pub(crate) fn set_piece(&mut self, cell: Cell, value: i8) {
        self.pieces[cell.index(self.width)] = value;
    }

    pub(crate) fn set_tile(&mut self, cell: Cell, present: bool) {
        self.tiles[cell.index(self.width)] = present as u8;
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn set_selected(&mut self, cell: Option<Cell>) {
        self.selected = cell;
    }

    pub(crate) fn set_last_moved(&mut self, cell: Option<Cell>) {
        self.last_moved = cell;
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

/// Text rendering: `O` tile, `r`/`b` pieces, `*` lifted tile, `+` last moved tile
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "    ")?;
        for col in 0..self.width {
            write!(f, "{:02} ", col)?;
        }
        writeln!(f)?;

        for row in 0..self.height {
            write!(f, "{:02} |", row)?;
            for col in 0..self.width {
                let cell = Cell::new(row, col);
                let symbol = match self.owner(cell) {
                    Some(Player::Red) => 'r',
                    Some(Player::Black) => 'b',
                    None if self.selected == Some(cell) => '*',
                    None if self.last_moved == Some(cell) => '+',
                    None if self.has_tile(cell) => 'O',
                    None => '.',
                };
                write!(f, "{}  ", symbol)?;
            }
            writeln!(f, "|")?;
        }

        write!(f, "phase: {:?}", self.phase)
    }
}

// ============================================================================
// TESTS
// ============================================================================
