//! Random playouts
//!
//! Used by [`RolloutOracle`](crate::oracle::RolloutOracle) to estimate the
//! value of a leaf without a trained model.

use nonaga_core::{Board, Move, Outcome, Player, RulesError};
use rand::prelude::*;

// ============================================================================
// ROLLOUT RESULT
// ============================================================================

/// Result of a playout
#[derive(Clone, Debug, PartialEq)]
pub struct RolloutResult {
    /// Outcome from the starting player's point of view
    /// (`Ongoing` if the ply cap was hit first)
    pub outcome: Outcome,
    /// Number of plies played
    pub plies: usize,
}

impl RolloutResult {
    /// Value in [-1, 1] for the starting player
    pub fn value(&self) -> f64 {
        self.outcome.value()
    }
}

// ============================================================================
// PLAYOUT
// ============================================================================

/// Play uniformly random legal moves until the game ends or `max_plies` is reached
pub fn random_playout<R: Rng>(
    board: &Board,
    player: Player,
    max_plies: usize,
    rng: &mut R,
) -> Result<RolloutResult, RulesError> {
    let mut current = board.clone();
    let mut to_move = player;
    let mut plies = 0;

    loop {
        let outcome = current.result(to_move);
        if outcome.is_over() {
            let outcome = if to_move == player { outcome } else { outcome.flip() };
            return Ok(RolloutResult { outcome, plies });
        }
        if plies >= max_plies {
            return Ok(RolloutResult { outcome: Outcome::Ongoing, plies });
        }

        // Not over, so there is at least one move
        let legal_moves = current.legal_moves(to_move);
        let mv = select_random_move(&legal_moves, rng);
        (current, to_move) = current.apply(to_move, mv)?;
        plies += 1;
    }
}

/// Select a random move uniformly from the list
fn select_random_move<R: Rng>(moves: &[Move], rng: &mut R) -> Move {
    let idx = rng.gen_range(0..moves.len());
    moves[idx]
}

#[cfg(test)]
mod tests {
    use super::*;
    use nonaga_core::{Cell, Setup};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_playout_respects_ply_cap() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let result = random_playout(&Board::initial(), Player::Red, 10, &mut rng).unwrap();
        assert!(result.plies <= 10);
    }

    #[test]
    fn test_playout_is_reproducible() {
        let board = Board::initial();
        let a = random_playout(&board, Player::Red, 200, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let b = random_playout(&board, Player::Red, 200, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_finished_board_needs_no_plies() {
        let tiles = Setup::standard().tiles;
        let red = [Cell::new(4, 6), Cell::new(5, 5), Cell::new(5, 7)];
        let black = [Cell::new(3, 9), Cell::new(7, 9), Cell::new(5, 3)];
        let board = Board::from_cells(12, 15, &tiles, &red, &black).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let as_red = random_playout(&board, Player::Red, 50, &mut rng).unwrap();
        let as_black = random_playout(&board, Player::Black, 50, &mut rng).unwrap();

        assert_eq!(as_red, RolloutResult { outcome: Outcome::Win, plies: 0 });
        assert_eq!(as_black.outcome, Outcome::Loss);
        assert_eq!(as_black.value(), -1.0);
    }
}
