//! Policy/value oracles
//!
//! The oracle maps a canonical board (the player to move owns the `+1`
//! pieces) to a prior over the current phase's action space and a value
//! estimate for the player to move. A trained network would sit behind this
//! trait; the implementations here need no model.

use nonaga_core::{Board, Player};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::rollout::random_playout;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Result of evaluating a board.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// One entry per action of the board's phase; the search masks and
    /// renormalizes, so it need not sum to 1.
    pub priors: Vec<f32>,

    /// Value estimate for the player to move, in [-1, 1].
    pub value: f32,
}

/// Trait for policy/value oracles.
///
/// Implementations must be deterministic for a given board: the search
/// evaluates every state exactly once and trusts the answer.
pub trait Oracle: Send + Sync {
    /// Evaluate a canonical board.
    fn predict(&self, board: &Board) -> Result<Prediction, OracleError>;

    /// Short label for logs and reports
    fn name(&self) -> &str {
        "oracle"
    }
}

fn uniform_priors(board: &Board) -> Vec<f32> {
    let size = board.action_size();
    vec![1.0 / size as f32; size]
}

// ============================================================================
// UNIFORM
// ============================================================================

/// Equal prior on every action, neutral value.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformOracle;

impl Oracle for UniformOracle {
    fn predict(&self, board: &Board) -> Result<Prediction, OracleError> {
        Ok(Prediction {
            priors: uniform_priors(board),
            value: 0.0,
        })
    }

    fn name(&self) -> &str {
        "uniform"
    }
}

// ============================================================================
// ROLLOUT
// ============================================================================

/// Uniform priors, value from one random playout.
#[derive(Debug, Clone)]
pub struct RolloutOracle {
    /// Playouts longer than this count as a draw
    pub max_plies: usize,
    /// Mixed with the board fingerprint to seed each playout
    pub seed: u64,
}

impl Default for RolloutOracle {
    fn default() -> Self {
        Self { max_plies: 200, seed: 0 }
    }
}

impl RolloutOracle {
    pub fn new(max_plies: usize, seed: u64) -> Self {
        Self { max_plies, seed }
    }
}

impl Oracle for RolloutOracle {
    fn predict(&self, board: &Board) -> Result<Prediction, OracleError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed ^ board.fingerprint().digest());
        let result = random_playout(board, Player::Red, self.max_plies, &mut rng)
            .map_err(|e| OracleError::InvalidState(e.to_string()))?;

        Ok(Prediction {
            priors: uniform_priors(board),
            value: result.value() as f32,
        })
    }

    fn name(&self) -> &str {
        "rollout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_oracle_covers_phase_action_space() {
        let board = Board::initial();
        let prediction = UniformOracle.predict(&board).unwrap();

        assert_eq!(prediction.priors.len(), 1080);
        assert_eq!(prediction.value, 0.0);
        let sum: f32 = prediction.priors.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_rollout_oracle_is_deterministic() {
        let oracle = RolloutOracle::new(120, 9);
        let board = Board::initial();

        let a = oracle.predict(&board).unwrap();
        let b = oracle.predict(&board).unwrap();
        assert_eq!(a, b);
        assert!((-1.0..=1.0).contains(&a.value));
    }

    #[test]
    fn test_oracles_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<UniformOracle>();
        assert_send_sync::<RolloutOracle>();
    }
}
