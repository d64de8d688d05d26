//! NONAGA MCTS - Prior-guided Monte Carlo Tree Search
//!
//! This crate provides the search side of the engine:
//! - Statistics keyed by canonical state fingerprint (transpositions merge)
//! - PUCT selection over oracle priors
//! - Action probabilities from root visit counts
//! - Model-free oracles (uniform, random rollout)

pub mod oracle;
pub mod rollout;
pub mod search;
pub mod tree;

use std::sync::Arc;

use nonaga_core::{Board, Player};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub use oracle::{Oracle, OracleError, Prediction, RolloutOracle, UniformOracle};
pub use rollout::{random_playout, RolloutResult};
pub use search::{action_probabilities, simulate, SearchError};
pub use tree::{Edge, Node, SearchTree};

/// MCTS configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Simulations per move
    pub simulations: usize,
    /// Exploration constant for PUCT.
    /// Higher values encourage more exploration.
    pub c_puct: f64,
    /// Recursion cutoff (plies below the root)
    pub max_depth: usize,
    /// Keeps the exploration term alive at a freshly expanded node
    pub epsilon: f64,
    /// Seed for tie breaking at temperature 0
    pub seed: u64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            simulations: 40,
            c_puct: 1.0,
            max_depth: 60,
            epsilon: 1e-8,
            seed: 0,
        }
    }
}

impl MctsConfig {
    pub fn with_simulations(mut self, simulations: usize) -> Self {
        self.simulations = simulations;
        self
    }

    pub fn with_c_puct(mut self, c_puct: f64) -> Self {
        self.c_puct = c_puct;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// MCTS player: one search tree plus a shared oracle
pub struct MctsPlayer {
    config: MctsConfig,
    oracle: Arc<dyn Oracle>,
    tree: SearchTree,
    rng: ChaCha8Rng,
}

impl MctsPlayer {
    pub fn new(config: MctsConfig, oracle: Arc<dyn Oracle>) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            oracle,
            tree: SearchTree::new(),
            rng,
        }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }

    /// Search from `board` and return a distribution over its action space
    pub fn action_probabilities(
        &mut self,
        board: &Board,
        player: Player,
        temperature: f64,
    ) -> Result<Vec<f64>, SearchError> {
        action_probabilities(
            &mut self.tree,
            self.oracle.as_ref(),
            &self.config,
            board,
            player,
            temperature,
            &mut self.rng,
        )
    }

    /// Greedy move: the most visited root action
    pub fn best_action(&mut self, board: &Board, player: Player) -> Result<usize, SearchError> {
        let probs = self.action_probabilities(board, player, 0.0)?;
        probs
            .iter()
            .position(|&p| p > 0.0)
            .ok_or(SearchError::NoLegalMoves(board.phase()))
    }

    /// Discard all statistics (start of a new game)
    pub fn reset(&mut self) {
        self.tree.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = MctsConfig::default();
        assert_eq!(config.simulations, 40);
        assert_eq!(config.c_puct, 1.0);
        assert_eq!(config.max_depth, 60);
    }

    #[test]
    fn test_config_partial_json() {
        let config: MctsConfig = serde_json::from_str(r#"{"simulations": 10}"#).unwrap();
        assert_eq!(config, MctsConfig::default().with_simulations(10));
    }

    #[test]
    fn test_player_plays_legal_moves_and_resets() {
        let mut player = MctsPlayer::new(
            MctsConfig::default().with_simulations(20).with_seed(4),
            Arc::new(UniformOracle),
        );
        let board = Board::initial();

        let action = player.best_action(&board, Player::Red).unwrap();
        assert!(board.legal_mask(Player::Red)[action]);
        assert!(!player.tree().is_empty());
        assert_eq!(player.oracle_name(), "uniform");

        player.reset();
        assert!(player.tree().is_empty());
    }
}
