//! Agents: anything that picks an action for a board
//!
//! Level 4 - Player abstraction

use nonaga_core::{Board, Player};
use nonaga_mcts::{MctsPlayer, SearchError};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// A game-playing agent
pub trait Agent: Send {
    /// Pick a flat action index for `player` on `board`
    fn choose_action(&mut self, board: &Board, player: Player) -> Result<usize, SearchError>;

    /// Forget everything learned during the previous game
    fn reset(&mut self) {}

    /// Label for logs
    fn name(&self) -> String;
}

impl Agent for MctsPlayer {
    fn choose_action(&mut self, board: &Board, player: Player) -> Result<usize, SearchError> {
        self.best_action(board, player)
    }

    fn reset(&mut self) {
        MctsPlayer::reset(self);
    }

    fn name(&self) -> String {
        format!("mcts({}, {} sims)", self.oracle_name(), self.config().simulations)
    }
}

/// Uniformly random legal moves (baseline opponent)
pub struct RandomAgent {
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn choose_action(&mut self, board: &Board, player: Player) -> Result<usize, SearchError> {
        let moves = board.legal_moves(player);
        let mv = moves
            .choose(&mut self.rng)
            .ok_or(SearchError::NoLegalMoves(board.phase()))?;
        Ok(mv.index(board.width()))
    }

    fn name(&self) -> String {
        "random".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nonaga_mcts::{MctsConfig, UniformOracle};
    use std::sync::Arc;

    #[test]
    fn test_random_agent_picks_legal_moves() {
        let mut agent = RandomAgent::new(3);
        let board = Board::initial();
        let mask = board.legal_mask(Player::Black);
        for _ in 0..20 {
            let action = agent.choose_action(&board, Player::Black).unwrap();
            assert!(mask[action]);
        }
    }

    #[test]
    fn test_mcts_agent_resets_tree() {
        let mut agent = MctsPlayer::new(MctsConfig::default().with_simulations(5), Arc::new(UniformOracle));
        let board = Board::initial();

        let action = Agent::choose_action(&mut agent, &board, Player::Red).unwrap();
        assert!(board.legal_mask(Player::Red)[action]);
        assert!(!agent.tree().is_empty());

        Agent::reset(&mut agent);
        assert!(agent.tree().is_empty());
        assert_eq!(Agent::name(&agent), "mcts(uniform, 5 sims)");
    }
}
