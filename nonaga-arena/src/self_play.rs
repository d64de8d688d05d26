//! Self-play - generate training samples with a single search player
//!
//! Level 2 - Phase-level implementation
//!
//! Each episode uses a fresh search tree. Every step records the canonical
//! board and the search policy; once the game is decided the samples get
//! their value from the point of view of the player who was to move.

use std::sync::Arc;

use nonaga_core::{Board, Phase, Player};
use nonaga_mcts::{MctsConfig, MctsPlayer, Oracle, SearchError};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::SelfPlayConfig;

/// One training example
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    /// Canonical board planes, `[NUM_PLANES, height, width]` flattened
    pub planes: Vec<f32>,
    pub phase: Phase,
    /// Search policy over the phase's action space
    pub policy: Vec<f32>,
    /// Final result for the player to move: +1 win, -1 loss
    pub value: f32,
}

/// Self-play driver
pub struct SelfPlay {
    config: SelfPlayConfig,
    mcts: MctsConfig,
    oracle: Arc<dyn Oracle>,
    start: Board,
}

impl SelfPlay {
    pub fn new(config: SelfPlayConfig, mcts: MctsConfig, oracle: Arc<dyn Oracle>, start: Board) -> Self {
        Self {
            config,
            mcts,
            oracle,
            start,
        }
    }

    pub fn config(&self) -> &SelfPlayConfig {
        &self.config
    }

    /// Play one episode. Returns no samples if the step limit was exceeded.
    pub fn run_episode<R: Rng>(&self, rng: &mut R) -> Result<Vec<TrainingSample>, SearchError> {
        let mut player_search = MctsPlayer::new(self.mcts.clone().with_seed(rng.gen()), self.oracle.clone());
        let mut board = self.start.clone();
        let mut player = if rng.gen_bool(0.5) { Player::Red } else { Player::Black };
        let mut history: Vec<(Vec<f32>, Phase, Player, Vec<f32>)> = Vec::new();
        let mut step = 0;

        loop {
            if step > self.config.max_steps {
                tracing::debug!("Episode abandoned after {} steps", step);
                return Ok(Vec::new());
            }
            step += 1;

            let temperature = if step < self.config.temperature_threshold { 1.0 } else { 0.0 };
            let policy = player_search.action_probabilities(&board, player, temperature)?;

            history.push((
                board.canonical(player).to_planes(),
                board.phase(),
                player,
                policy.iter().map(|&p| p as f32).collect(),
            ));

            let action = sample_action(&policy, rng).ok_or(SearchError::NoLegalMoves(board.phase()))?;
            (board, player) = board.apply_action(player, action)?;

            let outcome = board.result(player);
            if outcome.is_over() {
                let winner = if outcome.value() > 0.0 { player } else { player.opponent() };
                tracing::debug!("Episode finished after {} steps, {} wins", step, winner);

                return Ok(history
                    .into_iter()
                    .map(|(planes, phase, mover, policy)| TrainingSample {
                        planes,
                        phase,
                        policy,
                        value: if mover == winner { 1.0 } else { -1.0 },
                    })
                    .collect());
            }
        }
    }

    /// Play `config.episodes` episodes and pool their samples
    pub fn run<R: Rng>(&self, rng: &mut R) -> Result<Vec<TrainingSample>, SearchError> {
        let mut samples = Vec::new();
        for episode in 0..self.config.episodes {
            let episode_samples = self.run_episode(rng)?;
            tracing::info!("Episode {}: {} samples", episode + 1, episode_samples.len());
            samples.extend(episode_samples);
        }
        Ok(samples)
    }
}

/// Draw an action index from a probability vector
fn sample_action<R: Rng>(policy: &[f64], rng: &mut R) -> Option<usize> {
    WeightedIndex::new(policy).ok().map(|dist| dist.sample(rng))
}
