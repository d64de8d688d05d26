//! MCTS search loop
//!
//! One simulation walks down the tree by UCB, expands the first unseen
//! state with an oracle call and backs the value up along the path:
//! 1. Terminal check (cached per state)
//! 2. Expansion - oracle priors masked to legal moves
//! 3. Selection - highest UCB edge
//! 4. Backpropagation - running mean per edge
//!
//! Values returned by [`simulate`] are always expressed for one fixed
//! player (the root's mover); edge values are stored for the player to move
//! at that state.

use nonaga_core::{Board, Phase, Player, RulesError};
use rand::prelude::*;
use thiserror::Error;

use crate::oracle::{Oracle, OracleError};
use crate::tree::{Node, SearchTree};
use crate::MctsConfig;

// ============================================================================
// ERRORS
// ============================================================================

/// Failures that abort a search. None of them are retried.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("oracle failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("rules violation: {0}")]
    Rules(#[from] RulesError),

    #[error("no legal moves in phase {0:?}")]
    NoLegalMoves(Phase),

    #[error("oracle returned {got} priors, expected {expected}")]
    PriorShape { expected: usize, got: usize },
}

// ============================================================================
// SIMULATION
// ============================================================================

/// Run one simulation from `board` with `player` to move.
///
/// Returns the value of the position for `original`.
pub fn simulate(
    tree: &mut SearchTree,
    oracle: &dyn Oracle,
    config: &MctsConfig,
    board: &Board,
    player: Player,
    original: Player,
    depth: usize,
) -> Result<f64, SearchError> {
    let canonical = board.canonical(player);
    let key = canonical.fingerprint().clone();
    let frame = if player == original { 1.0 } else { -1.0 };

    let outcome = tree.outcome(&key, || canonical.result(Player::Red));
    if outcome.is_over() {
        return Ok(frame * outcome.value());
    }

    if depth >= config.max_depth {
        tracing::warn!("Search depth cutoff at {} plies, using oracle value", depth);
        let prediction = oracle.predict(&canonical)?;
        return Ok(frame * prediction.value as f64);
    }

    let action = match tree.node(&key) {
        Some(node) => node
            .select(config.c_puct, config.epsilon)
            .ok_or(SearchError::NoLegalMoves(board.phase()))?,
        None => {
            let (node, value) = expand(oracle, &canonical)?;
            tree.insert(key, node);
            return Ok(frame * value);
        }
    };

    let (next, next_player) = board.apply_action(player, action)?;
    let value = simulate(tree, oracle, config, &next, next_player, original, depth + 1)?;

    if let Some(node) = tree.node_mut(&key) {
        node.record(action, frame * value);
    }
    Ok(value)
}

/// Evaluate an unseen canonical state: legal actions, masked priors and value
fn expand(oracle: &dyn Oracle, canonical: &Board) -> Result<(Node, f64), SearchError> {
    let legal: Vec<usize> = canonical
        .legal_moves(Player::Red)
        .iter()
        .map(|mv| mv.index(canonical.width()))
        .collect();
    if legal.is_empty() {
        return Err(SearchError::NoLegalMoves(canonical.phase()));
    }

    let prediction = oracle.predict(canonical)?;
    let expected = canonical.action_size();
    if prediction.priors.len() != expected {
        return Err(SearchError::PriorShape {
            expected,
            got: prediction.priors.len(),
        });
    }

    let priors = mask_priors(&prediction.priors, &legal);
    Ok((Node::new(legal, priors), prediction.value as f64))
}

/// Restrict priors to `legal` and renormalize, falling back to uniform
/// when the oracle put no mass on any legal action
fn mask_priors(priors: &[f32], legal: &[usize]) -> Vec<f64> {
    let masked: Vec<f64> = legal
        .iter()
        .map(|&action| (priors[action] as f64).max(0.0))
        .collect();
    let sum: f64 = masked.iter().sum();

    if sum > 0.0 && sum.is_finite() {
        masked.iter().map(|p| p / sum).collect()
    } else {
        tracing::warn!("All {} legal moves have zero prior, using uniform", legal.len());
        vec![1.0 / legal.len() as f64; legal.len()]
    }
}

// ============================================================================
// ACTION PROBABILITIES
// ============================================================================

/// Run `config.simulations` simulations from the root and turn the root's
/// edge visit counts into a distribution over the whole action space.
///
/// `temperature == 0` plays greedily (one-hot, ties broken at random).
pub fn action_probabilities<R: Rng>(
    tree: &mut SearchTree,
    oracle: &dyn Oracle,
    config: &MctsConfig,
    board: &Board,
    player: Player,
    temperature: f64,
    rng: &mut R,
) -> Result<Vec<f64>, SearchError> {
    let legal: Vec<usize> = board
        .legal_moves(player)
        .iter()
        .map(|mv| mv.index(board.width()))
        .collect();
    if legal.is_empty() {
        return Err(SearchError::NoLegalMoves(board.phase()));
    }

    for _ in 0..config.simulations {
        simulate(tree, oracle, config, board, player, player, 0)?;
    }

    let key = board.canonical(player).fingerprint().clone();
    let counts = tree.counts(&key, board.action_size());
    let mut weights: Vec<f64> = legal.iter().map(|&a| counts[a] as f64).collect();

    // No visits at the root (terminal root or a single simulation):
    // fall back to the prior, or uniform when the root was never expanded
    if weights.iter().all(|&w| w == 0.0) {
        weights = match tree.node(&key) {
            Some(node) => legal.iter().map(|&a| node.prior(a)).collect(),
            None => vec![1.0; legal.len()],
        };
    }

    let mut probs = vec![0.0; board.action_size()];

    if temperature <= 0.0 {
        let best = weights.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let maxima: Vec<usize> = legal
            .iter()
            .zip(&weights)
            .filter(|(_, &w)| w == best)
            .map(|(&a, _)| a)
            .collect();
        let choice = maxima.choose(rng).copied().unwrap_or(legal[0]);
        probs[choice] = 1.0;
        return Ok(probs);
    }

    // Scale by the largest weight first so small temperatures cannot overflow
    let max = weights.iter().cloned().fold(0.0, f64::max);
    let scaled: Vec<f64> = if max > 0.0 {
        weights.iter().map(|w| (w / max).powf(1.0 / temperature)).collect()
    } else {
        vec![0.0; weights.len()]
    };
    let sum: f64 = scaled.iter().sum();
    if sum > 0.0 {
        for (&action, w) in legal.iter().zip(&scaled) {
            probs[action] = w / sum;
        }
    } else {
        for &action in &legal {
            probs[action] = 1.0 / legal.len() as f64;
        }
    }
    Ok(probs)
}

// ============================================================================
// TESTS
// ============================================================================
