//! NONAGA Arena - Game orchestration around the search
//!
//! This crate provides:
//! - Agents (MCTS, random) behind one trait
//! - Single-game runner with a step limit
//! - Arena matches between a challenger and a champion
//! - Self-play episodes producing training samples
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 2: play_arena, SelfPlay::run_episode (phases)
//! - Level 3: GameRunner::play (steps)
//! - Level 4: agents, configuration

mod agent;
mod arena;
mod config;
mod game_runner;
mod self_play;

pub use agent::{Agent, RandomAgent};
pub use arena::{play_arena, ArenaResult};
pub use config::{ArenaConfig, NonagaConfig, OracleConfig, OracleKind, SelfPlayConfig};
pub use game_runner::{GameOutcome, GameRunner};
pub use self_play::{SelfPlay, TrainingSample};
