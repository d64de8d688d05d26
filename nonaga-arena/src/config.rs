//! Configuration for arena matches and self-play
//!
//! Everything is serde-friendly with defaults for missing fields, so a
//! config file only needs the values it changes.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use nonaga_core::Setup;
use nonaga_mcts::{MctsConfig, Oracle, RolloutOracle, UniformOracle};
use serde::{Deserialize, Serialize};

/// Which model-free oracle guides a search
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleKind {
    #[default]
    Uniform,
    Rollout,
}

impl FromStr for OracleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" => Ok(OracleKind::Uniform),
            "rollout" => Ok(OracleKind::Rollout),
            other => Err(format!("unknown oracle '{}' (expected uniform or rollout)", other)),
        }
    }
}

/// Oracle selection and its parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub kind: OracleKind,
    /// Playout cap for the rollout oracle
    pub max_plies: usize,
    pub seed: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            kind: OracleKind::Uniform,
            max_plies: 200,
            seed: 0,
        }
    }
}

impl OracleConfig {
    pub fn with_kind(mut self, kind: OracleKind) -> Self {
        self.kind = kind;
        self
    }

    /// Build a shareable oracle
    pub fn build(&self) -> Arc<dyn Oracle> {
        match self.kind {
            OracleKind::Uniform => Arc::new(UniformOracle),
            OracleKind::Rollout => Arc::new(RolloutOracle::new(self.max_plies, self.seed)),
        }
    }
}

/// Arena (champion vs challenger) configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Total games; half start with Red, half with Black
    pub games: usize,
    /// Plies after which a game is a draw
    pub max_steps: usize,
    /// Share of decided games the challenger must win to be accepted
    pub update_threshold: f64,
    /// Base seed; game `i` uses `seed + i`
    pub seed: u64,
    /// Play games on the rayon pool
    pub parallel: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            games: 40,
            max_steps: 300,
            update_threshold: 0.6,
            seed: 42,
            parallel: true,
        }
    }
}

/// Self-play episode configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfPlayConfig {
    pub episodes: usize,
    /// Steps played at temperature 1 before switching to greedy
    pub temperature_threshold: usize,
    /// Episodes longer than this are abandoned
    pub max_steps: usize,
    pub seed: u64,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            episodes: 10,
            temperature_threshold: 15,
            max_steps: 320,
            seed: 42,
        }
    }
}

/// Full configuration file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonagaConfig {
    pub setup: Setup,
    pub mcts: MctsConfig,
    pub oracle: OracleConfig,
    pub arena: ArenaConfig,
    pub self_play: SelfPlayConfig,
}

impl NonagaConfig {
    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: NonagaConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.setup.to_board().context("config setup is not a valid board")?;
        Ok(config)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
