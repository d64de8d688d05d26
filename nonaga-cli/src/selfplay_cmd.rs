//! Selfplay command - write training samples to a JSON file

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use nonaga_arena::{NonagaConfig, OracleKind, SelfPlay, SelfPlayConfig, TrainingSample};
use nonaga_mcts::MctsConfig;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

#[derive(Args)]
pub struct SelfPlayArgs {
    /// Number of episodes
    #[arg(long)]
    pub episodes: Option<usize>,

    /// Simulations per move
    #[arg(long)]
    pub simulations: Option<usize>,

    /// Oracle guiding the search: uniform or rollout
    #[arg(long, value_name = "ORACLE")]
    pub oracle: Option<OracleKind>,

    /// Output JSON file
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

/// File written by the command
#[derive(Serialize)]
struct SampleFile<'a> {
    generated_at: DateTime<Utc>,
    self_play: &'a SelfPlayConfig,
    mcts: &'a MctsConfig,
    oracle: &'a str,
    /// Episodes that hit the step limit and produced nothing
    abandoned: usize,
    samples: Vec<TrainingSample>,
}

pub fn run(args: SelfPlayArgs, config: &NonagaConfig) -> Result<()> {
    let mut self_play = config.self_play.clone();
    if let Some(episodes) = args.episodes {
        self_play.episodes = episodes;
    }
    let mut mcts = config.mcts.clone();
    if let Some(simulations) = args.simulations {
        mcts = mcts.with_simulations(simulations);
    }
    let oracle = config.oracle.clone().with_kind(args.oracle.unwrap_or(config.oracle.kind)).build();
    let start = config.setup.to_board().context("invalid setup")?;

    tracing::info!(
        "Self-play: {} episodes, {} simulations, {} oracle",
        self_play.episodes,
        mcts.simulations,
        oracle.name()
    );

    let mut rng = ChaCha8Rng::seed_from_u64(self_play.seed);
    let driver = SelfPlay::new(self_play.clone(), mcts.clone(), oracle.clone(), start);

    let progress = ProgressBar::new(self_play.episodes as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} episodes ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let mut samples = Vec::new();
    let mut abandoned = 0;
    for _ in 0..self_play.episodes {
        let episode = driver.run_episode(&mut rng)?;
        if episode.is_empty() {
            abandoned += 1;
        }
        samples.extend(episode);
        progress.inc(1);
        progress.set_message(format!("{} samples", samples.len()));
    }
    progress.finish_and_clear();

    let file = SampleFile {
        generated_at: Utc::now(),
        self_play: &self_play,
        mcts: &mcts,
        oracle: oracle.name(),
        abandoned,
        samples,
    };
    let json = serde_json::to_string_pretty(&file)?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("Failed to write samples: {}", args.output.display()))?;

    tracing::info!(
        "Wrote {} samples to {} ({} episodes abandoned)",
        file.samples.len(),
        args.output.display(),
        abandoned
    );
    Ok(())
}
