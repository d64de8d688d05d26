//! Arena command - challenger versus champion
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: resolve_settings(), play_match(), report_results()
//! - Level 3: agent factories
//! - Level 4: formatting utilities

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use nonaga_arena::{
    play_arena, Agent, ArenaConfig, ArenaResult, GameOutcome, GameRunner, NonagaConfig, OracleConfig, OracleKind,
    RandomAgent,
};
use nonaga_core::Board;
use nonaga_mcts::{MctsConfig, MctsPlayer, Oracle};
use serde::Serialize;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ArenaArgs {
    /// Number of games, split evenly between starting players
    #[arg(long)]
    pub games: Option<usize>,

    /// Simulations per move for both players
    #[arg(long)]
    pub simulations: Option<usize>,

    /// Challenger oracle: uniform or rollout
    #[arg(long, value_name = "ORACLE")]
    pub one: Option<OracleKind>,

    /// Champion oracle: uniform or rollout
    #[arg(long, value_name = "ORACLE")]
    pub two: Option<OracleKind>,

    /// Champion plays uniformly random legal moves
    #[arg(long)]
    pub random_two: bool,

    /// Run games one after another
    #[arg(long)]
    pub sequential: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Everything a match needs after merging flags into the config
struct ArenaSettings {
    arena: ArenaConfig,
    mcts: MctsConfig,
    one: OracleConfig,
    two: OracleConfig,
    random_two: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run arena command
///
/// 1. Merge flags over the configuration
/// 2. Play the match
/// 3. Report results
pub fn run(args: ArenaArgs, config: &NonagaConfig) -> Result<()> {
    let settings = resolve_settings(&args, config);
    let start = config.setup.to_board().context("invalid setup")?;

    let (result, one_name, two_name) = play_match(&settings, start)?;

    report_results(&result, &one_name, &two_name, &settings, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn resolve_settings(args: &ArenaArgs, config: &NonagaConfig) -> ArenaSettings {
    let mut arena = config.arena.clone();
    if let Some(games) = args.games {
        arena.games = games;
    }
    if args.sequential {
        arena.parallel = false;
    }

    let mut mcts = config.mcts.clone();
    if let Some(simulations) = args.simulations {
        mcts = mcts.with_simulations(simulations);
    }

    let one = config.oracle.clone().with_kind(args.one.unwrap_or(config.oracle.kind));
    let two = config.oracle.clone().with_kind(args.two.unwrap_or(config.oracle.kind));

    ArenaSettings {
        arena,
        mcts,
        one,
        two,
        random_two: args.random_two,
    }
}

/// Play the match, returning the result and both agent names
fn play_match(settings: &ArenaSettings, start: Board) -> Result<(ArenaResult, String, String)> {
    let runner = GameRunner::new(start, settings.arena.max_steps);
    let make_challenger = mcts_factory(settings.mcts.clone(), settings.one.build());
    let make_champion = champion_factory(settings);

    let one_name = make_challenger(0).name();
    let two_name = make_champion(0).name();
    tracing::info!(
        "Starting arena: {} vs {} ({} games, max {} steps)",
        one_name,
        two_name,
        settings.arena.games,
        settings.arena.max_steps
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
    spinner.set_message(format!("playing {} games", settings.arena.games));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = play_arena(&settings.arena, &runner, make_challenger, make_champion);
    spinner.finish_and_clear();

    Ok((result?, one_name, two_name))
}

fn report_results(
    result: &ArenaResult,
    one_name: &str,
    two_name: &str,
    settings: &ArenaSettings,
    json: bool,
) -> Result<()> {
    if json {
        print_json_results(result, one_name, two_name, settings.arena.update_threshold)
    } else {
        print_text_results(result, one_name, two_name, settings.arena.update_threshold);
        Ok(())
    }
}

// ============================================================================
// LEVEL 3 - AGENT FACTORIES
// ============================================================================

fn mcts_factory(mcts: MctsConfig, oracle: Arc<dyn Oracle>) -> impl Fn(u64) -> Box<dyn Agent> + Sync {
    move |seed| -> Box<dyn Agent> { Box::new(MctsPlayer::new(mcts.clone().with_seed(seed), oracle.clone())) }
}

fn champion_factory(settings: &ArenaSettings) -> impl Fn(u64) -> Box<dyn Agent> + Sync {
    let search = mcts_factory(settings.mcts.clone(), settings.two.build());
    let random = settings.random_two;
    move |seed| -> Box<dyn Agent> {
        if random {
            Box::new(RandomAgent::new(seed))
        } else {
            search(seed)
        }
    }
}

// ============================================================================
// LEVEL 4 - FORMATTING UTILITIES
// ============================================================================

fn print_text_results(result: &ArenaResult, one_name: &str, two_name: &str, threshold: f64) {
    println!("\n=== Arena Results ===\n");
    println!("Challenger: {}", one_name);
    println!("Champion:   {}", two_name);
    println!();
    println!("Games played:    {}", result.games_played());
    println!("Challenger wins: {}", result.challenger_wins);
    println!("Champion wins:   {}", result.champion_wins);
    println!("Draws:           {}", result.draws);
    println!("Average steps:   {:.1}", result.avg_steps());
    println!();
    println!(
        "Win rate {:.1}% over decided games: challenger {} (threshold {:.0}%)",
        result.challenger_win_rate() * 100.0,
        if result.accepts_challenger(threshold) { "accepted" } else { "rejected" },
        threshold * 100.0
    );
}

fn print_json_results(result: &ArenaResult, one_name: &str, two_name: &str, threshold: f64) -> Result<()> {
    #[derive(Serialize)]
    struct JsonReport<'a> {
        challenger: &'a str,
        champion: &'a str,
        challenger_wins: usize,
        champion_wins: usize,
        draws: usize,
        win_rate: f64,
        threshold: f64,
        accepted: bool,
        avg_steps: f64,
        games: &'a [GameOutcome],
    }

    let report = JsonReport {
        challenger: one_name,
        champion: two_name,
        challenger_wins: result.challenger_wins,
        champion_wins: result.champion_wins,
        draws: result.draws,
        win_rate: result.challenger_win_rate(),
        threshold,
        accepted: result.accepts_challenger(threshold),
        avg_steps: result.avg_steps(),
        games: &result.games,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ArenaArgs {
        ArenaArgs {
            games: Some(2),
            simulations: Some(3),
            one: Some(OracleKind::Rollout),
            two: None,
            random_two: false,
            sequential: true,
            json: false,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let settings = resolve_settings(&args(), &NonagaConfig::default());
        assert_eq!(settings.arena.games, 2);
        assert!(!settings.arena.parallel);
        assert_eq!(settings.mcts.simulations, 3);
        assert_eq!(settings.one.kind, OracleKind::Rollout);
        assert_eq!(settings.two.kind, OracleKind::Uniform);
    }

    #[test]
    fn test_champion_factory_names() {
        let mut settings = resolve_settings(&args(), &NonagaConfig::default());
        assert!(champion_factory(&settings)(0).name().starts_with("mcts"));
        settings.random_two = true;
        assert_eq!(champion_factory(&settings)(0).name(), "random");
    }
}
