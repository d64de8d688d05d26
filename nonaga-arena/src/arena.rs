//! Arena - pit a challenger against the current champion
//!
//! Level 2 - Phase-level implementation

use nonaga_core::Player;
use nonaga_mcts::SearchError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::config::ArenaConfig;
use crate::game_runner::{GameOutcome, GameRunner};

/// Result of an arena match, from the challenger's side
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArenaResult {
    pub challenger_wins: usize,
    pub champion_wins: usize,
    pub draws: usize,
    /// Individual game outcomes (challenger plays Red)
    pub games: Vec<GameOutcome>,
}

impl ArenaResult {
    /// Aggregate outcomes where the challenger played Red
    pub fn from_outcomes(games: Vec<GameOutcome>) -> Self {
        let challenger_wins = games.iter().filter(|g| g.red_wins()).count();
        let champion_wins = games.iter().filter(|g| g.black_wins()).count();
        let draws = games.iter().filter(|g| g.is_draw()).count();
        Self {
            challenger_wins,
            champion_wins,
            draws,
            games,
        }
    }

    pub fn games_played(&self) -> usize {
        self.challenger_wins + self.champion_wins + self.draws
    }

    /// Challenger's share of decided games (0 if nothing was decided)
    pub fn challenger_win_rate(&self) -> f64 {
        let decided = self.challenger_wins + self.champion_wins;
        if decided == 0 {
            0.0
        } else {
            self.challenger_wins as f64 / decided as f64
        }
    }

    /// Does the challenger replace the champion?
    pub fn accepts_challenger(&self, threshold: f64) -> bool {
        self.challenger_wins + self.champion_wins > 0 && self.challenger_win_rate() >= threshold
    }

    pub fn avg_steps(&self) -> f64 {
        if self.games.is_empty() {
            0.0
        } else {
            self.games.iter().map(|g| g.steps).sum::<usize>() as f64 / self.games.len() as f64
        }
    }
}

/// Configuration for a single game in the arena
#[derive(Clone, Copy, Debug)]
struct GameConfig {
    starting_player: Player,
    /// Game index (for seeding)
    game_index: usize,
}

/// Half the games start with Red, half with Black
fn prepare_game_configs(games: usize) -> Vec<GameConfig> {
    let half = games / 2;
    (0..half * 2)
        .map(|i| GameConfig {
            starting_player: if i < half { Player::Red } else { Player::Black },
            game_index: i,
        })
        .collect()
}

/// Play an arena match (Level 2 phase).
///
/// `make_challenger` and `make_champion` build a fresh agent from a seed for
/// every game, so games never share search statistics.
pub fn play_arena<C, H>(
    config: &ArenaConfig,
    runner: &GameRunner,
    make_challenger: C,
    make_champion: H,
) -> Result<ArenaResult, SearchError>
where
    C: Fn(u64) -> Box<dyn Agent> + Sync,
    H: Fn(u64) -> Box<dyn Agent> + Sync,
{
    let game_configs = prepare_game_configs(config.games);

    let play_one = |gc: &GameConfig| -> Result<GameOutcome, SearchError> {
        let seed = config.seed.wrapping_add(gc.game_index as u64);
        let mut challenger = make_challenger(seed);
        let mut champion = make_champion(seed.wrapping_add(1 << 32));
        let outcome = runner.play(challenger.as_mut(), champion.as_mut(), gc.starting_player)?;

        tracing::debug!(
            "Arena game {}: {} vs {}, {} started, winner {:?}",
            gc.game_index + 1,
            challenger.name(),
            champion.name(),
            gc.starting_player,
            outcome.winner
        );
        Ok(outcome)
    };

    let outcomes: Vec<GameOutcome> = if config.parallel {
        game_configs.par_iter().map(play_one).collect::<Result<_, _>>()?
    } else {
        game_configs.iter().map(play_one).collect::<Result<_, _>>()?
    };

    let result = ArenaResult::from_outcomes(outcomes);
    tracing::info!(
        "Arena: challenger {} / champion {} / draws {} (win rate {:.3})",
        result.challenger_wins,
        result.champion_wins,
        result.draws,
        result.challenger_win_rate()
    );
    Ok(result)
}
