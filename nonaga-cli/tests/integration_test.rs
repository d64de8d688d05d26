//! Integration tests for the Nonaga engine
//!
//! Tests the full stack: rules, search, arena matches and self-play

use std::path::PathBuf;
use std::sync::Arc;

use nonaga_arena::{
    play_arena, Agent, ArenaConfig, GameRunner, NonagaConfig, OracleConfig, OracleKind, RandomAgent, SelfPlay,
    SelfPlayConfig,
};
use nonaga_core::{Board, Cell, Move, Outcome, Phase, Player, Setup, NUM_PLANES};
use nonaga_mcts::{random_playout, MctsConfig, MctsPlayer, RolloutOracle, UniformOracle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// Red needs one slide to connect its three pieces
fn win_in_one() -> Board {
    let setup = Setup {
        name: "win-in-one".to_string(),
        red: vec![Cell::new(4, 6), Cell::new(5, 5), Cell::new(5, 11)],
        ..Setup::standard()
    };
    setup.to_board().unwrap()
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("nonaga-{}-{}.json", std::process::id(), name))
}

fn mcts(simulations: usize, seed: u64) -> MctsPlayer {
    MctsPlayer::new(
        MctsConfig::default().with_simulations(simulations).with_seed(seed),
        Arc::new(UniformOracle),
    )
}

// ============================================================================
// RULES
// ============================================================================

#[test]
fn test_full_turn_cycles_phases() {
    let board = Board::initial();
    assert_eq!(board.phase(), Phase::MovePiece);

    let (board, player) = board.apply_action(Player::Red, 301).unwrap();
    assert_eq!((board.phase(), player), (Phase::LiftTile, Player::Red));

    let (board, player) = board.apply_action(player, 112).unwrap();
    assert_eq!((board.phase(), player), (Phase::PlaceTile, Player::Red));

    let placement = board.legal_moves(player)[0];
    assert!(matches!(placement, Move::TilePlacement { .. }));
    let (board, player) = board.apply(player, placement).unwrap();
    assert_eq!((board.phase(), player), (Phase::MovePiece, Player::Black));
    assert_eq!(board.tile_count(), Board::initial().tile_count());
}

#[test]
fn test_random_games_keep_board_valid() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..10 {
        let result = random_playout(&Board::initial(), Player::Red, 150, &mut rng).unwrap();
        assert!(result.plies <= 150);
        assert!(result.value() >= -1.0 && result.value() <= 1.0);
    }
}

#[test]
fn test_setup_file_roundtrip() {
    let path = temp_path("setup");
    let setup = Setup::standard();
    setup.save(&path).unwrap();
    let loaded = Setup::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, setup);
    let board = loaded.to_board().unwrap();
    assert_eq!(board.fingerprint(), Board::initial().fingerprint());
}

// ============================================================================
// SEARCH
// ============================================================================

#[test]
fn test_player_takes_winning_slide() {
    let board = win_in_one();
    let mut player = mcts(60, 0);
    let action = player.best_action(&board, Player::Red).unwrap();
    assert_eq!(action, 516);

    let (after, next) = board.apply_action(Player::Red, action).unwrap();
    assert_eq!(after.result(next), Outcome::Win);
}

#[test]
fn test_black_search_sees_the_same_position() {
    // Swapping colors and searching for Black must mirror searching for Red
    let setup = Setup::standard();
    let swapped = Setup {
        red: setup.black.clone(),
        black: setup.red.clone(),
        ..setup.clone()
    };

    let red = mcts(10, 5).action_probabilities(&setup.to_board().unwrap(), Player::Red, 0.0).unwrap();
    let black = mcts(10, 5)
        .action_probabilities(&swapped.to_board().unwrap(), Player::Black, 0.0)
        .unwrap();
    assert_eq!(red, black);
}

#[test]
fn test_rollout_oracle_drives_search() {
    let mut player = MctsPlayer::new(
        MctsConfig::default().with_simulations(8),
        Arc::new(RolloutOracle::new(40, 3)),
    );
    let probs = player.action_probabilities(&Board::initial(), Player::Red, 1.0).unwrap();
    let sum: f64 = probs.iter().sum();
    assert!((sum - 1.0).abs() < 1e-9);
    assert_eq!(player.oracle_name(), "rollout");
}

// ============================================================================
// ARENA AND SELF-PLAY
// ============================================================================

#[test]
fn test_arena_between_search_and_random() {
    let runner = GameRunner::new(Board::initial(), 40);
    let config = ArenaConfig {
        games: 4,
        max_steps: 40,
        ..ArenaConfig::default()
    };
    let challenger = |seed: u64| -> Box<dyn Agent> { Box::new(mcts(6, seed)) };
    let champion = |seed: u64| -> Box<dyn Agent> { Box::new(RandomAgent::new(seed)) };

    let result = play_arena(&config, &runner, challenger, champion).unwrap();
    assert_eq!(result.games_played(), 4);
    let red_first = result.games.iter().filter(|g| g.starting_player == Player::Red).count();
    assert_eq!(red_first, 2);
    for game in &result.games {
        assert_eq!(game.actions.len(), game.steps);
    }
}

#[test]
fn test_self_play_writes_policy_per_phase() {
    let driver = SelfPlay::new(
        SelfPlayConfig {
            episodes: 2,
            max_steps: 30,
            ..SelfPlayConfig::default()
        },
        MctsConfig::default().with_simulations(3),
        Arc::new(UniformOracle),
        Board::initial(),
    );

    // Episodes this short are usually abandoned; decided ones must be well formed
    let samples = driver.run(&mut ChaCha8Rng::seed_from_u64(9)).unwrap();
    for sample in &samples {
        assert_eq!(sample.planes.len(), NUM_PLANES * 12 * 15);
        let expected = if sample.phase == Phase::MovePiece { 1080 } else { 180 };
        assert_eq!(sample.policy.len(), expected);
    }
}

#[test]
fn test_config_file_roundtrip() {
    let path = temp_path("config");
    let config = NonagaConfig {
        oracle: OracleConfig::default().with_kind(OracleKind::Rollout),
        mcts: MctsConfig::default().with_simulations(12),
        ..NonagaConfig::default()
    };
    config.save(&path).unwrap();
    let loaded = NonagaConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, config);
    assert_eq!(loaded.oracle.build().name(), "rollout");
}

#[test]
fn test_partial_config_uses_defaults() {
    let path = temp_path("partial");
    std::fs::write(&path, r#"{ "arena": { "games": 6 } }"#).unwrap();
    let loaded = NonagaConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.arena.games, 6);
    assert_eq!(loaded.arena.max_steps, 300);
    assert_eq!(loaded.setup, Setup::standard());
}
