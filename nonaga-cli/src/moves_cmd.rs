//! Moves command - inspect a position
//!
//! Loads a setup, optionally replays a list of action indices, then prints
//! the board, the game status and every legal move of the current phase.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use nonaga_arena::NonagaConfig;
use nonaga_core::{Board, Move, Outcome, Player, Setup};

/// Direction names, indexed like the slide directions
const DIRECTION_NAMES: [&str; 6] = ["left", "right", "down-left", "down-right", "up-left", "up-right"];

#[derive(Args)]
pub struct MovesArgs {
    /// Setup JSON file (defaults to the configured setup)
    #[arg(long, value_name = "FILE")]
    pub setup: Option<PathBuf>,

    /// Player to move at the start: red or black
    #[arg(long, default_value = "red")]
    pub player: String,

    /// Action indices to play first, comma separated
    #[arg(long, value_delimiter = ',')]
    pub actions: Vec<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: MovesArgs, config: &NonagaConfig) -> Result<()> {
    let setup = match &args.setup {
        Some(path) => Setup::load(path)?,
        None => config.setup.clone(),
    };
    let mut board = setup.to_board().context("invalid setup")?;
    let mut player = parse_player(&args.player)?;

    for (i, &action) in args.actions.iter().enumerate() {
        (board, player) = board
            .apply_action(player, action)
            .with_context(|| format!("replaying action #{} ({})", i + 1, action))?;
    }

    let moves = board.legal_moves(player);
    if args.json {
        print_json(&board, player, &moves)?;
    } else {
        print_text(&board, player, &moves);
    }
    Ok(())
}

pub fn parse_player(name: &str) -> Result<Player> {
    match name.to_ascii_lowercase().as_str() {
        "red" => Ok(Player::Red),
        "black" => Ok(Player::Black),
        other => bail!("unknown player '{}' (expected red or black)", other),
    }
}

/// Human readable move
pub fn describe_move(mv: &Move) -> String {
    match *mv {
        Move::PieceMove { cell, dir } => {
            let name = DIRECTION_NAMES.get(dir as usize).copied().unwrap_or("?");
            format!("slide {} {}", cell, name)
        }
        Move::TileLift { cell } => format!("lift {}", cell),
        Move::TilePlacement { cell } => format!("place {}", cell),
    }
}

fn status(board: &Board, player: Player) -> String {
    match board.result(player) {
        Outcome::Ongoing => "ongoing".to_string(),
        Outcome::Win => format!("{} wins", player),
        Outcome::Loss => format!("{} wins", player.opponent()),
    }
}

fn print_text(board: &Board, player: Player, moves: &[Move]) {
    println!("{}", board);
    println!("To move: {} ({:?})", player, board.phase());
    println!("Status:  {}", status(board, player));
    println!("\n{} legal moves:", moves.len());
    for mv in moves {
        println!("  {:>5}  {}", mv.index(board.width()), describe_move(mv));
    }
}

fn print_json(board: &Board, player: Player, moves: &[Move]) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonMove {
        index: usize,
        description: String,
        #[serde(rename = "move")]
        mv: Move,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        player: Player,
        phase: nonaga_core::Phase,
        status: String,
        fingerprint: String,
        moves: Vec<JsonMove>,
    }

    let output = JsonOutput {
        player,
        phase: board.phase(),
        status: status(board, player),
        fingerprint: board.canonical(player).fingerprint().to_string(),
        moves: moves
            .iter()
            .map(|mv| JsonMove {
                index: mv.index(board.width()),
                description: describe_move(mv),
                mv: *mv,
            })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nonaga_core::Cell;

    #[test]
    fn test_parse_player() {
        assert_eq!(parse_player("Black").unwrap(), Player::Black);
        assert!(parse_player("green").is_err());
    }

    #[test]
    fn test_describe_move() {
        let mv = Move::PieceMove { cell: Cell::new(3, 5), dir: 3 };
        assert_eq!(describe_move(&mv), "slide (3, 5) down-right");
        assert_eq!(describe_move(&Move::TileLift { cell: Cell::new(7, 7) }), "lift (7, 7)");
    }

    #[test]
    fn test_status_reports_winner() {
        assert_eq!(status(&Board::initial(), Player::Red), "ongoing");
    }
}
