//! Game runner - executes single games
//!
//! Level 3 - Step-level implementation

use nonaga_core::{Board, Outcome, Player};
use nonaga_mcts::SearchError;
use serde::{Deserialize, Serialize};

use crate::agent::Agent;

/// Outcome of a single game
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameOutcome {
    /// Winner, None for a draw (step limit reached)
    pub winner: Option<Player>,
    /// Player who made the first move
    pub starting_player: Player,
    /// Number of plies played
    pub steps: usize,
    /// Action history
    pub actions: Vec<usize>,
}

impl GameOutcome {
    pub fn red_wins(&self) -> bool {
        self.winner == Some(Player::Red)
    }

    pub fn black_wins(&self) -> bool {
        self.winner == Some(Player::Black)
    }

    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }

    /// +1 / -1 / 0 from `player`'s point of view
    pub fn value_for(&self, player: Player) -> f64 {
        match self.winner {
            Some(winner) if winner == player => 1.0,
            Some(_) => -1.0,
            None => 0.0,
        }
    }
}

/// Plays games from a fixed starting board
#[derive(Clone, Debug)]
pub struct GameRunner {
    start: Board,
    max_steps: usize,
}

impl GameRunner {
    pub fn new(start: Board, max_steps: usize) -> Self {
        Self { start, max_steps }
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Play one game: `red` moves the Red pieces, `black` the Black ones
    pub fn play(
        &self,
        red: &mut dyn Agent,
        black: &mut dyn Agent,
        starting_player: Player,
    ) -> Result<GameOutcome, SearchError> {
        let mut board = self.start.clone();
        let mut player = starting_player;
        let mut actions = Vec::new();

        let winner = loop {
            match board.result(player) {
                Outcome::Win => break Some(player),
                Outcome::Loss => break Some(player.opponent()),
                Outcome::Ongoing => {}
            }
            if actions.len() >= self.max_steps {
                break None;
            }

            let action = match player {
                Player::Red => red.choose_action(&board, player)?,
                Player::Black => black.choose_action(&board, player)?,
            };
            (board, player) = board.apply_action(player, action)?;
            actions.push(action);
        };

        tracing::debug!(
            "Game finished after {} plies: {}",
            actions.len(),
            winner.map_or("draw".to_string(), |p| format!("{} wins", p))
        );

        Ok(GameOutcome {
            winner,
            starting_player,
            steps: actions.len(),
            actions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::RandomAgent;
    use nonaga_core::{Cell, Setup};

    /// Always plays the first legal action
    struct FirstMove;

    impl Agent for FirstMove {
        fn choose_action(&mut self, board: &Board, player: Player) -> Result<usize, SearchError> {
            let mask = board.legal_mask(player);
            mask.iter()
                .position(|&legal| legal)
                .ok_or(SearchError::NoLegalMoves(board.phase()))
        }

        fn name(&self) -> String {
            "first".to_string()
        }
    }

    /// Plays an action that is never legal
    struct Cheater;

    impl Agent for Cheater {
        fn choose_action(&mut self, _board: &Board, _player: Player) -> Result<usize, SearchError> {
            Ok(0)
        }

        fn name(&self) -> String {
            "cheater".to_string()
        }
    }

    #[test]
    fn test_step_limit_is_a_draw() {
        let runner = GameRunner::new(Board::initial(), 0);
        let outcome = runner.play(&mut FirstMove, &mut FirstMove, Player::Red).unwrap();
        assert!(outcome.is_draw());
        assert_eq!(outcome.steps, 0);
        assert_eq!(outcome.value_for(Player::Red), 0.0);
    }

    #[test]
    fn test_random_games_are_reproducible() {
        let runner = GameRunner::new(Board::initial(), 300);
        let play = || {
            runner
                .play(&mut RandomAgent::new(1), &mut RandomAgent::new(2), Player::Black)
                .unwrap()
        };
        let first = play();
        assert_eq!(first, play());
        assert!(first.steps <= 300);
        assert_eq!(first.starting_player, Player::Black);
    }

    #[test]
    fn test_finished_start_reports_winner() {
        let red = [Cell::new(4, 6), Cell::new(5, 5), Cell::new(5, 7)];
        let black = [Cell::new(3, 9), Cell::new(7, 9), Cell::new(5, 3)];
        let start = Board::from_cells(12, 15, &Setup::standard().tiles, &red, &black).unwrap();

        let runner = GameRunner::new(start, 300);
        let outcome = runner.play(&mut FirstMove, &mut FirstMove, Player::Black).unwrap();
        assert!(outcome.red_wins());
        assert_eq!(outcome.steps, 0);
        assert_eq!(outcome.value_for(Player::Black), -1.0);
    }

    #[test]
    fn test_illegal_action_aborts_game() {
        let runner = GameRunner::new(Board::initial(), 300);
        let result = runner.play(&mut Cheater, &mut FirstMove, Player::Red);
        assert!(matches!(result, Err(SearchError::Rules(_))));
    }
}
