//! # Game Controller Module - Central Game State Management
//!
//! This module provides the `GameController` which serves as the single source of truth
//! for the authoritative game state. Human input, bot turns and scheduled session work
//! all go through it:
//!
//! - **Authoritative Game State**: The "real" snapshot owned by the controller
//! - **Bot Turns**: Computed from the snapshot and applied through the same validation
//! - **Render States**: Borrowed or cloned for display
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       GameController                                │
//! │  ┌─────────────────────────────────────────────────────────────┐    │
//! │  │              Authoritative Game State                       │    │
//! │  │  • Single source of truth                                   │    │
//! │  │  • All moves validated here before application              │    │
//! │  │  • Move history and generation counter maintained           │    │
//! │  └─────────────────────────────────────────────────────────────┘    │
//! │                           │                                         │
//! │              ┌────────────┼────────────┐                            │
//! │              ▼            ▼            ▼                            │
//! │  ┌───────────────┐ ┌───────────┐ ┌─────────────────┐                │
//! │  │ Bot turn      │ │ Terminal  │ │ Session tasks   │                │
//! │  │ (greedy pick) │ │ (view)    │ │ (generation)    │                │
//! │  └───────────────┘ └───────────┘ └─────────────────┘                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Generations
//! Every accepted move and every reset increments `generation`. Work scheduled
//! against an older generation (a delayed bot move, a dice animation) must be
//! discarded when it wakes up.

use crate::game_wrapper::{GameKind, GameWrapper, MoveWrapper};
use crate::{GameState, MoveError, Outcome};
use rand::Rng;
use std::time::SystemTime;

/// Who controls a side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    Human,
    Bot,
}

/// Result of attempting to apply a move
#[derive(Debug, Clone, PartialEq)]
pub enum MoveResult {
    /// Move was successfully applied
    Success {
        /// The applied move
        move_made: MoveWrapper,
        /// Player who made the move
        player: i32,
        /// Whether the game is now over
        game_over: bool,
        /// Final result if the game is over
        outcome: Option<Outcome>,
    },
    /// Move was rejected; the state is unchanged
    Invalid {
        /// Reason the move was rejected
        reason: MoveError,
    },
    /// Game is already over, no more moves allowed
    GameOver,
    /// The bot found nothing to play
    NoMove,
}

/// A single entry in the move history
#[derive(Debug, Clone)]
pub struct MoveHistoryEntry {
    /// When the move was made
    pub timestamp: SystemTime,
    /// Player who made the move
    pub player: i32,
    /// The move that was made
    pub move_made: MoveWrapper,
    /// Move number (1-indexed)
    pub move_number: usize,
}

impl MoveHistoryEntry {
    /// Create a new move history entry
    pub fn new(player: i32, move_made: MoveWrapper, move_number: usize) -> Self {
        Self {
            timestamp: SystemTime::now(),
            player,
            move_made,
            move_number,
        }
    }
}

/// Current game status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Game is still in progress
    InProgress,
    /// Game ended with a winner
    Win(i32),
    /// Game ended in a draw
    Draw,
}

impl GameStatus {
    /// Check if the game is over
    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    fn from_outcome(outcome: Option<Outcome>) -> Self {
        match outcome {
            Some(Outcome::Win(player)) => GameStatus::Win(player),
            Some(Outcome::Draw) => GameStatus::Draw,
            None => GameStatus::InProgress,
        }
    }
}

/// The central game controller that owns the authoritative game state
///
/// # Usage
/// ```rust,ignore
/// let mut controller = GameController::new(GameKind::Tris.new_game(&config));
/// controller.set_player_kind(-1, PlayerKind::Bot);
///
/// match controller.try_make_move(1, mv) {
///     MoveResult::Success { game_over, outcome, .. } => { /* applied */ }
///     MoveResult::Invalid { reason } => { /* rejected, nothing changed */ }
///     _ => {}
/// }
///
/// // The bot answers
/// controller.play_bot_turn(&mut rng);
/// ```
#[derive(Debug, Clone)]
pub struct GameController {
    /// The authoritative game state
    game_state: GameWrapper,
    /// Who controls each player id; unlisted players are human
    players: Vec<(i32, PlayerKind)>,
    /// Complete history of moves made
    move_history: Vec<MoveHistoryEntry>,
    /// Current game status
    status: GameStatus,
    /// Incremented on every accepted move and reset
    generation: u64,
}

impl GameController {
    /// Create a new game controller with every side played by a human
    pub fn new(initial_state: GameWrapper) -> Self {
        let status = GameStatus::from_outcome(initial_state.get_winner());
        Self {
            game_state: initial_state,
            players: Vec::new(),
            move_history: Vec::new(),
            status,
            generation: 0,
        }
    }

    /// Hands `player` to a human or to the bot.
    pub fn set_player_kind(&mut self, player: i32, kind: PlayerKind) {
        match self.players.iter_mut().find(|(id, _)| *id == player) {
            Some(entry) => entry.1 = kind,
            None => self.players.push((player, kind)),
        }
    }

    pub fn player_kind(&self, player: i32) -> PlayerKind {
        self.players
            .iter()
            .find(|(id, _)| *id == player)
            .map_or(PlayerKind::Human, |&(_, kind)| kind)
    }

    /// Whether the side to move is controlled by the bot
    pub fn is_bot_turn(&self) -> bool {
        !self.status.is_game_over() && self.player_kind(self.get_current_player()) == PlayerKind::Bot
    }

    /// Validate a move without applying it
    pub fn validate_move(&self, mv: &MoveWrapper) -> Result<(), MoveError> {
        if self.status.is_game_over() {
            return Err(MoveError::GameOver);
        }
        self.game_state.validate_move(mv)
    }

    /// Attempt a move on behalf of a human `player`
    ///
    /// Rejected when the side belongs to the bot, when it is not `player`'s turn,
    /// or when the game rules refuse the move.
    pub fn try_make_move(&mut self, player: i32, mv: MoveWrapper) -> MoveResult {
        if self.status.is_game_over() {
            return MoveResult::GameOver;
        }
        let rejection = if self.player_kind(player) == PlayerKind::Bot {
            Some(MoveError::BotControlled)
        } else if player != self.get_current_player() {
            Some(MoveError::WrongTurn)
        } else {
            None
        };
        if let Some(reason) = rejection {
            log::warn!("rejected move {} from player {}: {}", mv, player, reason);
            return MoveResult::Invalid { reason };
        }
        self.apply(mv)
    }

    /// Lets the bot pick and play a move for the side to move.
    ///
    /// Returns [`MoveResult::NoMove`] when the bot has nothing to play.
    pub fn play_bot_turn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> MoveResult {
        if self.status.is_game_over() {
            return MoveResult::GameOver;
        }
        match self.game_state.bot_move(rng) {
            Some(mv) => {
                log::debug!(
                    "bot picked {} for {}",
                    mv,
                    self.player_name(self.get_current_player())
                );
                self.apply(mv)
            }
            None => {
                log::debug!("bot has no move for player {}", self.get_current_player());
                MoveResult::NoMove
            }
        }
    }

    fn apply(&mut self, mv: MoveWrapper) -> MoveResult {
        let player = self.game_state.get_current_player();
        let next = match self.game_state.apply_move(&mv) {
            Ok(next) => next,
            Err(reason) => {
                log::warn!("rejected move {} from player {}: {}", mv, player, reason);
                return MoveResult::Invalid { reason };
            }
        };

        self.game_state = next;
        self.generation += 1;
        let move_number = self.move_history.len() + 1;
        self.move_history.push(MoveHistoryEntry::new(player, mv.clone(), move_number));

        let outcome = self.game_state.get_winner();
        self.status = GameStatus::from_outcome(outcome);
        if let Some(outcome) = outcome {
            log::info!("{} finished after {} moves: {}", self.kind(), move_number, outcome);
        }

        MoveResult::Success {
            move_made: mv,
            player,
            game_over: outcome.is_some(),
            outcome,
        }
    }

    /// Get a clone of the game state
    pub fn snapshot(&self) -> GameWrapper {
        self.game_state.clone()
    }

    /// Get a reference to the game state for rendering
    pub fn get_render_state(&self) -> &GameWrapper {
        &self.game_state
    }

    pub fn kind(&self) -> GameKind {
        self.game_state.kind()
    }

    /// Get the current player
    pub fn get_current_player(&self) -> i32 {
        self.game_state.get_current_player()
    }

    /// Get the current game status
    pub fn get_status(&self) -> GameStatus {
        self.status
    }

    /// Check if the game is over
    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    /// Get the winner if the game is over
    pub fn get_winner(&self) -> Option<i32> {
        match self.status {
            GameStatus::Win(w) => Some(w),
            _ => None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Get the complete move history
    pub fn get_move_history(&self) -> &[MoveHistoryEntry] {
        &self.move_history
    }

    /// Get the number of moves made
    pub fn move_count(&self) -> usize {
        self.move_history.len()
    }

    /// Get the last move made, if any
    pub fn get_last_move(&self) -> Option<&MoveHistoryEntry> {
        self.move_history.last()
    }

    /// Get legal moves for the current player
    pub fn get_legal_moves(&self) -> Vec<MoveWrapper> {
        if self.status.is_game_over() {
            Vec::new()
        } else {
            self.game_state.get_possible_moves()
        }
    }

    /// Reset the game to a new initial state. Player kinds are kept.
    pub fn reset(&mut self, new_state: GameWrapper) {
        self.status = GameStatus::from_outcome(new_state.get_winner());
        self.game_state = new_state;
        self.move_history.clear();
        self.generation += 1;
        log::info!("{} reset (generation {})", self.kind(), self.generation);
    }

    /// Format move history as plain text
    pub fn format_history(&self) -> String {
        if self.move_history.is_empty() {
            return String::from("No moves made yet.");
        }

        let mut output = format!("=== {} Game History ===\n\n", self.kind());

        for entry in &self.move_history {
            output.push_str(&format!(
                "{}. {} - {}\n",
                entry.move_number,
                self.player_name(entry.player),
                entry.move_made
            ));
        }

        match self.status {
            GameStatus::Win(winner) => {
                output.push_str(&format!("\nResult: {} wins!\n", self.player_name(winner)));
            }
            GameStatus::Draw => {
                output.push_str("\nResult: Draw\n");
            }
            GameStatus::InProgress => {
                output.push_str(&format!(
                    "\n(Game in progress - {} to move)\n",
                    self.player_name(self.get_current_player())
                ));
            }
        }

        output
    }

    /// Get a human-readable player name
    pub fn player_name(&self, player_id: i32) -> String {
        self.kind().player_name(player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::games::tris::{TrisMove, TrisState};
    use crate::seeded_rng;

    fn tris_controller() -> GameController {
        GameController::new(GameKind::Tris.new_game(&GameConfig::default()))
    }

    #[test]
    fn test_valid_move() {
        let mut controller = tris_controller();
        match controller.try_make_move(1, MoveWrapper::Tris(TrisMove(4))) {
            MoveResult::Success { player, game_over, .. } => {
                assert_eq!(player, 1);
                assert!(!game_over);
            }
            other => panic!("Expected successful move, got {:?}", other),
        }
        assert_eq!(controller.generation(), 1);
    }

    #[test]
    fn test_invalid_move_occupied() {
        let mut controller = tris_controller();
        controller.try_make_move(1, MoveWrapper::Tris(TrisMove(4)));
        let before = controller.snapshot();

        match controller.try_make_move(-1, MoveWrapper::Tris(TrisMove(4))) {
            MoveResult::Invalid { reason: MoveError::IllegalMove } => {}
            other => panic!("Expected illegal move error, got {:?}", other),
        }
        assert_eq!(controller.snapshot(), before);
        assert_eq!(controller.generation(), 1);
    }

    #[test]
    fn test_wrong_turn_and_bot_side() {
        let mut controller = tris_controller();
        assert_eq!(
            controller.try_make_move(-1, MoveWrapper::Tris(TrisMove(0))),
            MoveResult::Invalid { reason: MoveError::WrongTurn }
        );

        controller.set_player_kind(1, PlayerKind::Bot);
        assert!(controller.is_bot_turn());
        assert_eq!(
            controller.try_make_move(1, MoveWrapper::Tris(TrisMove(0))),
            MoveResult::Invalid { reason: MoveError::BotControlled }
        );
        assert_eq!(controller.move_count(), 0);
    }

    #[test]
    fn test_bot_turn_plays_and_records() {
        let mut controller = tris_controller();
        controller.set_player_kind(1, PlayerKind::Bot);
        let result = controller.play_bot_turn(&mut seeded_rng(Some(3)));
        assert!(matches!(result, MoveResult::Success { player: 1, .. }));
        assert_eq!(controller.get_move_history()[0].move_made, MoveWrapper::Tris(TrisMove(4)));
        assert!(!controller.is_bot_turn());
    }

    #[test]
    fn test_game_over_blocks_moves() {
        let state = GameWrapper::Tris(TrisState::from_squares([1, 1, 0, -1, -1, 0, 0, 0, 0], 1));
        let mut controller = GameController::new(state);
        let result = controller.try_make_move(1, MoveWrapper::Tris(TrisMove(2)));
        assert!(matches!(result, MoveResult::Success { game_over: true, outcome: Some(Outcome::Win(1)), .. }));
        assert_eq!(controller.get_winner(), Some(1));
        assert_eq!(controller.try_make_move(-1, MoveWrapper::Tris(TrisMove(5))), MoveResult::GameOver);
        assert_eq!(controller.play_bot_turn(&mut seeded_rng(Some(1))), MoveResult::GameOver);
        assert!(controller.get_legal_moves().is_empty());
    }

    #[test]
    fn test_move_history() {
        let mut controller = tris_controller();
        controller.try_make_move(1, MoveWrapper::Tris(TrisMove(4)));
        controller.try_make_move(-1, MoveWrapper::Tris(TrisMove(0)));

        assert_eq!(controller.move_count(), 2);
        assert_eq!(controller.get_move_history()[0].player, 1);
        assert_eq!(controller.get_move_history()[1].player, -1);
        assert_eq!(controller.get_last_move().map(|e| e.move_number), Some(2));
    }

    #[test]
    fn test_reset_bumps_generation() {
        let mut controller = tris_controller();
        controller.set_player_kind(-1, PlayerKind::Bot);
        controller.try_make_move(1, MoveWrapper::Tris(TrisMove(4)));
        assert_eq!(controller.move_count(), 1);

        controller.reset(GameKind::Tris.new_game(&GameConfig::default()));

        assert_eq!(controller.move_count(), 0);
        assert_eq!(controller.generation(), 2);
        assert_eq!(controller.get_status(), GameStatus::InProgress);
        assert_eq!(controller.player_kind(-1), PlayerKind::Bot);
    }

    #[test]
    fn test_format_history() {
        let mut controller = tris_controller();
        controller.try_make_move(1, MoveWrapper::Tris(TrisMove(4)));

        let history = controller.format_history();
        assert!(history.contains("Tic-Tac-Toe Game History"));
        assert!(history.contains("1. X - 4"));
        assert!(history.contains("O to move"));
    }
}
