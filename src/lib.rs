//! # Board Game Arena
//!
//! Rules engines and greedy bot opponents for six classic turn-based games:
//! Chess, Dama (checkers), Tic-Tac-Toe, Snakes & Ladders, Backgammon and Uno.
//!
//! Every game implements the [`GameState`] trait. A state is a snapshot: moves are
//! validated against the legal move list and applied to a clone, so a rejected move
//! never touches the original. Bots are single-ply evaluators that score each legal
//! move and keep the best one, with random jitter breaking ties.

pub mod config;
pub mod game_controller;
pub mod game_wrapper;
pub mod games;
pub mod session;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::fmt;
use thiserror::Error;

/// Final result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The given player won.
    Win(i32),
    /// Nobody won (Tic-Tac-Toe tie, chess stalemate).
    Draw,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win(player) => write!(f, "player {} wins", player),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

/// Reasons a move request is turned down. A rejection never changes state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("illegal move")]
    IllegalMove,
    #[error("not this player's turn")]
    WrongTurn,
    #[error("this side is controlled by the bot")]
    BotControlled,
    #[error("the game is already over")]
    GameOver,
    #[error("a capture is available and must be taken")]
    MustCapture,
    #[error("that move would leave your king in check")]
    LeavesKingInCheck,
    #[error("move does not belong to the current game")]
    MismatchedGame,
}

/// The state of a game. Cloneable so moves can be applied to copies.
/// `Send` and `Sync` are required to hand states to the session and arena threads.
pub trait GameState: Clone + PartialEq + fmt::Debug + Send + Sync {
    /// The type of a move in the game.
    type Move: Clone + Eq + std::hash::Hash + fmt::Debug + Send + Sync;

    /// Number of seats at the table.
    fn get_num_players(&self) -> i32;
    /// Returns the player whose turn it is to move.
    fn get_current_player(&self) -> i32;
    /// Returns every legal move for the player to move. Empty once the game is over.
    fn get_possible_moves(&self) -> Vec<Self::Move>;
    /// Applies a move to the state, modifying it. The move is assumed legal.
    fn make_move(&mut self, mv: &Self::Move);
    /// Returns the outcome once the game has finished.
    fn get_winner(&self) -> Option<Outcome>;
    /// Picks the bot's move for the player to move, or `None` if there is nothing to play.
    fn bot_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Self::Move>;

    /// Returns true if the game is over.
    fn is_terminal(&self) -> bool {
        self.get_winner().is_some()
    }

    /// Legal moves for `player`. Only the player to move has any.
    fn legal_moves(&self, player: i32) -> Vec<Self::Move> {
        if self.is_terminal() || player != self.get_current_player() {
            Vec::new()
        } else {
            self.get_possible_moves()
        }
    }

    /// Checks a move without applying it.
    ///
    /// Games override this to report a more specific reason than
    /// [`MoveError::IllegalMove`].
    fn validate_move(&self, mv: &Self::Move) -> Result<(), MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameOver);
        }
        if self.get_possible_moves().contains(mv) {
            Ok(())
        } else {
            Err(MoveError::IllegalMove)
        }
    }

    /// Returns the snapshot that follows `mv`, leaving `self` untouched.
    fn apply_move(&self, mv: &Self::Move) -> Result<Self, MoveError> {
        self.validate_move(mv)?;
        let mut next = self.clone();
        next.make_move(mv);
        Ok(next)
    }
}

/// Scores every candidate, adds uniform jitter in `0..jitter`, and returns the best one.
///
/// Ties after jitter keep the earliest candidate.
pub fn pick_best<M, R, F>(candidates: Vec<M>, rng: &mut R, jitter: f64, mut score: F) -> Option<M>
where
    R: Rng + ?Sized,
    F: FnMut(&M) -> f64,
{
    let mut best: Option<(f64, M)> = None;
    for mv in candidates {
        let noise = if jitter > 0.0 { rng.random_range(0.0..jitter) } else { 0.0 };
        let value = score(&mv) + noise;
        match &best {
            Some((best_value, _)) if *best_value >= value => {}
            _ => best = Some((value, mv)),
        }
    }
    best.map(|(_, mv)| mv)
}

/// Builds the generator stored inside games that need dice or shuffles.
///
/// `None` draws a fresh seed from the thread generator.
pub fn seeded_rng(seed: Option<u64>) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed.unwrap_or_else(rand::random))
}
