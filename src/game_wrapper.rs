//! # Game Wrapper Module - Unified Game Interface
//!
//! This module lets the controller, the session scheduler and the CLI work with any
//! supported game through one type. Each game keeps its own state and move types;
//! the wrappers are plain enums with one variant per game, so dispatch is a `match`
//! rather than a trait object.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │ GameController  │◄──►│   GameWrapper    │◄──►│  Game-Specific  │
//! │ GameSession     │    │                  │    │ Implementations │
//! │ CLI / arena     │    │ • Unified API    │    │ • ChessState    │
//! │                 │    │ • Move parsing   │    │ • UnoState ...  │
//! └─────────────────┘    └──────────────────┘    └─────────────────┘
//! ```
//!
//! A move for one game handed to a different game is rejected with
//! [`MoveError::MismatchedGame`] instead of panicking.

use crate::config::GameConfig;
use crate::games::backgammon::{BackgammonState, BgMove};
use crate::games::chess::{ChessMove, ChessState};
use crate::games::dama::{DamaMove, DamaState};
use crate::games::snakes::{SnakesMove, SnakesState};
use crate::games::tris::{TrisMove, TrisState};
use crate::games::uno::{UnoMove, UnoState};
use crate::{GameState, MoveError, Outcome};
use rand::Rng;
use std::fmt;

/// Identifies one of the supported games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum GameKind {
    Chess,
    Dama,
    Tris,
    Snakes,
    Backgammon,
    Uno,
}

impl GameKind {
    pub const ALL: [GameKind; 6] = [
        GameKind::Chess,
        GameKind::Dama,
        GameKind::Tris,
        GameKind::Snakes,
        GameKind::Backgammon,
        GameKind::Uno,
    ];

    /// Display name of the game
    pub fn name(self) -> &'static str {
        match self {
            GameKind::Chess => "Chess",
            GameKind::Dama => "Dama",
            GameKind::Tris => "Tic-Tac-Toe",
            GameKind::Snakes => "Snakes & Ladders",
            GameKind::Backgammon => "Backgammon",
            GameKind::Uno => "Uno",
        }
    }

    /// Builds the starting position of this game.
    pub fn new_game(self, config: &GameConfig) -> GameWrapper {
        match self {
            GameKind::Chess => GameWrapper::Chess(ChessState::new()),
            GameKind::Dama => GameWrapper::Dama(DamaState::new()),
            GameKind::Tris => GameWrapper::Tris(TrisState::new()),
            GameKind::Snakes => GameWrapper::Snakes(SnakesState::new(config.snakes_players, config.seed)),
            GameKind::Backgammon => GameWrapper::Backgammon(BackgammonState::new(config.seed)),
            GameKind::Uno => GameWrapper::Uno(UnoState::new(config.uno_players, config.seed)),
        }
    }

    /// Parses move text in this game's notation.
    pub fn parse_move(self, text: &str) -> Result<MoveWrapper, String> {
        Ok(match self {
            GameKind::Chess => MoveWrapper::Chess(text.parse()?),
            GameKind::Dama => MoveWrapper::Dama(text.parse()?),
            GameKind::Tris => MoveWrapper::Tris(text.parse()?),
            GameKind::Snakes => MoveWrapper::Snakes(text.parse()?),
            GameKind::Backgammon => MoveWrapper::Backgammon(text.parse()?),
            GameKind::Uno => MoveWrapper::Uno(text.parse()?),
        })
    }

    /// Human-readable name of a player id in this game
    pub fn player_name(self, player: i32) -> String {
        match (self, player) {
            (GameKind::Chess | GameKind::Backgammon, 1) => "White".to_string(),
            (GameKind::Chess | GameKind::Backgammon, -1) => "Black".to_string(),
            (GameKind::Dama, 1) => "Red".to_string(),
            (GameKind::Dama, -1) => "Black".to_string(),
            (GameKind::Tris, 1) => "X".to_string(),
            (GameKind::Tris, -1) => "O".to_string(),
            _ => format!("Player {}", player),
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wrapper enum for all supported game states
#[derive(Debug, Clone, PartialEq)]
pub enum GameWrapper {
    Chess(ChessState),
    Dama(DamaState),
    Tris(TrisState),
    /// Snakes & Ladders
    Snakes(SnakesState),
    Backgammon(BackgammonState),
    Uno(UnoState),
}

/// Wrapper enum for all supported move types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MoveWrapper {
    /// From and to squares, e.g. `e2e4`
    Chess(ChessMove),
    /// A step (`f3-e4`) or a single jump of a capture chain (`c3xe5`)
    Dama(DamaMove),
    /// Cell index 0-8
    Tris(TrisMove),
    Snakes(SnakesMove),
    /// A roll, or one checker moved by one die
    Backgammon(BgMove),
    /// Play a card, name a color after a wild, or draw
    Uno(UnoMove),
}

impl fmt::Display for MoveWrapper {
    /// Formats moves in the notation their game parses
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveWrapper::Chess(m) => write!(f, "{}", m),
            MoveWrapper::Dama(m) => write!(f, "{}", m),
            MoveWrapper::Tris(m) => write!(f, "{}", m),
            MoveWrapper::Snakes(m) => write!(f, "{}", m),
            MoveWrapper::Backgammon(m) => write!(f, "{}", m),
            MoveWrapper::Uno(m) => write!(f, "{}", m),
        }
    }
}

impl fmt::Display for GameWrapper {
    /// Delegates to the specific game's Display implementation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameWrapper::Chess(g) => write!(f, "{}", g),
            GameWrapper::Dama(g) => write!(f, "{}", g),
            GameWrapper::Tris(g) => write!(f, "{}", g),
            GameWrapper::Snakes(g) => write!(f, "{}", g),
            GameWrapper::Backgammon(g) => write!(f, "{}", g),
            GameWrapper::Uno(g) => write!(f, "{}", g),
        }
    }
}

macro_rules! impl_game_dispatch {
    ($($variant:ident),*) => {
        impl GameState for GameWrapper {
            type Move = MoveWrapper;

            fn get_current_player(&self) -> i32 {
                match self {
                    $(GameWrapper::$variant(g) => g.get_current_player(),)*
                }
            }

            fn get_num_players(&self) -> i32 {
                match self {
                    $(GameWrapper::$variant(g) => g.get_num_players(),)*
                }
            }

            fn get_possible_moves(&self) -> Vec<Self::Move> {
                match self {
                    $(GameWrapper::$variant(g) => g
                        .get_possible_moves()
                        .into_iter()
                        .map(MoveWrapper::$variant)
                        .collect(),)*
                }
            }

            fn make_move(&mut self, mv: &Self::Move) {
                match (self, mv) {
                    $((GameWrapper::$variant(g), MoveWrapper::$variant(m)) => g.make_move(m),)*
                    (game, mv) => log::warn!("ignoring move {} for {}", mv, game.kind()),
                }
            }

            fn get_winner(&self) -> Option<Outcome> {
                match self {
                    $(GameWrapper::$variant(g) => g.get_winner(),)*
                }
            }

            fn bot_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Self::Move> {
                match self {
                    $(GameWrapper::$variant(g) => g.bot_move(rng).map(MoveWrapper::$variant),)*
                }
            }

            fn validate_move(&self, mv: &Self::Move) -> Result<(), MoveError> {
                match (self, mv) {
                    $((GameWrapper::$variant(g), MoveWrapper::$variant(m)) => g.validate_move(m),)*
                    _ => Err(MoveError::MismatchedGame),
                }
            }
        }

        impl GameWrapper {
            /// Which game this state belongs to
            pub fn kind(&self) -> GameKind {
                match self {
                    $(GameWrapper::$variant(_) => GameKind::$variant,)*
                }
            }
        }
    };
}

impl_game_dispatch!(Chess, Dama, Tris, Snakes, Backgammon, Uno);

impl MoveWrapper {
    /// Which game this move belongs to
    pub fn kind(&self) -> GameKind {
        match self {
            MoveWrapper::Chess(_) => GameKind::Chess,
            MoveWrapper::Dama(_) => GameKind::Dama,
            MoveWrapper::Tris(_) => GameKind::Tris,
            MoveWrapper::Snakes(_) => GameKind::Snakes,
            MoveWrapper::Backgammon(_) => GameKind::Backgammon,
            MoveWrapper::Uno(_) => GameKind::Uno,
        }
    }
}
