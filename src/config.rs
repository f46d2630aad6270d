//! # Game Configuration
//!
//! Settings shared by the game factory, the session scheduler and the CLI.

use crate::game_wrapper::GameKind;
use std::time::Duration;

/// Delay before a bot moves in the card and race games.
pub const SLOW_BOT_DELAY: Duration = Duration::from_millis(1500);
/// Delay before a bot moves in the board games.
pub const FAST_BOT_DELAY: Duration = Duration::from_millis(1000);
pub const ROLL_FRAMES: usize = 10;
pub const ROLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for creating games and pacing bot turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Seed for shuffles, dice and bot jitter. `None` picks a fresh seed.
    pub seed: Option<u64>,
    /// Seats at an Uno table (2-4)
    pub uno_players: usize,
    /// Seats in a Snakes & Ladders race (2-4)
    pub snakes_players: usize,
    /// Overrides the per-game bot delay when set
    pub bot_delay: Option<Duration>,
    /// Faces shown by a dice roll animation before it settles
    pub roll_frames: usize,
    pub roll_interval: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            uno_players: 2,
            snakes_players: 2,
            bot_delay: None,
            roll_frames: ROLL_FRAMES,
            roll_interval: ROLL_INTERVAL,
        }
    }
}

impl GameConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed), ..Self::default() }
    }

    /// How long a bot waits before moving in `kind`.
    pub fn bot_delay_for(&self, kind: GameKind) -> Duration {
        self.bot_delay.unwrap_or(match kind {
            GameKind::Uno | GameKind::Snakes => SLOW_BOT_DELAY,
            GameKind::Chess | GameKind::Dama | GameKind::Tris | GameKind::Backgammon => FAST_BOT_DELAY,
        })
    }
}
