//! # Game Session - Scheduled Bot Moves and Dice Animations
//!
//! A `GameSession` shares one [`GameController`] between the front end and
//! background tokio tasks. Tasks capture the controller's generation when they
//! are scheduled and do nothing if it has moved on by the time they run, so a
//! reset or a human move always wins over a stale bot turn.
//!
//! All scheduling methods spawn onto the current tokio runtime and must be
//! called from inside one.

use crate::config::GameConfig;
use crate::game_controller::{GameController, MoveResult};
use crate::game_wrapper::{GameWrapper, MoveWrapper};
use crate::seeded_rng;
use parking_lot::Mutex;
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Outcome of a scheduled bot move. `None` means the task found the game had moved on.
pub type BotTurn = Option<MoveResult>;

pub struct GameSession {
    controller: Arc<Mutex<GameController>>,
    rng: Arc<Mutex<Xoshiro256PlusPlus>>,
    config: GameConfig,
    pending: Vec<JoinHandle<BotTurn>>,
    animations: Vec<JoinHandle<()>>,
}

impl GameSession {
    pub fn new(controller: GameController, config: GameConfig) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            rng: Arc::new(Mutex::new(seeded_rng(config.seed))),
            config,
            pending: Vec::new(),
            animations: Vec::new(),
        }
    }

    /// Shared handle to the controller
    pub fn controller(&self) -> Arc<Mutex<GameController>> {
        Arc::clone(&self.controller)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Runs `f` with the controller locked.
    pub fn with_controller<T>(&self, f: impl FnOnce(&mut GameController) -> T) -> T {
        f(&mut self.controller.lock())
    }

    pub fn generation(&self) -> u64 {
        self.controller.lock().generation()
    }

    /// Applies a human move immediately.
    pub fn submit_move(&self, player: i32, mv: MoveWrapper) -> MoveResult {
        self.controller.lock().try_make_move(player, mv)
    }

    /// Cancels outstanding work and starts over from `new_state`.
    pub fn reset(&mut self, new_state: GameWrapper) {
        self.cancel_pending();
        self.controller.lock().reset(new_state);
    }

    /// Plays the bot's move after `delay`, unless the game changes first.
    pub fn schedule_bot_move(&mut self, delay: Duration) {
        let scheduled_at = self.generation();
        let controller = Arc::clone(&self.controller);
        let rng = Arc::clone(&self.rng);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut controller = controller.lock();
            if controller.generation() != scheduled_at {
                log::debug!(
                    "dropping bot move scheduled at generation {} (now {})",
                    scheduled_at,
                    controller.generation()
                );
                return None;
            }
            if !controller.is_bot_turn() {
                return None;
            }
            let mut rng = rng.lock();
            Some(controller.play_bot_turn(&mut *rng))
        });
        self.pending.push(handle);
    }

    /// Schedules the bot with this game's configured delay.
    pub fn schedule_bot_move_default(&mut self) {
        let delay = {
            let controller = self.controller.lock();
            self.config.bot_delay_for(controller.kind())
        };
        self.schedule_bot_move(delay);
    }

    /// Streams random die faces using the configured frame count and interval.
    pub fn roll_animation(&mut self) -> mpsc::Receiver<u8> {
        self.roll_animation_with(self.config.roll_frames, self.config.roll_interval)
    }

    /// Streams `frames` random die faces, one every `interval`. The stream ends
    /// early if the game changes or the receiver is dropped.
    pub fn roll_animation_with(&mut self, frames: usize, interval: Duration) -> mpsc::Receiver<u8> {
        let (tx, rx) = mpsc::channel(frames.max(1));
        let scheduled_at = self.generation();
        let controller = Arc::clone(&self.controller);
        let rng = Arc::clone(&self.rng);

        let handle = tokio::spawn(async move {
            for _ in 0..frames {
                tokio::time::sleep(interval).await;
                if controller.lock().generation() != scheduled_at {
                    break;
                }
                let face = rng.lock().random_range(1..=6);
                if tx.send(face).await.is_err() {
                    break;
                }
            }
        });
        self.animations.push(handle);
        rx
    }

    /// Aborts every scheduled task.
    pub fn cancel_pending(&mut self) {
        let count = self.pending.len() + self.animations.len();
        for handle in self.pending.drain(..) {
            handle.abort();
        }
        for handle in self.animations.drain(..) {
            handle.abort();
        }
        if count > 0 {
            log::debug!("cancelled {} scheduled tasks", count);
        }
    }

    /// Waits for every scheduled bot move and returns what each one did.
    /// Aborted tasks are left out.
    pub async fn join_pending(&mut self) -> Vec<BotTurn> {
        let mut turns = Vec::new();
        for handle in self.pending.drain(..) {
            match handle.await {
                Ok(turn) => turns.push(turn),
                Err(e) if e.is_cancelled() => {}
                Err(e) => log::warn!("bot task failed: {}", e),
            }
        }
        turns
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
