//! # Snakes & Ladders Game Implementation
//!
//! Players race along a 1-100 track. Each turn rolls one die, advances the
//! player (capped at 100) and applies at most one snake or ladder jump from the
//! square landed on. Reaching exactly 100 wins. There is no decision to make,
//! so the bot simply rolls.

use crate::{seeded_rng, GameState, Outcome};
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::fmt;
use std::str::FromStr;

pub const FINAL_SQUARE: u8 = 100;
pub const START_SQUARE: u8 = 1;

/// Snake heads mapped to their tails.
pub const SNAKES: [(u8, u8); 10] = [
    (16, 6),
    (47, 26),
    (49, 11),
    (56, 53),
    (62, 19),
    (64, 60),
    (87, 24),
    (93, 73),
    (95, 75),
    (98, 78),
];

/// Ladder feet mapped to their tops.
pub const LADDERS: [(u8, u8); 9] = [
    (1, 38),
    (4, 14),
    (9, 21),
    (21, 42),
    (28, 84),
    (36, 44),
    (51, 67),
    (71, 91),
    (80, 100),
];

/// Where a player who lands on `square` ends up. A single lookup: the target of a
/// jump is never itself followed.
pub fn jump_target(square: u8) -> u8 {
    SNAKES
        .iter()
        .chain(LADDERS.iter())
        .find(|(from, _)| *from == square)
        .map_or(square, |&(_, to)| to)
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SnakesMove {
    Roll,
}

impl fmt::Display for SnakesMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "roll")
    }
}

impl FromStr for SnakesMove {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "r" | "roll" => Ok(SnakesMove::Roll),
            other => Err(format!("unknown command '{}', type 'roll'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnakesState {
    /// Square of each seat, index 0 is player 1.
    positions: Vec<u8>,
    current: usize,
    last_roll: Option<u8>,
    winner: Option<usize>,
    rng: Xoshiro256PlusPlus,
}

impl SnakesState {
    /// Creates a game with `num_players` seats (2-4) on square 1.
    pub fn new(num_players: usize, seed: Option<u64>) -> Self {
        Self {
            positions: vec![START_SQUARE; num_players.clamp(2, 4)],
            current: 0,
            last_roll: None,
            winner: None,
            rng: seeded_rng(seed),
        }
    }

    /// Places every seat on a chosen square, seat 0 to move. Missing seats, up to
    /// two, start on square 1.
    pub fn with_positions(mut positions: Vec<u8>, seed: Option<u64>) -> Self {
        positions.resize(positions.len().max(2), START_SQUARE);
        Self { positions, current: 0, last_roll: None, winner: None, rng: seeded_rng(seed) }
    }

    pub fn positions(&self) -> &[u8] {
        &self.positions
    }

    pub fn last_roll(&self) -> Option<u8> {
        self.last_roll
    }

    /// Moves the current player by `roll`, applies one jump and passes the turn.
    pub fn advance(&mut self, roll: u8) {
        if self.winner.is_some() {
            return;
        }
        let landed = self.positions[self.current].saturating_add(roll).min(FINAL_SQUARE);
        let square = jump_target(landed);
        self.positions[self.current] = square;
        self.last_roll = Some(roll);

        if square == FINAL_SQUARE {
            self.winner = Some(self.current);
        } else {
            self.current = (self.current + 1) % self.positions.len();
        }
    }
}

impl GameState for SnakesState {
    type Move = SnakesMove;

    fn get_num_players(&self) -> i32 {
        self.positions.len() as i32
    }

    fn get_current_player(&self) -> i32 {
        self.current as i32 + 1
    }

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        if self.winner.is_some() {
            Vec::new()
        } else {
            vec![SnakesMove::Roll]
        }
    }

    fn make_move(&mut self, _mv: &Self::Move) {
        let roll = self.rng.random_range(1..=6);
        self.advance(roll);
    }

    fn get_winner(&self) -> Option<Outcome> {
        self.winner.map(|seat| Outcome::Win(seat as i32 + 1))
    }

    fn bot_move<R: Rng + ?Sized>(&self, _rng: &mut R) -> Option<Self::Move> {
        self.get_possible_moves().into_iter().next()
    }
}

impl fmt::Display for SnakesState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (seat, square) in self.positions.iter().enumerate() {
            let marker = if seat == self.current && self.winner.is_none() { '>' } else { ' ' };
            writeln!(f, "{} Player {}: square {}", marker, seat + 1, square)?;
        }
        if let Some(roll) = self.last_roll {
            writeln!(f, "Last roll: {}", roll)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_do_not_share_keys() {
        for (snake, _) in SNAKES {
            assert!(LADDERS.iter().all(|(ladder, _)| *ladder != snake));
        }
    }

    #[test]
    fn test_snake_moves_player_down() {
        let mut game = SnakesState::with_positions(vec![10, 1], Some(1));
        game.advance(6);
        assert_eq!(game.positions()[0], 6);
        assert_eq!(game.get_current_player(), 2);
    }

    #[test]
    fn test_single_hop_even_when_target_is_a_key() {
        // 9 climbs to 21, which is itself the foot of a ladder to 42.
        let mut game = SnakesState::with_positions(vec![3, 1], Some(1));
        game.advance(6);
        assert_eq!(game.positions()[0], 21);
    }

    #[test]
    fn test_overshoot_is_capped_and_wins() {
        let mut game = SnakesState::with_positions(vec![97, 1], Some(1));
        game.advance(5);
        assert_eq!(game.positions()[0], 100);
        assert_eq!(game.get_winner(), Some(Outcome::Win(1)));
        assert!(game.get_possible_moves().is_empty());
    }

    #[test]
    fn test_ladder_to_final_square_wins() {
        let mut game = SnakesState::with_positions(vec![1, 77], Some(1));
        game.advance(2);
        game.advance(3);
        assert_eq!(game.positions()[1], 100);
        assert_eq!(game.get_winner(), Some(Outcome::Win(2)));
    }

    #[test]
    fn test_with_positions_fills_missing_seats() {
        let mut game = SnakesState::with_positions(Vec::new(), Some(1));
        assert_eq!(game.get_num_players(), 2);
        game.advance(4);
        assert_eq!(game.positions(), &[5, START_SQUARE]);
        assert_eq!(game.get_current_player(), 2);
    }

    #[test]
    fn test_seeded_rolls_are_reproducible() {
        let a = SnakesState::new(2, Some(42)).apply_move(&SnakesMove::Roll).unwrap();
        let b = SnakesState::new(2, Some(42)).apply_move(&SnakesMove::Roll).unwrap();
        assert_eq!(a, b);
        assert!((1..=6).contains(&a.last_roll().unwrap()));
    }
}
