//! # Game Implementations Module
//!
//! This module contains the rules engines for every supported game.
//! Each game implements the `GameState` trait so the controller, the session
//! scheduler and the arena can drive it through one interface.
//!
//! ## Supported Games
//! - **Chess**: 8x8 board with path clearing, check detection and self-check rejection
//! - **Dama**: Checkers with mandatory captures, capture chains and crowning
//! - **Tris (Tic-Tac-Toe)**: 3x3 grid, three in a row wins
//! - **Snakes & Ladders**: 100-square track with single-hop snake and ladder jumps
//! - **Backgammon**: 24 points, dice pool, bar entry, hitting and bearing off
//! - **Uno**: 108-card deck, special cards, wild color selection
//!
//! ## Game Trait Implementation
//! Every game provides:
//! - A move type (a struct or enum implementing `FromStr` and `Display`)
//! - A state type implementing `GameState`, including its greedy bot
//! - A `Display` impl for the terminal front end
//!
//! Games that need randomness (dice, shuffles) keep a seeded generator inside
//! the state, so applying the same move to the same state always gives the
//! same result.

pub mod backgammon;
pub mod chess;
pub mod dama;
pub mod snakes;
pub mod tris;
pub mod uno;

/// Parses a square name like `e2` into `(row, col)`, row 0 being rank 8.
pub(crate) fn parse_square(s: &str) -> Result<(usize, usize), String> {
    let mut chars = s.chars();
    let file = chars.next().ok_or_else(|| format!("empty square in '{}'", s))?;
    let rank = chars.next().ok_or_else(|| format!("missing rank in '{}'", s))?;
    if chars.next().is_some() {
        return Err(format!("square '{}' is too long", s));
    }
    let col = match file.to_ascii_lowercase() {
        f @ 'a'..='h' => f as usize - 'a' as usize,
        _ => return Err(format!("bad file '{}'", file)),
    };
    let row = match rank {
        r @ '1'..='8' => 8 - (r as usize - '0' as usize),
        _ => return Err(format!("bad rank '{}'", rank)),
    };
    Ok((row, col))
}

/// Formats `(row, col)` as a square name like `e2`.
pub(crate) fn square_name((row, col): (usize, usize)) -> String {
    format!("{}{}", (b'a' + col as u8) as char, 8 - row)
}

/// Splits a four-character move like `e2e4` (or `e2-e4`) into two squares.
pub(crate) fn parse_square_pair(s: &str) -> Result<((usize, usize), (usize, usize)), String> {
    let cleaned: String = s.trim().chars().filter(|c| !matches!(c, '-' | ' ' | 'x')).collect();
    if cleaned.len() != 4 || !cleaned.is_ascii() {
        return Err(format!("expected a move like e2e4, got '{}'", s.trim()));
    }
    let from = parse_square(&cleaned[0..2])?;
    let to = parse_square(&cleaned[2..4])?;
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_names() {
        assert_eq!(parse_square("e2"), Ok((6, 4)));
        assert_eq!(parse_square("a8"), Ok((0, 0)));
        assert_eq!(square_name((6, 4)), "e2");
        assert!(parse_square("i9").is_err());
    }

    #[test]
    fn test_square_pair() {
        assert_eq!(parse_square_pair("e2e4"), Ok(((6, 4), (4, 4))));
        assert_eq!(parse_square_pair("e2-e4"), Ok(((6, 4), (4, 4))));
        assert!(parse_square_pair("e2").is_err());
    }
}
