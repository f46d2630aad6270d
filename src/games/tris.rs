//! # Tris (Tic-Tac-Toe) Game Implementation
//!
//! Players alternate marking cells of a 3x3 grid. Three equal marks in a row,
//! column or diagonal win; a full grid without a line is a draw.
//!
//! The board is a flat array: 1 for X, -1 for O, 0 for empty. X moves first.

use crate::{GameState, Outcome};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

const CENTER: usize = 4;
const CORNERS: [usize; 4] = [0, 2, 6, 8];

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Index of the cell to mark, 0-8 in reading order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TrisMove(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrisState {
    squares: [i32; 9],
    current_player: i32,
    last_move: Option<usize>,
}

impl TrisState {
    pub fn new() -> Self {
        Self { squares: [0; 9], current_player: 1, last_move: None }
    }

    /// Builds a position from raw cells.
    pub fn from_squares(squares: [i32; 9], current_player: i32) -> Self {
        Self { squares, current_player, last_move: None }
    }

    pub fn squares(&self) -> &[i32; 9] {
        &self.squares
    }

    pub fn last_move(&self) -> Option<usize> {
        self.last_move
    }

    fn line_winner(squares: &[i32; 9]) -> Option<i32> {
        LINES.iter().find_map(|&[a, b, c]| {
            let mark = squares[a];
            (mark != 0 && mark == squares[b] && mark == squares[c]).then_some(mark)
        })
    }

    fn empty_cells(&self) -> Vec<usize> {
        (0..9).filter(|&i| self.squares[i] == 0).collect()
    }

    /// First empty cell that completes a line for `player`.
    fn winning_cell(&self, player: i32) -> Option<usize> {
        self.empty_cells().into_iter().find(|&i| {
            let mut probe = self.squares;
            probe[i] = player;
            Self::line_winner(&probe) == Some(player)
        })
    }
}

impl Default for TrisState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for TrisState {
    type Move = TrisMove;

    fn get_num_players(&self) -> i32 {
        2
    }

    fn get_current_player(&self) -> i32 {
        self.current_player
    }

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.empty_cells().into_iter().map(TrisMove).collect()
    }

    fn make_move(&mut self, mv: &Self::Move) {
        self.squares[mv.0] = self.current_player;
        self.last_move = Some(mv.0);
        self.current_player = -self.current_player;
    }

    fn get_winner(&self) -> Option<Outcome> {
        if let Some(mark) = Self::line_winner(&self.squares) {
            return Some(Outcome::Win(mark));
        }
        self.squares.iter().all(|&s| s != 0).then_some(Outcome::Draw)
    }

    /// Win now, else block, else center, else a random corner, else any random cell.
    fn bot_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Self::Move> {
        if self.is_terminal() {
            return None;
        }
        let me = self.current_player;
        if let Some(cell) = self.winning_cell(me).or_else(|| self.winning_cell(-me)) {
            return Some(TrisMove(cell));
        }
        if self.squares[CENTER] == 0 {
            return Some(TrisMove(CENTER));
        }
        let corners: Vec<usize> = CORNERS.into_iter().filter(|&i| self.squares[i] == 0).collect();
        if let Some(&corner) = corners.choose(rng) {
            return Some(TrisMove(corner));
        }
        self.empty_cells().choose(rng).map(|&cell| TrisMove(cell))
    }
}

impl fmt::Display for TrisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.squares.chunks(3) {
            let cells: Vec<&str> = row
                .iter()
                .map(|&s| match s {
                    1 => "X",
                    -1 => "O",
                    _ => ".",
                })
                .collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

impl fmt::Display for TrisMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TrisMove {
    type Err = String;

    /// Parses a cell index `0`-`8`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cell = s.trim().parse::<usize>().map_err(|e| e.to_string())?;
        if cell < 9 {
            Ok(TrisMove(cell))
        } else {
            Err(format!("cell {} is off the board", cell))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeded_rng;

    #[test]
    fn test_new_game() {
        let game = TrisState::new();
        assert_eq!(game.get_current_player(), 1);
        assert_eq!(game.get_possible_moves().len(), 9);
        assert_eq!(game.get_winner(), None);
    }

    #[test]
    fn test_row_win() {
        let game = TrisState::from_squares([1, 1, 1, 0, 0, 0, 0, 0, 0], -1);
        assert_eq!(game.get_winner(), Some(Outcome::Win(1)));
        assert!(game.get_possible_moves().is_empty());
    }

    #[test]
    fn test_full_board_is_draw() {
        let game = TrisState::from_squares([1, -1, 1, 1, -1, -1, -1, 1, 1], -1);
        assert_eq!(game.get_winner(), Some(Outcome::Draw));
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let game = TrisState::new().apply_move(&TrisMove(4)).unwrap();
        assert!(game.apply_move(&TrisMove(4)).is_err());
        assert_eq!(game.get_current_player(), -1);
    }

    #[test]
    fn test_bot_wins_before_blocking() {
        // X to move can win on 2; O threatens 4.
        let game = TrisState::from_squares([1, 1, 0, -1, 0, -1, 0, 0, 0], 1);
        let mut rng = seeded_rng(Some(1));
        assert_eq!(game.bot_move(&mut rng), Some(TrisMove(2)));
    }

    #[test]
    fn test_bot_blocks() {
        let game = TrisState::from_squares([-1, -1, 0, 0, 1, 0, 0, 0, 1], 1);
        let mut rng = seeded_rng(Some(1));
        assert_eq!(game.bot_move(&mut rng), Some(TrisMove(2)));
    }

    #[test]
    fn test_bot_takes_center_then_corner() {
        let mut rng = seeded_rng(Some(9));
        assert_eq!(TrisState::new().bot_move(&mut rng), Some(TrisMove(CENTER)));

        let game = TrisState::from_squares([0, 0, 0, 0, 1, 0, 0, 0, 0], -1);
        let mv = game.bot_move(&mut rng).unwrap();
        assert!(CORNERS.contains(&mv.0));
    }
}
