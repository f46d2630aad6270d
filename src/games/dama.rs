//! # Dama (Checkers) Game Implementation
//!
//! Draughts on an 8x8 board, played on the dark squares only.
//!
//! ## Rules
//! - Red (player 1) starts on rows 5-7 and moves toward row 0; Black (player -1)
//!   starts on rows 0-2 and moves toward row 7. Red moves first
//! - Men step one square diagonally forward; kings step one square in any diagonal
//! - Captures jump an adjacent enemy piece onto the empty square beyond it.
//!   Men capture forward only, kings in every direction
//! - Captures are mandatory. If the capturing piece can capture again from where it
//!   landed, the same player continues with that piece only
//! - Reaching the far row crowns a man at once, even in the middle of a chain
//! - A player with no pieces or no legal moves on their turn loses

use crate::games::{parse_square_pair, square_name};
use crate::{pick_best, GameState, MoveError, Outcome};
use rand::Rng;
use std::fmt;
use std::str::FromStr;

pub const BOARD_SIZE: usize = 8;

const BOT_JITTER: f64 = 0.5;
const KING_VALUE: f64 = 5.0;
const MAN_VALUE: f64 = 1.0;

const DIAGONALS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DamaColor {
    Red,
    Black,
}

impl DamaColor {
    pub fn opponent(self) -> DamaColor {
        match self {
            DamaColor::Red => DamaColor::Black,
            DamaColor::Black => DamaColor::Red,
        }
    }

    pub fn player_id(self) -> i32 {
        match self {
            DamaColor::Red => 1,
            DamaColor::Black => -1,
        }
    }

    fn forward(self) -> i32 {
        match self {
            DamaColor::Red => -1,
            DamaColor::Black => 1,
        }
    }

    fn crown_row(self) -> usize {
        match self {
            DamaColor::Red => 0,
            DamaColor::Black => BOARD_SIZE - 1,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DamaPiece {
    pub color: DamaColor,
    pub is_king: bool,
}

impl DamaPiece {
    pub fn man(color: DamaColor) -> Self {
        Self { color, is_king: false }
    }

    pub fn king(color: DamaColor) -> Self {
        Self { color, is_king: true }
    }

    fn value(self) -> f64 {
        if self.is_king {
            KING_VALUE
        } else {
            MAN_VALUE
        }
    }

    fn directions(self) -> Vec<(i32, i32)> {
        if self.is_king {
            DIAGONALS.to_vec()
        } else {
            let f = self.color.forward();
            vec![(f, -1), (f, 1)]
        }
    }
}

/// A single step or a single jump. A capture chain is a sequence of jumps,
/// each played as its own move by the same player.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DamaMove {
    pub from: (usize, usize),
    pub to: (usize, usize),
    /// Square of the jumped piece, for captures.
    pub captured: Option<(usize, usize)>,
}

impl DamaMove {
    pub fn step(from: (usize, usize), to: (usize, usize)) -> Self {
        Self { from, to, captured: None }
    }

    pub fn jump(from: (usize, usize), to: (usize, usize)) -> Self {
        let middle = ((from.0 + to.0) / 2, (from.1 + to.1) / 2);
        Self { from, to, captured: Some(middle) }
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

impl fmt::Display for DamaMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.is_capture() { 'x' } else { '-' };
        write!(f, "{}{}{}", square_name(self.from), sep, square_name(self.to))
    }
}

impl FromStr for DamaMove {
    type Err = String;

    /// Parses `b6-a5` for a step or `c3xe5` for a jump. The separator is optional;
    /// a two-row distance is read as a jump.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = parse_square_pair(s)?;
        match from.0.abs_diff(to.0) {
            1 => Ok(DamaMove::step(from, to)),
            2 => Ok(DamaMove::jump(from, to)),
            _ => Err(format!("'{}' is neither a step nor a jump", s.trim())),
        }
    }
}

type Board = [[Option<DamaPiece>; BOARD_SIZE]; BOARD_SIZE];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamaState {
    board: Board,
    current: DamaColor,
    /// Square the current player must keep capturing from, mid-chain.
    chain_from: Option<(usize, usize)>,
    outcome: Option<Outcome>,
}

fn offset(pos: (usize, usize), (dr, dc): (i32, i32), times: i32) -> Option<(usize, usize)> {
    let r = pos.0 as i32 + dr * times;
    let c = pos.1 as i32 + dc * times;
    let range = 0..BOARD_SIZE as i32;
    (range.contains(&r) && range.contains(&c)).then_some((r as usize, c as usize))
}

impl DamaState {
    /// Creates a game with twelve men per side, Red to move.
    pub fn new() -> Self {
        let mut board: Board = [[None; BOARD_SIZE]; BOARD_SIZE];
        for (row, cells) in board.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                if (row + col) % 2 == 0 {
                    continue;
                }
                if row < 3 {
                    *cell = Some(DamaPiece::man(DamaColor::Black));
                } else if row >= BOARD_SIZE - 3 {
                    *cell = Some(DamaPiece::man(DamaColor::Red));
                }
            }
        }
        Self { board, current: DamaColor::Red, chain_from: None, outcome: None }
    }

    /// Builds an arbitrary position.
    pub fn from_pieces(pieces: &[((usize, usize), DamaPiece)], to_move: DamaColor) -> Self {
        let mut board: Board = [[None; BOARD_SIZE]; BOARD_SIZE];
        for &((row, col), piece) in pieces {
            board[row][col] = Some(piece);
        }
        let mut state = Self { board, current: to_move, chain_from: None, outcome: None };
        state.outcome = state.compute_outcome();
        state
    }

    pub fn piece_at(&self, row: usize, col: usize) -> Option<DamaPiece> {
        self.board[row][col]
    }

    pub fn current_color(&self) -> DamaColor {
        self.current
    }

    /// The square a capture chain must continue from, if one is in progress.
    pub fn chain_from(&self) -> Option<(usize, usize)> {
        self.chain_from
    }

    pub fn count_pieces(&self, color: DamaColor) -> usize {
        self.board.iter().flatten().flatten().filter(|p| p.color == color).count()
    }

    fn captures_from(&self, pos: (usize, usize)) -> Vec<DamaMove> {
        let Some(piece) = self.board[pos.0][pos.1] else {
            return Vec::new();
        };
        piece
            .directions()
            .into_iter()
            .filter_map(|dir| {
                let middle = offset(pos, dir, 1)?;
                let landing = offset(pos, dir, 2)?;
                let jumped = self.board[middle.0][middle.1]?;
                (jumped.color != piece.color && self.board[landing.0][landing.1].is_none())
                    .then_some(DamaMove { from: pos, to: landing, captured: Some(middle) })
            })
            .collect()
    }

    fn steps_from(&self, pos: (usize, usize)) -> Vec<DamaMove> {
        let Some(piece) = self.board[pos.0][pos.1] else {
            return Vec::new();
        };
        piece
            .directions()
            .into_iter()
            .filter_map(|dir| offset(pos, dir, 1))
            .filter(|to| self.board[to.0][to.1].is_none())
            .map(|to| DamaMove::step(pos, to))
            .collect()
    }

    fn squares_of(&self, color: DamaColor) -> Vec<(usize, usize)> {
        (0..BOARD_SIZE)
            .flat_map(|r| (0..BOARD_SIZE).map(move |c| (r, c)))
            .filter(|&(r, c)| self.board[r][c].is_some_and(|p| p.color == color))
            .collect()
    }

    fn all_captures(&self, color: DamaColor) -> Vec<DamaMove> {
        self.squares_of(color).into_iter().flat_map(|pos| self.captures_from(pos)).collect()
    }

    fn generate_moves(&self) -> Vec<DamaMove> {
        if let Some(pos) = self.chain_from {
            return self.captures_from(pos);
        }
        let captures = self.all_captures(self.current);
        if !captures.is_empty() {
            return captures;
        }
        self.squares_of(self.current).into_iter().flat_map(|pos| self.steps_from(pos)).collect()
    }

    fn compute_outcome(&self) -> Option<Outcome> {
        if self.count_pieces(self.current) == 0 || self.generate_moves().is_empty() {
            Some(Outcome::Win(self.current.opponent().player_id()))
        } else {
            None
        }
    }

    fn material_balance(&self, color: DamaColor) -> f64 {
        self.board
            .iter()
            .flatten()
            .flatten()
            .map(|p| if p.color == color { p.value() } else { -p.value() })
            .sum()
    }

    fn score_move(&self, mv: &DamaMove) -> f64 {
        let Some(piece) = self.board[mv.from.0][mv.from.1] else {
            return f64::MIN;
        };
        let mut after = self.clone();
        after.make_move(mv);

        let mut score = after.material_balance(piece.color);
        if !piece.is_king {
            let home_row = BOARD_SIZE - 1 - piece.color.crown_row();
            score += 0.1 * home_row.abs_diff(mv.to.0) as f64;
        }
        if (2..=5).contains(&mv.to.0) && (2..=5).contains(&mv.to.1) {
            score += 0.2;
        }
        if mv.to.1 == 0 || mv.to.1 == BOARD_SIZE - 1 {
            score -= 0.1;
        }
        if mv.is_capture() {
            score += 3.0;
        }
        if !piece.is_king && after.board[mv.to.0][mv.to.1].is_some_and(|p| p.is_king) {
            score += 4.0;
        }
        if after.chain_from == Some(mv.to) {
            score += 2.0;
        }
        score
    }
}

impl Default for DamaState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for DamaState {
    type Move = DamaMove;

    fn get_num_players(&self) -> i32 {
        2
    }

    fn get_current_player(&self) -> i32 {
        self.current.player_id()
    }

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        if self.outcome.is_some() {
            return Vec::new();
        }
        self.generate_moves()
    }

    fn make_move(&mut self, mv: &Self::Move) {
        let Some(mut piece) = self.board[mv.from.0][mv.from.1].take() else {
            return;
        };
        if let Some((r, c)) = mv.captured {
            self.board[r][c] = None;
        }
        if mv.to.0 == piece.color.crown_row() {
            piece.is_king = true;
        }
        self.board[mv.to.0][mv.to.1] = Some(piece);

        if mv.is_capture() && !self.captures_from(mv.to).is_empty() {
            self.chain_from = Some(mv.to);
        } else {
            self.chain_from = None;
            self.current = self.current.opponent();
        }
        self.outcome = self.compute_outcome();
    }

    fn get_winner(&self) -> Option<Outcome> {
        self.outcome
    }

    fn validate_move(&self, mv: &Self::Move) -> Result<(), MoveError> {
        if self.outcome.is_some() {
            return Err(MoveError::GameOver);
        }
        let moves = self.generate_moves();
        if moves.contains(mv) {
            return Ok(());
        }
        let quiet_but_forced = !mv.is_capture() && moves.iter().any(DamaMove::is_capture);
        if quiet_but_forced {
            Err(MoveError::MustCapture)
        } else {
            Err(MoveError::IllegalMove)
        }
    }

    fn bot_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Self::Move> {
        // The generator already drops quiet moves whenever a capture exists.
        pick_best(self.get_possible_moves(), rng, BOT_JITTER, |mv| self.score_move(mv))
    }
}

impl fmt::Display for DamaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.board.iter().enumerate() {
            write!(f, "{} ", BOARD_SIZE - r)?;
            for cell in row {
                let symbol = match cell {
                    Some(DamaPiece { color: DamaColor::Red, is_king: false }) => 'r',
                    Some(DamaPiece { color: DamaColor::Red, is_king: true }) => 'R',
                    Some(DamaPiece { color: DamaColor::Black, is_king: false }) => 'b',
                    Some(DamaPiece { color: DamaColor::Black, is_king: true }) => 'B',
                    None => '.',
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeded_rng;

    #[test]
    fn test_new_game() {
        let game = DamaState::new();
        assert_eq!(game.count_pieces(DamaColor::Red), 12);
        assert_eq!(game.count_pieces(DamaColor::Black), 12);
        assert_eq!(game.get_current_player(), 1);
        // Only the front row of red men can move: 4 men, 7 diagonal targets.
        assert_eq!(game.get_possible_moves().len(), 7);
    }

    #[test]
    fn test_capture_is_mandatory() {
        let game = DamaState::from_pieces(
            &[
                ((5, 2), DamaPiece::man(DamaColor::Red)),
                ((6, 7), DamaPiece::man(DamaColor::Red)),
                ((4, 3), DamaPiece::man(DamaColor::Black)),
                ((0, 1), DamaPiece::man(DamaColor::Black)),
            ],
            DamaColor::Red,
        );
        let moves = game.get_possible_moves();
        assert_eq!(moves, vec![DamaMove::jump((5, 2), (3, 4))]);
        assert!(moves.iter().all(DamaMove::is_capture));

        let quiet = DamaMove::step((6, 7), (5, 6));
        assert_eq!(game.apply_move(&quiet), Err(MoveError::MustCapture));
    }

    #[test]
    fn test_capture_chain_keeps_turn() {
        let game = DamaState::from_pieces(
            &[
                ((7, 0), DamaPiece::man(DamaColor::Red)),
                ((6, 1), DamaPiece::man(DamaColor::Black)),
                ((4, 3), DamaPiece::man(DamaColor::Black)),
                ((0, 7), DamaPiece::man(DamaColor::Black)),
            ],
            DamaColor::Red,
        );
        let after_first = game.apply_move(&DamaMove::jump((7, 0), (5, 2))).unwrap();
        assert_eq!(after_first.get_current_player(), 1);
        assert_eq!(after_first.chain_from(), Some((5, 2)));
        assert_eq!(after_first.get_possible_moves(), vec![DamaMove::jump((5, 2), (3, 4))]);

        let after_second = after_first.apply_move(&DamaMove::jump((5, 2), (3, 4))).unwrap();
        assert_eq!(after_second.get_current_player(), -1);
        assert_eq!(after_second.chain_from(), None);
        assert_eq!(after_second.count_pieces(DamaColor::Black), 1);
    }

    #[test]
    fn test_crowning() {
        let game = DamaState::from_pieces(
            &[
                ((1, 2), DamaPiece::man(DamaColor::Red)),
                ((5, 6), DamaPiece::man(DamaColor::Black)),
            ],
            DamaColor::Red,
        );
        let next = game.apply_move(&DamaMove::step((1, 2), (0, 1))).unwrap();
        assert_eq!(next.piece_at(0, 1), Some(DamaPiece::king(DamaColor::Red)));
    }

    #[test]
    fn test_crown_mid_chain_continues_as_king() {
        let game = DamaState::from_pieces(
            &[
                ((2, 1), DamaPiece::man(DamaColor::Red)),
                ((1, 2), DamaPiece::man(DamaColor::Black)),
                ((1, 4), DamaPiece::man(DamaColor::Black)),
            ],
            DamaColor::Red,
        );
        let crowned = game.apply_move(&DamaMove::jump((2, 1), (0, 3))).unwrap();
        assert_eq!(crowned.piece_at(0, 3), Some(DamaPiece::king(DamaColor::Red)));
        assert_eq!(crowned.get_current_player(), 1);
        assert_eq!(crowned.chain_from(), Some((0, 3)));
        // A man could not jump backward; the new king must.
        assert_eq!(crowned.get_possible_moves(), vec![DamaMove::jump((0, 3), (2, 5))]);

        let done = crowned.apply_move(&DamaMove::jump((0, 3), (2, 5))).unwrap();
        assert_eq!(done.count_pieces(DamaColor::Black), 0);
        assert_eq!(done.get_winner(), Some(Outcome::Win(1)));
    }

    #[test]
    fn test_men_do_not_move_backward() {
        let game = DamaState::from_pieces(
            &[
                ((4, 3), DamaPiece::man(DamaColor::Red)),
                ((0, 1), DamaPiece::man(DamaColor::Black)),
            ],
            DamaColor::Red,
        );
        assert_eq!(game.apply_move(&DamaMove::step((4, 3), (5, 4))), Err(MoveError::IllegalMove));
        let king = DamaState::from_pieces(
            &[
                ((4, 3), DamaPiece::king(DamaColor::Red)),
                ((0, 1), DamaPiece::man(DamaColor::Black)),
            ],
            DamaColor::Red,
        );
        assert!(king.apply_move(&DamaMove::step((4, 3), (5, 4))).is_ok());
    }

    #[test]
    fn test_last_capture_wins() {
        let game = DamaState::from_pieces(
            &[
                ((5, 2), DamaPiece::man(DamaColor::Red)),
                ((4, 3), DamaPiece::man(DamaColor::Black)),
            ],
            DamaColor::Red,
        );
        let next = game.apply_move(&DamaMove::jump((5, 2), (3, 4))).unwrap();
        assert_eq!(next.get_winner(), Some(Outcome::Win(1)));
        assert!(next.get_possible_moves().is_empty());
    }

    #[test]
    fn test_bot_prefers_double_capture() {
        let game = DamaState::from_pieces(
            &[
                ((7, 0), DamaPiece::man(DamaColor::Red)),
                ((7, 6), DamaPiece::man(DamaColor::Red)),
                ((6, 1), DamaPiece::man(DamaColor::Black)),
                ((4, 1), DamaPiece::man(DamaColor::Black)),
                ((6, 5), DamaPiece::man(DamaColor::Black)),
                ((0, 1), DamaPiece::man(DamaColor::Black)),
            ],
            DamaColor::Red,
        );
        let mut rng = seeded_rng(Some(5));
        assert_eq!(game.bot_move(&mut rng), Some(DamaMove::jump((7, 0), (5, 2))));
    }

    #[test]
    fn test_parse_moves() {
        assert_eq!("f3-e4".parse::<DamaMove>(), Ok(DamaMove::step((5, 5), (4, 4))));
        assert_eq!("c3xe5".parse::<DamaMove>(), Ok(DamaMove::jump((5, 2), (3, 4))));
        assert!("a1a4".parse::<DamaMove>().is_err());
    }
}
