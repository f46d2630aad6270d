//! # Chess Game Implementation
//!
//! This module implements a reduced chess rule set on the standard 8x8 board.
//!
//! ## Rules
//! - Pawns move one square forward, two from their start row when both squares are empty,
//!   and capture one square diagonally forward
//! - Rooks, bishops and queens slide; every square between origin and target must be empty
//! - Knights jump in an L shape, kings step one square in any direction
//! - A move that leaves the mover's own king attacked is rejected
//! - Pawns reaching the last rank become queens
//! - No castling and no en passant
//! - A side to move without legal moves is checkmated when in check, stalemated otherwise
//!
//! Row 0 is Black's back rank (rank 8), row 7 is White's (rank 1).

use crate::games::{parse_square_pair, square_name};
use crate::{pick_best, GameState, MoveError, Outcome};
use rand::Rng;
use std::fmt;
use std::str::FromStr;

pub const BOARD_SIZE: usize = 8;

/// Bot jitter: small enough that it never outweighs a pawn of material.
const BOT_JITTER: f64 = 0.5;

/// The kind of a chess piece.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Material value used by the bot.
    pub fn value(self) -> f64 {
        match self {
            PieceKind::Pawn => 1.0,
            PieceKind::Knight | PieceKind::Bishop => 3.0,
            PieceKind::Rook => 5.0,
            PieceKind::Queen => 9.0,
            PieceKind::King => 100.0,
        }
    }

    fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }
}

/// Side colors. White is player 1, Black is player -1.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn player_id(self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Row delta of a pawn step.
    fn forward(self) -> i32 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    fn pawn_start_row(self) -> usize {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    fn last_row(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub has_moved: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color, has_moved: false }
    }
}

/// A move from one square to another, as `(row, col)` pairs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ChessMove {
    pub from: (usize, usize),
    pub to: (usize, usize),
}

impl ChessMove {
    pub fn new(from: (usize, usize), to: (usize, usize)) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", square_name(self.from), square_name(self.to))
    }
}

impl FromStr for ChessMove {
    type Err = String;

    /// Parses coordinate notation such as `e2e4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = parse_square_pair(s)?;
        Ok(ChessMove { from, to })
    }
}

type Board = [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE];

/// Represents the complete state of a chess game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChessState {
    board: Board,
    current: Color,
    last_move: Option<ChessMove>,
    outcome: Option<Outcome>,
}

impl ChessState {
    /// Creates a game in the standard starting position, White to move.
    pub fn new() -> Self {
        const BACK_RANK: [PieceKind; BOARD_SIZE] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut board: Board = [[None; BOARD_SIZE]; BOARD_SIZE];
        for (col, kind) in BACK_RANK.iter().enumerate() {
            board[0][col] = Some(Piece::new(*kind, Color::Black));
            board[1][col] = Some(Piece::new(PieceKind::Pawn, Color::Black));
            board[6][col] = Some(Piece::new(PieceKind::Pawn, Color::White));
            board[7][col] = Some(Piece::new(*kind, Color::White));
        }
        Self { board, current: Color::White, last_move: None, outcome: None }
    }

    /// Builds an arbitrary position. Useful for puzzles and tests.
    pub fn from_pieces(pieces: &[((usize, usize), Piece)], to_move: Color) -> Self {
        let mut board: Board = [[None; BOARD_SIZE]; BOARD_SIZE];
        for &((row, col), piece) in pieces {
            board[row][col] = Some(piece);
        }
        let mut state = Self { board, current: to_move, last_move: None, outcome: None };
        state.outcome = state.compute_outcome();
        state
    }

    pub fn piece_at(&self, row: usize, col: usize) -> Option<Piece> {
        self.board[row][col]
    }

    pub fn current_color(&self) -> Color {
        self.current
    }

    pub fn last_move(&self) -> Option<ChessMove> {
        self.last_move
    }

    /// True if `color`'s king is attacked in the current position.
    pub fn is_in_check(&self, color: Color) -> bool {
        king_attacked(&self.board, color)
    }

    fn legal_moves_for(&self, color: Color) -> Vec<ChessMove> {
        let mut moves = Vec::new();
        for (from_row, row) in self.board.iter().enumerate() {
            for (from_col, cell) in row.iter().enumerate() {
                let Some(piece) = cell else { continue };
                if piece.color != color {
                    continue;
                }
                for to_row in 0..BOARD_SIZE {
                    for to_col in 0..BOARD_SIZE {
                        let mv = ChessMove::new((from_row, from_col), (to_row, to_col));
                        if can_reach(&self.board, mv.from, mv.to)
                            && !king_attacked(&board_after(&self.board, &mv), color)
                        {
                            moves.push(mv);
                        }
                    }
                }
            }
        }
        moves
    }

    fn compute_outcome(&self) -> Option<Outcome> {
        if !self.legal_moves_for(self.current).is_empty() {
            return None;
        }
        if self.is_in_check(self.current) {
            Some(Outcome::Win(self.current.opponent().player_id()))
        } else {
            Some(Outcome::Draw)
        }
    }

    fn material_balance(board: &Board, color: Color) -> f64 {
        board
            .iter()
            .flatten()
            .flatten()
            .map(|p| if p.color == color { p.kind.value() } else { -p.kind.value() })
            .sum()
    }

    /// Heuristic value of `mv` for the side to move.
    fn score_move(&self, mv: &ChessMove) -> f64 {
        let Some(piece) = self.board[mv.from.0][mv.from.1] else {
            return f64::MIN;
        };
        let after = board_after(&self.board, mv);
        let mut score = Self::material_balance(&after, piece.color);

        if let Some(captured) = self.board[mv.to.0][mv.to.1] {
            score += captured.kind.value();
        }
        if (3..=4).contains(&mv.to.0) && (3..=4).contains(&mv.to.1) {
            score += 0.3;
        }
        if piece.kind == PieceKind::Pawn {
            let advanced = piece.color.pawn_start_row().abs_diff(mv.to.0);
            score += 0.1 * advanced as f64;
        }
        if king_attacked(&after, piece.color.opponent()) {
            score += 0.5;
        }
        score
    }
}

impl Default for ChessState {
    fn default() -> Self {
        Self::new()
    }
}

/// Geometry check for a single piece, ignoring whose turn it is and king safety.
///
/// Used both to generate moves and to detect attacks on a king.
fn can_reach(board: &Board, from: (usize, usize), to: (usize, usize)) -> bool {
    if from == to {
        return false;
    }
    let Some(piece) = board[from.0][from.1] else {
        return false;
    };
    let target = board[to.0][to.1];
    if target.is_some_and(|t| t.color == piece.color) {
        return false;
    }

    let dr = to.0 as i32 - from.0 as i32;
    let dc = to.1 as i32 - from.1 as i32;

    match piece.kind {
        PieceKind::Pawn => {
            let dir = piece.color.forward();
            if dc == 0 {
                if target.is_some() {
                    return false;
                }
                if dr == dir {
                    return true;
                }
                if dr == 2 * dir && from.0 == piece.color.pawn_start_row() {
                    let middle = (from.0 as i32 + dir) as usize;
                    return board[middle][from.1].is_none();
                }
                false
            } else {
                dc.abs() == 1 && dr == dir && target.is_some()
            }
        }
        PieceKind::Knight => (dr.abs() == 2 && dc.abs() == 1) || (dr.abs() == 1 && dc.abs() == 2),
        PieceKind::King => dr.abs() <= 1 && dc.abs() <= 1,
        PieceKind::Rook => (dr == 0 || dc == 0) && path_clear(board, from, to),
        PieceKind::Bishop => dr.abs() == dc.abs() && path_clear(board, from, to),
        PieceKind::Queen => {
            (dr == 0 || dc == 0 || dr.abs() == dc.abs()) && path_clear(board, from, to)
        }
    }
}

/// True if every square strictly between `from` and `to` is empty.
/// The two squares must share a row, column or diagonal.
fn path_clear(board: &Board, from: (usize, usize), to: (usize, usize)) -> bool {
    let step_r = (to.0 as i32 - from.0 as i32).signum();
    let step_c = (to.1 as i32 - from.1 as i32).signum();
    let mut r = from.0 as i32 + step_r;
    let mut c = from.1 as i32 + step_c;
    while (r, c) != (to.0 as i32, to.1 as i32) {
        if board[r as usize][c as usize].is_some() {
            return false;
        }
        r += step_r;
        c += step_c;
    }
    true
}

fn find_king(board: &Board, color: Color) -> Option<(usize, usize)> {
    (0..BOARD_SIZE)
        .flat_map(|r| (0..BOARD_SIZE).map(move |c| (r, c)))
        .find(|&(r, c)| {
            board[r][c].is_some_and(|p| p.kind == PieceKind::King && p.color == color)
        })
}

fn king_attacked(board: &Board, color: Color) -> bool {
    let Some(king) = find_king(board, color) else {
        return false;
    };
    (0..BOARD_SIZE)
        .flat_map(|r| (0..BOARD_SIZE).map(move |c| (r, c)))
        .filter(|&(r, c)| board[r][c].is_some_and(|p| p.color != color))
        .any(|from| can_reach(board, from, king))
}

/// The board after moving a piece, including queen promotion.
fn board_after(board: &Board, mv: &ChessMove) -> Board {
    let mut next = *board;
    if let Some(mut piece) = next[mv.from.0][mv.from.1].take() {
        piece.has_moved = true;
        if piece.kind == PieceKind::Pawn && mv.to.0 == piece.color.last_row() {
            piece.kind = PieceKind::Queen;
        }
        next[mv.to.0][mv.to.1] = Some(piece);
    }
    next
}

impl GameState for ChessState {
    type Move = ChessMove;

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
        self.legal_moves_for(self.current)
    }

    fn make_move(&mut self, mv: &Self::Move) {
        self.board = board_after(&self.board, mv);
        self.last_move = Some(*mv);
        self.current = self.current.opponent();
        self.outcome = self.compute_outcome();
    }

    fn get_winner(&self) -> Option<Outcome> {
        self.outcome
    }

    fn validate_move(&self, mv: &Self::Move) -> Result<(), MoveError> {
        if self.outcome.is_some() {
            return Err(MoveError::GameOver);
        }
        let in_bounds = |(r, c): (usize, usize)| r < BOARD_SIZE && c < BOARD_SIZE;
        if !in_bounds(mv.from) || !in_bounds(mv.to) {
            return Err(MoveError::IllegalMove);
        }
        match self.board[mv.from.0][mv.from.1] {
            Some(piece) if piece.color == self.current => {}
            _ => return Err(MoveError::IllegalMove),
        }
        if !can_reach(&self.board, mv.from, mv.to) {
            return Err(MoveError::IllegalMove);
        }
        if king_attacked(&board_after(&self.board, mv), self.current) {
            return Err(MoveError::LeavesKingInCheck);
        }
        Ok(())
    }

    fn bot_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Self::Move> {
        pick_best(self.get_possible_moves(), rng, BOT_JITTER, |mv| self.score_move(mv))
    }
}

impl fmt::Display for ChessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.board.iter().enumerate() {
            write!(f, "{} ", BOARD_SIZE - r)?;
            for cell in row {
                let symbol = match cell {
                    Some(p) if p.color == Color::White => p.kind.letter().to_ascii_uppercase(),
                    Some(p) => p.kind.letter(),
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

    fn mv(s: &str) -> ChessMove {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_game() {
        let game = ChessState::new();
        assert_eq!(game.get_current_player(), 1);
        assert_eq!(game.get_possible_moves().len(), 20);
        assert_eq!(game.piece_at(7, 4).map(|p| p.kind), Some(PieceKind::King));
        assert!(!game.is_terminal());
    }

    #[test]
    fn test_pawn_two_step_needs_both_squares_empty() {
        let game = ChessState::new();
        assert!(game.get_possible_moves().contains(&ChessMove::new((6, 4), (4, 4))));

        let blocked = ChessState::from_pieces(
            &[
                ((7, 4), Piece::new(PieceKind::King, Color::White)),
                ((0, 4), Piece::new(PieceKind::King, Color::Black)),
                ((6, 4), Piece::new(PieceKind::Pawn, Color::White)),
                ((5, 4), Piece::new(PieceKind::Knight, Color::Black)),
            ],
            Color::White,
        );
        let moves = blocked.get_possible_moves();
        assert!(!moves.contains(&ChessMove::new((6, 4), (4, 4))));
        assert!(!moves.contains(&ChessMove::new((6, 4), (5, 4))));
    }

    #[test]
    fn test_two_step_only_from_start_row() {
        let game = ChessState::new().apply_move(&mv("e2e3")).unwrap();
        let game = game.apply_move(&mv("a7a6")).unwrap();
        assert_eq!(game.apply_move(&mv("e3e5")), Err(MoveError::IllegalMove));
    }

    #[test]
    fn test_sliders_need_clear_path() {
        let game = ChessState::new();
        assert_eq!(game.apply_move(&mv("a1a3")), Err(MoveError::IllegalMove));
        assert_eq!(game.apply_move(&mv("c1e3")), Err(MoveError::IllegalMove));
        assert!(game.apply_move(&mv("b1c3")).is_ok());
    }

    #[test]
    fn test_pinned_piece_cannot_expose_king() {
        let game = ChessState::from_pieces(
            &[
                ((7, 4), Piece::new(PieceKind::King, Color::White)),
                ((6, 4), Piece::new(PieceKind::Rook, Color::White)),
                ((0, 4), Piece::new(PieceKind::Rook, Color::Black)),
                ((0, 0), Piece::new(PieceKind::King, Color::Black)),
            ],
            Color::White,
        );
        let sideways = ChessMove::new((6, 4), (6, 3));
        assert_eq!(game.apply_move(&sideways), Err(MoveError::LeavesKingInCheck));
        assert!(!game.get_possible_moves().contains(&sideways));
        assert!(game.apply_move(&ChessMove::new((6, 4), (3, 4))).is_ok());
    }

    #[test]
    fn test_fools_mate() {
        let mut game = ChessState::new();
        for m in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            game = game.apply_move(&mv(m)).unwrap();
        }
        assert!(game.is_in_check(Color::White));
        assert_eq!(game.get_winner(), Some(Outcome::Win(-1)));
        assert!(game.get_possible_moves().is_empty());
        assert_eq!(game.apply_move(&mv("a2a3")), Err(MoveError::GameOver));
    }

    #[test]
    fn test_stalemate_is_draw() {
        let game = ChessState::from_pieces(
            &[
                ((0, 0), Piece::new(PieceKind::King, Color::Black)),
                ((2, 1), Piece::new(PieceKind::Queen, Color::White)),
                ((7, 7), Piece::new(PieceKind::King, Color::White)),
            ],
            Color::Black,
        );
        assert_eq!(game.get_winner(), Some(Outcome::Draw));
    }

    #[test]
    fn test_pawn_promotes_to_queen() {
        let game = ChessState::from_pieces(
            &[
                ((1, 0), Piece::new(PieceKind::Pawn, Color::White)),
                ((7, 7), Piece::new(PieceKind::King, Color::White)),
                ((2, 5), Piece::new(PieceKind::King, Color::Black)),
            ],
            Color::White,
        );
        let next = game.apply_move(&ChessMove::new((1, 0), (0, 0))).unwrap();
        assert_eq!(next.piece_at(0, 0).map(|p| p.kind), Some(PieceKind::Queen));
    }

    #[test]
    fn test_bot_takes_hanging_queen() {
        let game = ChessState::from_pieces(
            &[
                ((7, 4), Piece::new(PieceKind::King, Color::White)),
                ((4, 4), Piece::new(PieceKind::Queen, Color::White)),
                ((4, 0), Piece::new(PieceKind::Queen, Color::Black)),
                ((0, 7), Piece::new(PieceKind::King, Color::Black)),
            ],
            Color::White,
        );
        let mut rng = seeded_rng(Some(3));
        assert_eq!(game.bot_move(&mut rng), Some(ChessMove::new((4, 4), (4, 0))));
    }

    #[test]
    fn test_bot_move_is_legal_and_reproducible() {
        let game = ChessState::new();
        let a = game.bot_move(&mut seeded_rng(Some(11))).unwrap();
        let b = game.bot_move(&mut seeded_rng(Some(11))).unwrap();
        assert_eq!(a, b);
        assert!(game.get_possible_moves().contains(&a));
    }

    #[test]
    fn test_move_display_round_trip() {
        assert_eq!(mv("e2e4").to_string(), "e2e4");
    }
}
