//! # Backgammon Game Implementation
//!
//! Two players race fifteen checkers each around 24 points and bear them off.
//!
//! ## Rules
//! - White moves from point 0 toward 23 and bears off from its home board (18-23);
//!   Black moves the other way with home board 0-5
//! - A turn starts with a roll; doubles give four moves of that value
//! - Every step consumes one die. A point held by two or more enemy checkers is blocked;
//!   a lone enemy checker is hit and sent to the bar
//! - Checkers on the bar must re-enter before anything else moves
//! - Bearing off needs every remaining checker in the home board. A larger die may bear
//!   off a checker only when no checker of that color sits farther from home
//! - The turn passes when the dice are used up or none of them can be played
//! - The first side to bear off all fifteen checkers wins

use crate::{pick_best, seeded_rng, GameState, Outcome};
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::fmt;
use std::str::FromStr;

pub const NUM_POINTS: usize = 24;
pub const CHECKERS_PER_SIDE: u8 = 15;

const BOT_JITTER: f64 = 10.0;
const BEAR_OFF_BONUS: f64 = 100.0;
const HIT_BONUS: f64 = 50.0;
const ENTRY_BONUS: f64 = 30.0;
const STACK_BONUS: f64 = 5.0;
const PIP_BONUS: f64 = 2.0;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BgColor {
    White,
    Black,
}

impl BgColor {
    pub fn opponent(self) -> Self {
        match self {
            BgColor::White => BgColor::Black,
            BgColor::Black => BgColor::White,
        }
    }

    pub fn player_id(self) -> i32 {
        match self {
            BgColor::White => 1,
            BgColor::Black => -1,
        }
    }

    fn index(self) -> usize {
        match self {
            BgColor::White => 0,
            BgColor::Black => 1,
        }
    }

    fn in_home(self, point: usize) -> bool {
        match self {
            BgColor::White => point >= 18,
            BgColor::Black => point <= 5,
        }
    }

    /// Pips a checker on `point` still needs to leave the board.
    fn distance_off(self, point: usize) -> usize {
        match self {
            BgColor::White => NUM_POINTS - point,
            BgColor::Black => point + 1,
        }
    }

    /// Destination of a checker moving `die` pips from `point`, or `None` past the edge.
    fn advance(self, point: usize, die: u8) -> Option<usize> {
        let target = match self {
            BgColor::White => point as isize + die as isize,
            BgColor::Black => point as isize - die as isize,
        };
        (0..NUM_POINTS as isize).contains(&target).then_some(target as usize)
    }

    fn entry_point(self, die: u8) -> usize {
        match self {
            BgColor::White => die as usize - 1,
            BgColor::Black => NUM_POINTS - die as usize,
        }
    }
}

impl fmt::Display for BgColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BgColor::White => write!(f, "White"),
            BgColor::Black => write!(f, "Black"),
        }
    }
}

/// Checkers of one color sharing a point.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Stack {
    pub color: BgColor,
    pub count: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Source {
    Bar,
    Point(usize),
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Target {
    Point(usize),
    Off,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BgMove {
    Roll,
    Step { from: Source, to: Target, die: u8 },
}

impl fmt::Display for BgMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BgMove::Roll => write!(f, "roll"),
            BgMove::Step { from, to, die } => {
                match from {
                    Source::Bar => write!(f, "bar")?,
                    Source::Point(p) => write!(f, "{}", p)?,
                }
                match to {
                    Target::Point(p) => write!(f, "-{}", p)?,
                    Target::Off => write!(f, "-off")?,
                }
                write!(f, "/{}", die)
            }
        }
    }
}

impl FromStr for BgMove {
    type Err = String;

    /// Parses `roll` or `<from>-<to>/<die>`, where `from` is a point or `bar`
    /// and `to` is a point or `off`. Example: `bar-3/4`, `18-off/6`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "roll" || lower == "r" {
            return Ok(BgMove::Roll);
        }
        let (path, die) = lower.split_once('/').ok_or("expected <from>-<to>/<die> or 'roll'")?;
        let (from, to) = path.split_once('-').ok_or("expected <from>-<to>/<die>")?;
        let die: u8 = die.trim().parse().map_err(|_| format!("invalid die '{}'", die.trim()))?;
        if !(1..=6).contains(&die) {
            return Err(format!("die {} is out of range", die));
        }
        let point = |text: &str| -> Result<usize, String> {
            match text.trim().parse::<usize>() {
                Ok(p) if p < NUM_POINTS => Ok(p),
                _ => Err(format!("invalid point '{}'", text.trim())),
            }
        };
        let from = match from.trim() {
            "bar" => Source::Bar,
            other => Source::Point(point(other)?),
        };
        let to = match to.trim() {
            "off" => Target::Off,
            other => Target::Point(point(other)?),
        };
        Ok(BgMove::Step { from, to, die })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgammonState {
    points: [Option<Stack>; NUM_POINTS],
    bar: [u8; 2],
    borne_off: [u8; 2],
    /// Unused dice of the current turn. Empty means the player must roll.
    dice: Vec<u8>,
    current: BgColor,
    winner: Option<BgColor>,
    rng: Xoshiro256PlusPlus,
}

impl BackgammonState {
    pub fn new(seed: Option<u64>) -> Self {
        Self::from_position(
            &[
                (0, BgColor::White, 2),
                (11, BgColor::White, 5),
                (16, BgColor::White, 3),
                (18, BgColor::White, 5),
                (23, BgColor::Black, 2),
                (12, BgColor::Black, 5),
                (7, BgColor::Black, 3),
                (5, BgColor::Black, 5),
            ],
            [0, 0],
            [0, 0],
            BgColor::White,
            seed,
        )
    }

    /// Builds a position from `(point, color, count)` stacks plus bar and borne-off
    /// counts indexed White, Black. The side to move has not rolled yet.
    pub fn from_position(
        stacks: &[(usize, BgColor, u8)],
        bar: [u8; 2],
        borne_off: [u8; 2],
        current: BgColor,
        seed: Option<u64>,
    ) -> Self {
        let mut points = [None; NUM_POINTS];
        for &(point, color, count) in stacks {
            if point < NUM_POINTS && count > 0 {
                points[point] = Some(Stack { color, count });
            }
        }
        let winner = [BgColor::White, BgColor::Black]
            .into_iter()
            .find(|c| borne_off[c.index()] >= CHECKERS_PER_SIDE);
        Self { points, bar, borne_off, dice: Vec::new(), current, winner, rng: seeded_rng(seed) }
    }

    pub fn point(&self, index: usize) -> Option<Stack> {
        self.points.get(index).copied().flatten()
    }

    pub fn bar(&self, color: BgColor) -> u8 {
        self.bar[color.index()]
    }

    pub fn borne_off(&self, color: BgColor) -> u8 {
        self.borne_off[color.index()]
    }

    pub fn dice(&self) -> &[u8] {
        &self.dice
    }

    pub fn current_color(&self) -> BgColor {
        self.current
    }

    /// Checkers of `color` on the board, on the bar and borne off.
    pub fn checker_count(&self, color: BgColor) -> u8 {
        let on_board: u8 = self.points.iter().flatten().filter(|s| s.color == color).map(|s| s.count).sum();
        on_board + self.bar(color) + self.borne_off(color)
    }

    /// Loads a roll into the dice pool. Doubles count four times. If no die can be
    /// played the turn passes at once.
    pub fn apply_roll(&mut self, d1: u8, d2: u8) {
        self.dice = if d1 == d2 { vec![d1; 4] } else { vec![d1, d2] };
        log::debug!("backgammon: {} rolled {} and {}", self.current, d1, d2);
        if self.legal_steps().is_empty() {
            log::debug!("backgammon: {} has no playable die", self.current);
            self.end_turn();
        }
    }

    fn end_turn(&mut self) {
        self.dice.clear();
        self.current = self.current.opponent();
    }

    fn is_open(&self, point: usize, color: BgColor) -> bool {
        match self.points[point] {
            Some(stack) => stack.color == color || stack.count < 2,
            None => true,
        }
    }

    fn all_home(&self, color: BgColor) -> bool {
        self.bar(color) == 0
            && self
                .points
                .iter()
                .enumerate()
                .all(|(i, p)| p.map_or(true, |s| s.color != color || color.in_home(i)))
    }

    /// Whether `color` has a checker on a point farther from home than `point`.
    fn has_checker_behind(&self, color: BgColor, point: usize) -> bool {
        let farther = |i: usize| color.distance_off(i) > color.distance_off(point);
        self.points
            .iter()
            .enumerate()
            .any(|(i, p)| farther(i) && p.is_some_and(|s| s.color == color))
    }

    fn legal_steps(&self) -> Vec<BgMove> {
        let color = self.current;
        let mut dice = self.dice.clone();
        dice.sort_unstable();
        dice.dedup();

        let mut steps = Vec::new();
        if self.bar(color) > 0 {
            for die in dice {
                let entry = color.entry_point(die);
                if self.is_open(entry, color) {
                    steps.push(BgMove::Step { from: Source::Bar, to: Target::Point(entry), die });
                }
            }
            return steps;
        }

        let bearing_off = self.all_home(color);
        for die in dice {
            for point in 0..NUM_POINTS {
                if !self.points[point].is_some_and(|s| s.color == color) {
                    continue;
                }
                match color.advance(point, die) {
                    Some(target) => {
                        if self.is_open(target, color) {
                            steps.push(BgMove::Step { from: Source::Point(point), to: Target::Point(target), die });
                        }
                    }
                    None if bearing_off => {
                        let distance = color.distance_off(point);
                        let exact = die as usize == distance;
                        let overshoot = die as usize > distance && !self.has_checker_behind(color, point);
                        if exact || overshoot {
                            steps.push(BgMove::Step { from: Source::Point(point), to: Target::Off, die });
                        }
                    }
                    None => {}
                }
            }
        }
        steps
    }

    fn apply_step(&mut self, from: Source, to: Target, die: u8) {
        let color = self.current;
        match from {
            Source::Bar => self.bar[color.index()] -= 1,
            Source::Point(p) => {
                if let Some(stack) = self.points[p].as_mut() {
                    stack.count -= 1;
                    if stack.count == 0 {
                        self.points[p] = None;
                    }
                }
            }
        }
        match to {
            Target::Off => self.borne_off[color.index()] += 1,
            Target::Point(p) => match self.points[p] {
                Some(stack) if stack.color == color => {
                    self.points[p] = Some(Stack { color, count: stack.count + 1 });
                }
                Some(stack) => {
                    self.bar[stack.color.index()] += stack.count;
                    self.points[p] = Some(Stack { color, count: 1 });
                    log::debug!("backgammon: {} hit a checker on point {}", color, p);
                }
                None => self.points[p] = Some(Stack { color, count: 1 }),
            },
        }
        if let Some(i) = self.dice.iter().position(|&d| d == die) {
            self.dice.remove(i);
        }

        if self.borne_off(color) >= CHECKERS_PER_SIDE {
            self.winner = Some(color);
            self.dice.clear();
        } else if self.dice.is_empty() || self.legal_steps().is_empty() {
            self.end_turn();
        }
    }

    fn score_step(&self, from: Source, to: Target, die: u8) -> f64 {
        let color = self.current;
        let mut score = 0.0;
        match (from, to) {
            (Source::Bar, _) => score += ENTRY_BONUS,
            (Source::Point(_), Target::Point(_)) => score += die as f64 * PIP_BONUS,
            (Source::Point(_), Target::Off) => {}
        }
        match to {
            Target::Off => score += BEAR_OFF_BONUS,
            Target::Point(p) => match self.points[p] {
                Some(stack) if stack.color == color => score += STACK_BONUS * stack.count as f64,
                Some(stack) if stack.count == 1 => score += HIT_BONUS,
                _ => {}
            },
        }
        score
    }
}

impl GameState for BackgammonState {
    type Move = BgMove;

    fn get_num_players(&self) -> i32 {
        2
    }

    fn get_current_player(&self) -> i32 {
        self.current.player_id()
    }

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        if self.winner.is_some() {
            Vec::new()
        } else if self.dice.is_empty() {
            vec![BgMove::Roll]
        } else {
            self.legal_steps()
        }
    }

    fn make_move(&mut self, mv: &Self::Move) {
        match *mv {
            BgMove::Roll => {
                let d1 = self.rng.random_range(1..=6);
                let d2 = self.rng.random_range(1..=6);
                self.apply_roll(d1, d2);
            }
            BgMove::Step { from, to, die } => self.apply_step(from, to, die),
        }
    }

    fn get_winner(&self) -> Option<Outcome> {
        self.winner.map(|c| Outcome::Win(c.player_id()))
    }

    fn bot_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Self::Move> {
        let moves = self.get_possible_moves();
        if moves.first() == Some(&BgMove::Roll) {
            return Some(BgMove::Roll);
        }
        pick_best(moves, rng, BOT_JITTER, |mv| match *mv {
            BgMove::Step { from, to, die } => self.score_step(from, to, die),
            BgMove::Roll => 0.0,
        })
    }
}

impl fmt::Display for BackgammonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = |i: usize| match self.points[i] {
            Some(Stack { color: BgColor::White, count }) => format!("W{:<2}", count),
            Some(Stack { color: BgColor::Black, count }) => format!("B{:<2}", count),
            None => " . ".to_string(),
        };
        let top: Vec<String> = (12..NUM_POINTS).map(|i| format!("{:>3}", i)).collect();
        writeln!(f, "{}", top.join(" "))?;
        let top_cells: Vec<String> = (12..NUM_POINTS).map(cell).collect();
        writeln!(f, "{}", top_cells.join(" "))?;
        let bottom_cells: Vec<String> = (0..12).rev().map(cell).collect();
        writeln!(f, "{}", bottom_cells.join(" "))?;
        let bottom: Vec<String> = (0..12).rev().map(|i| format!("{:>3}", i)).collect();
        writeln!(f, "{}", bottom.join(" "))?;
        writeln!(
            f,
            "Bar W{} B{}  Off W{} B{}",
            self.bar(BgColor::White),
            self.bar(BgColor::Black),
            self.borne_off(BgColor::White),
            self.borne_off(BgColor::Black)
        )?;
        if !self.dice.is_empty() {
            writeln!(f, "Dice: {:?}", self.dice)?;
        }
        Ok(())
    }
}
