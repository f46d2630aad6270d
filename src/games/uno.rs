//! # Uno Game Implementation
//!
//! A 108-card shedding game for two to four players.
//!
//! ## Rules
//! - Each player is dealt seven cards; the first number card drawn starts the discard pile
//! - A card is playable when it matches the current color, matches the top card's face
//!   (equal number, or the same action), or is wild
//! - Playing a wild puts the game in color selection; the same player then names a color
//! - Skip skips the next player; Reverse flips direction and acts as a skip with two players;
//!   Draw Two and Wild Draw Four make the next player draw two or four cards and skip them
//! - Drawing takes one card and passes the turn. An empty deck is refilled by shuffling
//!   the discard pile under the top card
//! - The first player to empty their hand wins
//!
//! Draw penalties never stack.

use crate::{seeded_rng, GameState, Outcome};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::fmt;
use std::str::FromStr;

pub const HAND_SIZE: usize = 7;
pub const DECK_SIZE: usize = 108;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum UnoColor {
    Red,
    Blue,
    Green,
    Yellow,
}

impl UnoColor {
    pub const ALL: [UnoColor; 4] = [UnoColor::Red, UnoColor::Blue, UnoColor::Green, UnoColor::Yellow];

    fn name(self) -> &'static str {
        match self {
            UnoColor::Red => "red",
            UnoColor::Blue => "blue",
            UnoColor::Green => "green",
            UnoColor::Yellow => "yellow",
        }
    }
}

impl fmt::Display for UnoColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnoColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "r" | "red" => Ok(UnoColor::Red),
            "b" | "blue" => Ok(UnoColor::Blue),
            "g" | "green" => Ok(UnoColor::Green),
            "y" | "yellow" => Ok(UnoColor::Yellow),
            other => Err(format!("unknown color '{}'", other)),
        }
    }
}

/// Card faces. Colored faces carry their color; wild faces get one when played.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Card {
    Number(UnoColor, u8),
    Skip(UnoColor),
    Reverse(UnoColor),
    DrawTwo(UnoColor),
    Wild,
    WildDrawFour,
}

impl Card {
    pub fn color(self) -> Option<UnoColor> {
        match self {
            Card::Number(c, _) | Card::Skip(c) | Card::Reverse(c) | Card::DrawTwo(c) => Some(c),
            Card::Wild | Card::WildDrawFour => None,
        }
    }

    pub fn is_wild(self) -> bool {
        self.color().is_none()
    }

    /// Skip, Reverse and Draw Two. Wild cards are not counted as actions.
    pub fn is_action(self) -> bool {
        matches!(self, Card::Skip(_) | Card::Reverse(_) | Card::DrawTwo(_))
    }

    fn same_face(self, other: Card) -> bool {
        match (self, other) {
            (Card::Number(_, a), Card::Number(_, b)) => a == b,
            (Card::Skip(_), Card::Skip(_))
            | (Card::Reverse(_), Card::Reverse(_))
            | (Card::DrawTwo(_), Card::DrawTwo(_)) => true,
            _ => false,
        }
    }

    /// Whether this card may go on `top` while `current_color` is active.
    pub fn can_play_on(self, top: Card, current_color: UnoColor) -> bool {
        self.is_wild() || self.color() == Some(current_color) || self.same_face(top)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Number(c, n) => write!(f, "{} {}", c, n),
            Card::Skip(c) => write!(f, "{} skip", c),
            Card::Reverse(c) => write!(f, "{} reverse", c),
            Card::DrawTwo(c) => write!(f, "{} +2", c),
            Card::Wild => write!(f, "wild"),
            Card::WildDrawFour => write!(f, "wild +4"),
        }
    }
}

impl FromStr for Card {
    type Err = String;

    /// Parses `red 7`, `blue skip`, `green reverse`, `yellow +2`, `wild` or `wild +4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();
        match words.as_slice() {
            ["wild"] => Ok(Card::Wild),
            ["wild", "+4"] | ["wild4"] | ["+4"] => Ok(Card::WildDrawFour),
            [color, face] => {
                let color: UnoColor = color.parse()?;
                match *face {
                    "skip" => Ok(Card::Skip(color)),
                    "reverse" => Ok(Card::Reverse(color)),
                    "+2" | "draw2" => Ok(Card::DrawTwo(color)),
                    n => match n.parse::<u8>() {
                        Ok(v) if v <= 9 => Ok(Card::Number(color, v)),
                        _ => Err(format!("unknown card face '{}'", n)),
                    },
                }
            }
            _ => Err(format!("cannot read card '{}'", s.trim())),
        }
    }
}

/// The full, unshuffled 108-card deck.
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for color in UnoColor::ALL {
        deck.push(Card::Number(color, 0));
        for n in 1..=9 {
            deck.push(Card::Number(color, n));
            deck.push(Card::Number(color, n));
        }
        for _ in 0..2 {
            deck.push(Card::Skip(color));
            deck.push(Card::Reverse(color));
            deck.push(Card::DrawTwo(color));
        }
    }
    for _ in 0..4 {
        deck.push(Card::Wild);
        deck.push(Card::WildDrawFour);
    }
    deck
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum UnoPhase {
    Playing,
    ColorSelection,
    Finished,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum UnoMove {
    Play(Card),
    ChooseColor(UnoColor),
    Draw,
}

impl fmt::Display for UnoMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnoMove::Play(card) => write!(f, "play {}", card),
            UnoMove::ChooseColor(color) => write!(f, "color {}", color),
            UnoMove::Draw => write!(f, "draw"),
        }
    }
}

impl FromStr for UnoMove {
    type Err = String;

    /// Parses `draw`, `color <color>` or `play <card>` (the `play` keyword is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower == "draw" || lower == "d" {
            return Ok(UnoMove::Draw);
        }
        if let Some(color) = lower.strip_prefix("color ") {
            return color.parse().map(UnoMove::ChooseColor);
        }
        let card = lower.strip_prefix("play ").unwrap_or(&lower);
        card.parse().map(UnoMove::Play)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnoState {
    hands: Vec<Vec<Card>>,
    deck: Vec<Card>,
    /// Played cards, top card last. Never empty.
    discard: Vec<Card>,
    current_color: UnoColor,
    direction: i32,
    current: usize,
    phase: UnoPhase,
    winner: Option<usize>,
    rng: Xoshiro256PlusPlus,
}

impl UnoState {
    /// Shuffles a fresh deck, deals seven cards to each of `num_players` (2-4)
    /// and turns up the first number card.
    pub fn new(num_players: usize, seed: Option<u64>) -> Self {
        let num_players = num_players.clamp(2, 4);
        let mut rng = seeded_rng(seed);
        let mut deck = full_deck();
        deck.shuffle(&mut rng);

        let mut hands = vec![Vec::with_capacity(HAND_SIZE); num_players];
        for _ in 0..HAND_SIZE {
            for hand in hands.iter_mut() {
                if let Some(card) = deck.pop() {
                    hand.push(card);
                }
            }
        }

        // Action and wild cards turned up before the first number card stay under it.
        let mut discard = Vec::new();
        let mut current_color = UnoColor::Red;
        while let Some(card) = deck.pop() {
            discard.push(card);
            if let Card::Number(color, _) = card {
                current_color = color;
                break;
            }
        }

        Self {
            hands,
            deck,
            discard,
            current_color,
            direction: 1,
            current: 0,
            phase: UnoPhase::Playing,
            winner: None,
            rng,
        }
    }

    /// Sets up an exact position: given hands, draw pile (drawn from the end) and top card.
    /// Seat 0 moves first, in the clockwise direction. Missing seats, up to two,
    /// get empty hands.
    pub fn from_parts(mut hands: Vec<Vec<Card>>, deck: Vec<Card>, top: Card, current_color: UnoColor, seed: Option<u64>) -> Self {
        hands.resize_with(hands.len().max(2), Vec::new);
        Self {
            hands,
            deck,
            discard: vec![top],
            current_color,
            direction: 1,
            current: 0,
            phase: UnoPhase::Playing,
            winner: None,
            rng: seeded_rng(seed),
        }
    }

    pub fn hand(&self, player: i32) -> &[Card] {
        usize::try_from(player - 1)
            .ok()
            .and_then(|seat| self.hands.get(seat))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn top_card(&self) -> Option<Card> {
        self.discard.last().copied()
    }

    pub fn current_color(&self) -> UnoColor {
        self.current_color
    }

    pub fn direction(&self) -> i32 {
        self.direction
    }

    pub fn phase(&self) -> UnoPhase {
        self.phase
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    /// Cards across hands, draw pile and discard pile.
    pub fn total_cards(&self) -> usize {
        self.hands.iter().map(Vec::len).sum::<usize>() + self.deck.len() + self.discard.len()
    }

    fn is_playable(&self, card: Card) -> bool {
        match self.top_card() {
            Some(top) => card.can_play_on(top, self.current_color),
            None => true,
        }
    }

    /// Playable cards in hand order, without duplicates.
    fn playable_cards(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = Vec::new();
        for &card in &self.hands[self.current] {
            if self.is_playable(card) && !cards.contains(&card) {
                cards.push(card);
            }
        }
        cards
    }

    fn seat_after(&self, steps: i32) -> usize {
        let n = self.hands.len() as i32;
        (self.current as i32 + self.direction * steps).rem_euclid(n) as usize
    }

    fn draw_cards(&mut self, seat: usize, count: usize) {
        for _ in 0..count {
            if self.deck.is_empty() {
                self.refill_deck();
            }
            match self.deck.pop() {
                Some(card) => self.hands[seat].push(card),
                None => {
                    log::debug!("uno: no cards left to draw for seat {}", seat + 1);
                    break;
                }
            }
        }
    }

    /// Shuffles every discarded card except the top one back into the deck.
    fn refill_deck(&mut self) {
        let Some(top) = self.discard.pop() else {
            return;
        };
        let mut reclaimed = std::mem::replace(&mut self.discard, vec![top]);
        reclaimed.shuffle(&mut self.rng);
        log::debug!("uno: reshuffled {} discarded cards into the deck", reclaimed.len());
        self.deck.append(&mut reclaimed);
    }

    /// Applies the effects of the card just played and passes the turn.
    fn resolve(&mut self, card: Card) {
        if self.hands[self.current].is_empty() {
            self.winner = Some(self.current);
            self.phase = UnoPhase::Finished;
            return;
        }
        self.phase = UnoPhase::Playing;

        let mut skip_next = false;
        match card {
            Card::Skip(_) => skip_next = true,
            Card::Reverse(_) => {
                self.direction = -self.direction;
                skip_next = self.hands.len() == 2;
            }
            Card::DrawTwo(_) => {
                let victim = self.seat_after(1);
                self.draw_cards(victim, 2);
                skip_next = true;
            }
            Card::WildDrawFour => {
                let victim = self.seat_after(1);
                self.draw_cards(victim, 4);
                skip_next = true;
            }
            Card::Number(..) | Card::Wild => {}
        }
        self.current = self.seat_after(if skip_next { 2 } else { 1 });
    }

    /// Most common color among the non-wild cards of the current hand.
    fn favorite_color(&self) -> UnoColor {
        let hand = &self.hands[self.current];
        UnoColor::ALL
            .into_iter()
            .max_by_key(|&color| hand.iter().filter(|c| c.color() == Some(color)).count())
            .unwrap_or(UnoColor::Red)
    }
}

impl GameState for UnoState {
    type Move = UnoMove;

    fn get_num_players(&self) -> i32 {
        self.hands.len() as i32
    }

    fn get_current_player(&self) -> i32 {
        self.current as i32 + 1
    }

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        match self.phase {
            UnoPhase::Finished => Vec::new(),
            UnoPhase::ColorSelection => UnoColor::ALL.into_iter().map(UnoMove::ChooseColor).collect(),
            UnoPhase::Playing => {
                let mut moves: Vec<UnoMove> = self.playable_cards().into_iter().map(UnoMove::Play).collect();
                moves.push(UnoMove::Draw);
                moves
            }
        }
    }

    fn make_move(&mut self, mv: &Self::Move) {
        match *mv {
            UnoMove::Play(card) => {
                let hand = &mut self.hands[self.current];
                let Some(index) = hand.iter().position(|&c| c == card) else {
                    return;
                };
                hand.remove(index);
                self.discard.push(card);
                match card.color() {
                    Some(color) => {
                        self.current_color = color;
                        self.resolve(card);
                    }
                    None if self.hands[self.current].is_empty() => self.resolve(card),
                    None => self.phase = UnoPhase::ColorSelection,
                }
            }
            UnoMove::ChooseColor(color) => {
                self.current_color = color;
                if let Some(card) = self.top_card() {
                    self.resolve(card);
                }
            }
            UnoMove::Draw => {
                self.draw_cards(self.current, 1);
                self.current = self.seat_after(1);
            }
        }
    }

    fn get_winner(&self) -> Option<Outcome> {
        self.winner.map(|seat| Outcome::Win(seat as i32 + 1))
    }

    /// Action card, then a color match, then a wild, then anything playable, else draw.
    fn bot_move<R: Rng + ?Sized>(&self, _rng: &mut R) -> Option<Self::Move> {
        match self.phase {
            UnoPhase::Finished => None,
            UnoPhase::ColorSelection => Some(UnoMove::ChooseColor(self.favorite_color())),
            UnoPhase::Playing => {
                let playable = self.playable_cards();
                let choice = playable
                    .iter()
                    .find(|c| c.is_action())
                    .or_else(|| playable.iter().find(|c| c.color() == Some(self.current_color)))
                    .or_else(|| playable.iter().find(|c| c.is_wild()))
                    .or_else(|| playable.first());
                Some(choice.map_or(UnoMove::Draw, |&card| UnoMove::Play(card)))
            }
        }
    }
}

impl fmt::Display for UnoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.top_card() {
            Some(top) => writeln!(f, "Top card: {} (color: {})", top, self.current_color)?,
            None => writeln!(f, "Top card: none (color: {})", self.current_color)?,
        }
        writeln!(f, "Deck: {} cards", self.deck.len())?;
        for (seat, hand) in self.hands.iter().enumerate() {
            let marker = if seat == self.current { '>' } else { ' ' };
            let cards: Vec<String> = hand.iter().map(Card::to_string).collect();
            writeln!(f, "{} Player {} ({}): {}", marker, seat + 1, hand.len(), cards.join(", "))?;
        }
        if self.phase == UnoPhase::ColorSelection {
            writeln!(f, "Choose a color: red, blue, green, yellow")?;
        }
        Ok(())
    }
}
