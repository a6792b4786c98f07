use crate::model::card::Card;
use crate::model::hand::{Hand, HandError};
use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    name: String,
    hand: Hand,
    score: i64,
}

impl Player {
    /// Callers validate the name; the game rejects blank names before
    /// constructing any player.
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            hand: Hand::new(),
            score: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub(crate) fn append_card(&mut self, card: Card) -> Result<(), HandError> {
        self.hand.add(card)
    }

    pub(crate) fn remove_card(&mut self, card: Card) -> Result<(), HandError> {
        self.hand.remove(card)
    }

    pub(crate) fn take_all_cards(&mut self) -> Vec<Card> {
        self.hand.drain()
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (score {}, {} cards)",
            self.name,
            self.score,
            self.hand.len()
        )
    }
}

/// Index of the seat after `index` at a table of `count` players.
pub const fn next_seat(index: usize, count: usize) -> usize {
    (index + 1) % count
}
