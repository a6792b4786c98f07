use crate::model::rank::Rank;
use crate::model::rules;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    /// The full deck, rank-major: 6♠ 6♣ 6♦ 6♥ 7♠ … A♥.
    pub const ALL: [Card; rules::DECK_SIZE] = build_deck();

    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub const fn is_trump(self) -> bool {
        self.rank as u8 == rules::TRUMP_RANK as u8
    }

    pub const fn is_queen_of_spades(self) -> bool {
        matches!(self.rank, Rank::Queen) && matches!(self.suit, Suit::Spades)
    }
}

const fn build_deck() -> [Card; rules::DECK_SIZE] {
    let mut cards = [Card::new(Rank::Six, Suit::Spades); rules::DECK_SIZE];
    let mut r = 0;
    while r < Rank::ORDERED.len() {
        let mut s = 0;
        while s < Suit::COUNT {
            cards[r * Suit::COUNT + s] = Card::new(Rank::ORDERED[r], Suit::ALL[s]);
            s += 1;
        }
        r += 1;
    }
    cards
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCardError {
    #[error("card code is empty")]
    Empty,
    #[error("unknown rank in card code {0:?}")]
    Rank(String),
    #[error("unknown suit in card code {0:?}")]
    Suit(String),
}

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        let (split, _) = code.char_indices().last().ok_or(ParseCardError::Empty)?;
        let (rank_code, suit_code) = code.split_at(split);
        let rank =
            Rank::from_code(rank_code).ok_or_else(|| ParseCardError::Rank(code.to_string()))?;
        let suit =
            Suit::from_code(suit_code).ok_or_else(|| ParseCardError::Suit(code.to_string()))?;
        Ok(Card::new(rank, suit))
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, ParseCardError, Rank, Suit};
    use std::collections::HashSet;

    #[test]
    fn full_deck_is_36_unique_cards() {
        let unique: HashSet<Card> = Card::ALL.iter().copied().collect();
        assert_eq!(Card::ALL.len(), 36);
        assert_eq!(unique.len(), 36);
    }

    #[test]
    fn full_deck_is_rank_major() {
        assert_eq!(Card::ALL[0], Card::new(Rank::Six, Suit::Spades));
        assert_eq!(Card::ALL[3], Card::new(Rank::Six, Suit::Hearts));
        assert_eq!(Card::ALL[4], Card::new(Rank::Seven, Suit::Spades));
        assert_eq!(Card::ALL[35], Card::new(Rank::Ace, Suit::Hearts));
    }

    #[test]
    fn jacks_are_trump() {
        assert!(Card::new(Rank::Jack, Suit::Diamonds).is_trump());
        assert!(!Card::new(Rank::Queen, Suit::Diamonds).is_trump());
    }

    #[test]
    fn queen_of_spades_identified() {
        assert!(Card::new(Rank::Queen, Suit::Spades).is_queen_of_spades());
        assert!(!Card::new(Rank::Queen, Suit::Clubs).is_queen_of_spades());
    }

    #[test]
    fn parses_letter_and_symbol_codes() {
        assert_eq!("QS".parse::<Card>(), Ok(Card::new(Rank::Queen, Suit::Spades)));
        assert_eq!("10♥".parse::<Card>(), Ok(Card::new(Rank::Ten, Suit::Hearts)));
        assert_eq!(" 6d ".parse::<Card>(), Ok(Card::new(Rank::Six, Suit::Diamonds)));
        assert_eq!(Card::new(Rank::Ten, Suit::Clubs).to_string(), "10C");
    }

    #[test]
    fn rejects_malformed_codes() {
        assert_eq!("".parse::<Card>(), Err(ParseCardError::Empty));
        assert!(matches!("2S".parse::<Card>(), Err(ParseCardError::Rank(_))));
        assert!(matches!("QX".parse::<Card>(), Err(ParseCardError::Suit(_))));
        assert!(matches!("S".parse::<Card>(), Err(ParseCardError::Rank(_))));
    }
}
