use crate::model::card::Card;
use crate::model::rank::Rank;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HandError {
    #[error("card {0} is already in hand")]
    AlreadyHeld(Card),
    #[error("card {0} is not in hand")]
    NotHeld(Card),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: BTreeSet<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self {
            cards: BTreeSet::new(),
        }
    }

    pub fn with_cards<I>(cards: I) -> Result<Self, HandError>
    where
        I: IntoIterator<Item = Card>,
    {
        let mut hand = Self::new();
        for card in cards {
            hand.add(card)?;
        }
        Ok(hand)
    }

    pub fn add(&mut self, card: Card) -> Result<(), HandError> {
        if self.cards.insert(card) {
            Ok(())
        } else {
            Err(HandError::AlreadyHeld(card))
        }
    }

    pub fn remove(&mut self, card: Card) -> Result<(), HandError> {
        if self.cards.remove(&card) {
            Ok(())
        } else {
            Err(HandError::NotHeld(card))
        }
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn count_rank(&self, rank: Rank) -> usize {
        self.cards.iter().filter(|card| card.rank == rank).count()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards ordered by rank, then suit.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn drain(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.cards).into_iter().collect()
    }
}
