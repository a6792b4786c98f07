use crate::model::card::Card;
use crate::random::{RandomError, RandomIndexSource};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// How thoroughly a [`CardStack`] re-validates itself around each mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyChecks {
    /// Compare the sequence length against the uniqueness set.
    Basic,
    /// Additionally look up every card of the sequence in the set.
    Strict,
}

impl ConsistencyChecks {
    pub const fn is_strict(self) -> bool {
        matches!(self, ConsistencyChecks::Strict)
    }
}

impl Default for ConsistencyChecks {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            ConsistencyChecks::Strict
        } else {
            ConsistencyChecks::Basic
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("the card stack is empty")]
    Empty,
    #[error("the card stack cannot be refilled since it is not empty")]
    NotEmpty,
    #[error("duplicate card {0}")]
    DuplicateCard(Card),
    #[error("inconsistent card stack: {0}")]
    Inconsistent(String),
    #[error(transparent)]
    Random(#[from] RandomError),
}

/// Ordered cards with set-like uniqueness; the last element is the top.
#[derive(Debug, Clone)]
pub struct CardStack {
    cards: Vec<Card>,
    unique: HashSet<Card>,
    checks: ConsistencyChecks,
}

impl CardStack {
    pub fn new<I>(cards: I) -> Result<Self, StackError>
    where
        I: IntoIterator<Item = Card>,
    {
        Self::with_checks(cards, ConsistencyChecks::default())
    }

    pub fn with_checks<I>(cards: I, checks: ConsistencyChecks) -> Result<Self, StackError>
    where
        I: IntoIterator<Item = Card>,
    {
        let cards: Vec<Card> = cards.into_iter().collect();
        let unique = unique_set(&cards)?;
        let stack = Self {
            cards,
            unique,
            checks,
        };
        stack.ensure_consistency()?;
        Ok(stack)
    }

    pub fn empty(checks: ConsistencyChecks) -> Self {
        Self {
            cards: Vec::new(),
            unique: HashSet::new(),
            checks,
        }
    }

    pub fn full_deck(checks: ConsistencyChecks) -> Self {
        Self {
            cards: Card::ALL.to_vec(),
            unique: Card::ALL.iter().copied().collect(),
            checks,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn top(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    pub fn contains(&self, card: Card) -> bool {
        self.unique.contains(&card)
    }

    pub fn checks(&self) -> ConsistencyChecks {
        self.checks
    }

    /// Length of the run of cards at the top sharing the top card's rank.
    pub fn top_run_len(&self) -> usize {
        match self.top() {
            Some(top) => self
                .cards
                .iter()
                .rev()
                .take_while(|card| card.rank == top.rank)
                .count(),
            None => 0,
        }
    }

    pub fn withdraw_top_card(&mut self) -> Result<Card, StackError> {
        self.ensure_consistency()?;

        let card = self.cards.pop().ok_or(StackError::Empty)?;
        self.unique.remove(&card);

        self.ensure_consistency()?;
        Ok(card)
    }

    pub fn withdraw_all_cards(&mut self) -> Result<Vec<Card>, StackError> {
        self.ensure_consistency()?;

        let cards = std::mem::take(&mut self.cards);
        self.unique.clear();

        self.ensure_consistency()?;
        Ok(cards)
    }

    /// Removes everything below the same-rank run at the top and returns it
    /// bottom first. Only the run stays in place.
    pub fn withdraw_all_except_top_run(&mut self) -> Result<Vec<Card>, StackError> {
        self.ensure_consistency()?;

        if self.cards.is_empty() {
            return Err(StackError::Empty);
        }

        let keep_from = self.cards.len() - self.top_run_len();
        let run = self.cards.split_off(keep_from);
        let below = std::mem::replace(&mut self.cards, run);
        for card in &below {
            self.unique.remove(card);
        }

        self.ensure_consistency()?;
        Ok(below)
    }

    pub fn deposit_on_top(&mut self, card: Card) -> Result<(), StackError> {
        self.ensure_consistency()?;

        if !self.unique.insert(card) {
            return Err(StackError::DuplicateCard(card));
        }
        self.cards.push(card);

        self.ensure_consistency()
    }

    pub fn refill(&mut self, cards: Vec<Card>) -> Result<(), StackError> {
        self.ensure_consistency()?;

        if !self.cards.is_empty() {
            return Err(StackError::NotEmpty);
        }

        self.unique = unique_set(&cards)?;
        self.cards = cards;

        self.ensure_consistency()
    }

    /// Rebuilds the stack by repeatedly moving a randomly chosen remaining
    /// card to the new sequence.
    pub fn shuffle<R>(&mut self, source: &mut R) -> Result<(), StackError>
    where
        R: RandomIndexSource + ?Sized,
    {
        let mut remaining = self.withdraw_all_cards()?;
        let mut shuffled = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let bound = remaining.len();
            let picked = source.next_index(bound).and_then(|index| {
                if index < bound {
                    Ok(index)
                } else {
                    Err(RandomError::OutOfRange { index, bound })
                }
            });
            let index = match picked {
                Ok(index) => index,
                Err(err) => {
                    self.restore_after_failed_shuffle(shuffled, remaining)?;
                    return Err(err.into());
                }
            };
            shuffled.push(remaining.remove(index));
        }

        self.refill(shuffled)
    }

    fn restore_after_failed_shuffle(
        &mut self,
        mut shuffled: Vec<Card>,
        remaining: Vec<Card>,
    ) -> Result<(), StackError> {
        shuffled.extend(remaining);
        self.refill(shuffled)
    }

    fn ensure_consistency(&self) -> Result<(), StackError> {
        if self.unique.len() != self.cards.len() {
            return Err(StackError::Inconsistent(format!(
                "unique cards: {}, cards: {}",
                self.unique.len(),
                self.cards.len()
            )));
        }

        if self.checks.is_strict() {
            if let Some(card) = self.cards.iter().find(|card| !self.unique.contains(card)) {
                return Err(StackError::Inconsistent(format!(
                    "card {card} is not found among the unique cards"
                )));
            }
        }

        Ok(())
    }
}

fn unique_set(cards: &[Card]) -> Result<HashSet<Card>, StackError> {
    let mut unique = HashSet::with_capacity(cards.len());
    for &card in cards {
        if !unique.insert(card) {
            return Err(StackError::DuplicateCard(card));
        }
    }
    Ok(unique)
}
