use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::rules;
use crate::model::suit::Suit;
use core::fmt;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("a move must play at least one card")]
    NoCards,
    #[error("all cards of a move must share one rank (expected {expected}, found {found})")]
    MixedRanks { expected: Rank, found: Card },
    #[error("card {0} is played twice in one move")]
    DuplicateCard(Card),
    #[error("a suit must be requested when a turn is completed with rank {0}")]
    MissingRequestedSuit(Rank),
    #[error("a suit cannot be requested with rank {0} unless it completes the turn")]
    UnexpectedRequestedSuit(Rank),
    #[error("a bridge can only be declared when the turn is completed")]
    BridgeWithoutTurnCompletion,
}

/// Cards a player lays down in one action, plus the declarations made
/// alongside them. Always well-formed; legality against the table is the
/// game's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Move {
    cards: Vec<Card>,
    requested_suit: Option<Suit>,
    is_bridge_declared: bool,
    is_turn_completed: bool,
}

impl Move {
    pub fn new(
        cards: Vec<Card>,
        requested_suit: Option<Suit>,
        is_bridge_declared: bool,
        is_turn_completed: bool,
    ) -> Result<Self, MoveError> {
        let first = *cards.first().ok_or(MoveError::NoCards)?;

        for (index, &card) in cards.iter().enumerate() {
            if card.rank != first.rank {
                return Err(MoveError::MixedRanks {
                    expected: first.rank,
                    found: card,
                });
            }
            if cards[..index].contains(&card) {
                return Err(MoveError::DuplicateCard(card));
            }
        }

        let requests_suit = is_turn_completed && first.rank == rules::SUIT_REQUESTING_RANK;
        match (requests_suit, requested_suit) {
            (true, None) => return Err(MoveError::MissingRequestedSuit(first.rank)),
            (false, Some(_)) => return Err(MoveError::UnexpectedRequestedSuit(first.rank)),
            _ => {}
        }

        if is_bridge_declared && !is_turn_completed {
            return Err(MoveError::BridgeWithoutTurnCompletion);
        }

        Ok(Self {
            cards,
            requested_suit,
            is_bridge_declared,
            is_turn_completed,
        })
    }

    /// A single card that completes the turn.
    pub fn single(card: Card) -> Result<Self, MoveError> {
        Self::new(vec![card], None, false, true)
    }

    /// A single suit-requesting card that completes the turn.
    pub fn with_request(card: Card, suit: Suit) -> Result<Self, MoveError> {
        Self::new(vec![card], Some(suit), false, true)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn first_card(&self) -> Card {
        self.cards[0]
    }

    pub fn last_card(&self) -> Card {
        self.cards[self.cards.len() - 1]
    }

    pub fn rank(&self) -> Rank {
        self.first_card().rank
    }

    pub fn requested_suit(&self) -> Option<Suit> {
        self.requested_suit
    }

    pub fn is_bridge_declared(&self) -> bool {
        self.is_bridge_declared
    }

    pub fn is_turn_completed(&self) -> bool {
        self.is_turn_completed
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, card) in self.cards.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{card}")?;
        }
        if let Some(suit) = self.requested_suit {
            write!(f, " request={suit}")?;
        }
        if !self.is_turn_completed {
            f.write_str(" continue")?;
        }
        if self.is_bridge_declared {
            f.write_str(" bridge")?;
        }
        Ok(())
    }
}

/// A committed move and the seat that made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerMove {
    pub player: usize,
    #[serde(rename = "move")]
    pub mv: Move,
}
