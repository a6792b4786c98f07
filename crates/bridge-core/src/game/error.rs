use crate::model::card::Card;
use crate::model::hand::HandError;
use crate::model::moves::Move;
use crate::model::rank::Rank;
use crate::model::stack::StackError;
use thiserror::Error;

/// Everything `Game` can refuse. All variants except `Internal` and
/// `Poisoned` leave the game untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("the number of players must be between {min} and {max} (was {count})")]
    InvalidPlayerCount { count: usize, min: usize, max: usize },

    #[error("the name of player {0} is empty or blank")]
    InvalidPlayerName(usize),

    #[error("{card} cannot be played now (legal cards: {})", format_cards(.legal))]
    IllegalMove { card: Card, legal: Vec<Card> },

    #[error("a bridge cannot be declared with {0}")]
    IllegalBridge(Move),

    #[error("player {player} does not have {card} in hand")]
    CardNotInHand { player: usize, card: Card },

    #[error("player {player} has no further {rank} to continue the turn with")]
    CannotContinueTurn { player: usize, rank: Rank },

    #[error("player {0} cannot pass now")]
    PassNotAllowed(usize),

    #[error("the round has ended")]
    RoundEnded,

    #[error("the round is still in progress")]
    RoundInProgress,

    #[error("internal error: {0}")]
    Internal(#[from] InternalError),

    #[error("the game was stopped by an earlier internal error")]
    Poisoned,
}

impl GameError {
    pub fn is_internal(&self) -> bool {
        matches!(self, GameError::Internal(_) | GameError::Poisoned)
    }
}

/// Engine defects. Never caused by player input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error(transparent)]
    Stack(#[from] StackError),
    #[error(transparent)]
    Hand(#[from] HandError),
    #[error("{0}")]
    Invariant(String),
}

impl From<StackError> for GameError {
    fn from(err: StackError) -> Self {
        GameError::Internal(InternalError::Stack(err))
    }
}

impl From<HandError> for GameError {
    fn from(err: HandError) -> Self {
        GameError::Internal(InternalError::Hand(err))
    }
}

pub(crate) fn invariant(message: impl Into<String>) -> GameError {
    GameError::Internal(InternalError::Invariant(message.into()))
}

fn format_cards(cards: &[Card]) -> String {
    if cards.is_empty() {
        return "none".to_string();
    }
    cards
        .iter()
        .map(Card::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
