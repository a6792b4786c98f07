use crate::model::card::Card;
use crate::model::stack::ConsistencyChecks;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GameState {
    /// The dealer opens with the last card dealt.
    DealerFirstMove,
    /// The current player starts a turn; the previous turn is complete.
    PlayerTurnStarted,
    /// The current player extends a same-rank run within the same turn.
    PlayerTurnContinued,
    /// Terminal. Scoring hooks in here.
    RoundEnded,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GameState::DealerFirstMove => "dealer first move",
            GameState::PlayerTurnStarted => "player turn started",
            GameState::PlayerTurnContinued => "player turn continued",
            GameState::RoundEnded => "round ended",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RoundEndReason {
    BridgeDeclared,
    HandEmptied,
    /// The drawing stack ran out and the active stack had nothing below its
    /// top run to give back.
    DeckExhausted,
}

/// Where the round stopped. Scores are not touched by the engine; a host
/// settles them from this record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundOutcome {
    pub reason: RoundEndReason,
    pub player: usize,
    pub points_ratio: u32,
}

/// What happened to a player who passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The drawn card is playable; the player keeps the turn.
    Playable(Card),
    /// The player still has to cover their own six and must pass again.
    MustDrawAgain(Card),
    /// The turn moved to the next player.
    TurnPassed(Card),
    RoundEnded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    pub consistency: ConsistencyChecks,
}

impl GameOptions {
    pub const fn strict() -> Self {
        Self {
            consistency: ConsistencyChecks::Strict,
        }
    }
}
