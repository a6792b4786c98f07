use super::state::{GameState, RoundOutcome};
use super::table::Game;
use crate::model::card::Card;
use crate::model::moves::PlayerMove;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSnapshot {
    pub name: String,
    pub score: i64,
    pub cards: Vec<Card>,
}

/// Everything an observer can see of a table, in serializable form.
/// Stacks are listed bottom to top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub state: GameState,
    pub players: Vec<PlayerSnapshot>,
    pub dealer_index: usize,
    pub current_player_index: usize,
    pub drawing_stack: Vec<Card>,
    pub active_stack: Vec<Card>,
    pub legal_cards: Vec<Card>,
    pub points_ratio: u32,
    pub required_first_card: Option<Card>,
    pub moves: Vec<PlayerMove>,
    pub outcome: Option<RoundOutcome>,
}

impl GameSnapshot {
    pub fn capture<R>(game: &Game<R>) -> Self {
        GameSnapshot {
            state: game.state(),
            players: game
                .players()
                .iter()
                .map(|player| PlayerSnapshot {
                    name: player.name().to_string(),
                    score: player.score(),
                    cards: player.hand().iter().copied().collect(),
                })
                .collect(),
            dealer_index: game.dealer_index(),
            current_player_index: game.current_player_index(),
            drawing_stack: game.drawing_stack().cards().to_vec(),
            active_stack: game.active_stack().cards().to_vec(),
            legal_cards: game.legal_cards().iter().copied().collect(),
            points_ratio: game.points_ratio(),
            required_first_card: game.required_first_card(),
            moves: game.history().to_vec(),
            outcome: game.outcome(),
        }
    }

    pub fn to_json<R>(game: &Game<R>) -> serde_json::Result<String> {
        let snapshot = Self::capture(game);
        serde_json::to_string_pretty(&snapshot)
    }
}
