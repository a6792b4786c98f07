//! Fixed parameters of the Bridge rule set.

use crate::model::rank::Rank;
use crate::model::suit::Suit;

pub const DECK_SIZE: usize = Rank::ORDERED.len() * Suit::COUNT;

pub const CARDS_PER_PLAYER: usize = 5;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 5;

/// Always playable, regardless of the suit on top.
pub const TRUMP_RANK: Rank = Rank::Jack;

/// Ending a turn with this rank names the suit the next player must follow.
pub const SUIT_REQUESTING_RANK: Rank = TRUMP_RANK;

/// Playing this rank keeps the turn with the same player: it must be covered.
pub const FREE_MOVE_RANK: Rank = Rank::Six;

/// Same-rank cards needed on top of the active stack to declare a bridge.
pub const BRIDGE_LENGTH: usize = Suit::COUNT;

/// Cards the victim draws for each rank-triggered penalty.
pub const SEVEN_PENALTY: usize = 1;
pub const EIGHT_PENALTY: usize = 2;
pub const QUEEN_OF_SPADES_PENALTY: usize = 5;

pub const INITIAL_POINTS_RATIO: u32 = 1;
