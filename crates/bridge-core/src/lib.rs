#![deny(warnings)]
pub mod game;
pub mod model;
pub mod random;

pub use game::error::{GameError, InternalError};
pub use game::snapshot::GameSnapshot;
pub use game::state::{GameOptions, GameState, PassOutcome, RoundEndReason, RoundOutcome};
pub use game::table::Game;
pub use model::card::Card;
pub use model::moves::{Move, MoveError, PlayerMove};
pub use model::rank::Rank;
pub use model::suit::Suit;
pub use random::{RandomIndexSource, RngIndexSource};

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "bridge125"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
