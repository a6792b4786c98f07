pub mod card;
pub mod hand;
pub mod moves;
pub mod player;
pub mod rank;
pub mod rules;
pub mod stack;
pub mod suit;
