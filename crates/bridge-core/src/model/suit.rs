use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Suit {
    Spades = 0,
    Clubs = 1,
    Diamonds = 2,
    Hearts = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Clubs, Suit::Diamonds, Suit::Hearts];

    pub const COUNT: usize = Suit::ALL.len();

    /// Accepts both the ASCII letter and the suit symbol.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" | "s" | "♠" => Some(Suit::Spades),
            "C" | "c" | "♣" => Some(Suit::Clubs),
            "D" | "d" | "♦" => Some(Suit::Diamonds),
            "H" | "h" | "♥" => Some(Suit::Hearts),
            _ => None,
        }
    }

    pub const fn letter(self) -> &'static str {
        match self {
            Suit::Spades => "S",
            Suit::Clubs => "C",
            Suit::Diamonds => "D",
            Suit::Hearts => "H",
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Suit::Spades => "♠",
            Suit::Clubs => "♣",
            Suit::Diamonds => "♦",
            Suit::Hearts => "♥",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}
