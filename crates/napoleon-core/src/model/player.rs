use crate::model::hand::Hand;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Seat {
    First = 0,
    Second = 1,
    Third = 2,
    Fourth = 3,
}

impl Seat {
    pub const LOOP: [Seat; 4] = [Seat::First, Seat::Second, Seat::Third, Seat::Fourth];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Seat::First),
            1 => Some(Seat::Second),
            2 => Some(Seat::Third),
            3 => Some(Seat::Fourth),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Seating position as shown at the table, 1 through 4.
    pub const fn number(self) -> u8 {
        self as u8 + 1
    }

    pub const fn next(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::Third,
            Seat::Third => Seat::Fourth,
            Seat::Fourth => Seat::First,
        }
    }

    pub const fn previous(self) -> Seat {
        match self {
            Seat::First => Seat::Fourth,
            Seat::Second => Seat::First,
            Seat::Third => Seat::Second,
            Seat::Fourth => Seat::Third,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seat {}", self.number())
    }
}

/// Opaque player identifier supplied by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub hand: Hand,
    pub is_napoleon: bool,
    pub is_adjutant: bool,
    pub seat: Seat,
    pub is_ai: bool,
    /// Running total across finished games.
    #[serde(default)]
    pub score: i32,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, seat: Seat, is_ai: bool) -> Self {
        Self {
            id: PlayerId::new(id),
            name: name.into(),
            hand: Hand::new(),
            is_napoleon: false,
            is_adjutant: false,
            seat,
            is_ai,
            score: 0,
        }
    }

    pub fn human(id: impl Into<String>, name: impl Into<String>, seat: Seat) -> Self {
        Self::new(id, name, seat, false)
    }

    pub fn ai(id: impl Into<String>, name: impl Into<String>, seat: Seat) -> Self {
        Self::new(id, name, seat, true)
    }

    /// Drops the cards and per-game role flags.
    pub fn clear_for_deal(&mut self) {
        self.hand.clear();
        self.is_napoleon = false;
        self.is_adjutant = false;
    }
}
