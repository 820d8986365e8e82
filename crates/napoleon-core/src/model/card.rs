use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub const MIGHTY: Card = Card::new(Rank::Ace, Suit::Spades);

    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { suit, rank }
    }

    /// Stable identifier in the `{suit}-{rank}` form, e.g. `spades-A`.
    pub fn id(self) -> String {
        format!("{}-{}", self.suit.as_str(), self.rank.symbol())
    }

    pub const fn value(self) -> u8 {
        self.rank.value()
    }

    pub const fn is_mighty(self) -> bool {
        matches!(self.rank, Rank::Ace) && matches!(self.suit, Suit::Spades)
    }

    pub const fn is_counting(self) -> bool {
        self.rank.is_counting()
    }

    pub fn short(self) -> String {
        format!("{}{}", self.rank.symbol(), self.suit.symbol())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.suit.as_str(), self.rank.symbol())
    }
}

impl FromStr for Card {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (suit, rank) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("card id '{s}' must look like 'suit-rank'"))?;
        Ok(Card::new(rank.parse()?, suit.parse()?))
    }
}
