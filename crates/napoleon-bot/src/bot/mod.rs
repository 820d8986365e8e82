mod bid;
mod evaluator;
mod exchange;
mod play;
mod tracker;

pub use bid::{BidDecision, BidPlanner};
pub use evaluator::{CardScore, evaluate_card_breakdown, evaluate_card_strategic_value};
pub use exchange::ExchangePlanner;
pub use play::PlayPlanner;
pub use tracker::UnseenTracker;

use napoleon_core::model::card::Card;
use napoleon_core::model::suit::Suit;
use napoleon_core::rules::card_power;
use std::sync::OnceLock;

pub const DIFFICULTY_ENV: &str = "NAPOLEON_AI_DIFFICULTY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn from_env() -> Self {
        static CACHED: OnceLock<Difficulty> = OnceLock::new();
        *CACHED.get_or_init(|| Self::from_reader(|key| std::env::var(key).ok()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    /// Lenient parse used for env overrides; unknown values fall back to the default.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" | "heuristic" => Difficulty::Easy,
            "normal" | "default" | "hybrid" => Difficulty::Normal,
            "hard" | "expert" => Difficulty::Hard,
            _ => Difficulty::default(),
        }
    }

    fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        read(DIFFICULTY_ENV)
            .map(|raw| Self::parse_lenient(&raw))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

/// Absolute strength of a card once trump is known, ignoring the led suit.
pub(crate) fn card_strength(card: Card, trump: Suit) -> i32 {
    card_power(card, trump, card.suit) as i32
}

pub(crate) fn count_cards_in_suit(cards: &[Card], suit: Suit) -> usize {
    cards.iter().filter(|card| card.suit == suit).count()
}

pub(crate) fn card_sort_key(card: Card) -> (usize, u8) {
    (card.suit.index(), card.value())
}
