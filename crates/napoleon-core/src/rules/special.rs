use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpecialCard {
    Mighty,
    TrumpJack,
    ReverseJack,
}

impl SpecialCard {
    pub fn classify(card: Card, trump: Suit) -> Option<Self> {
        if card.is_mighty() {
            Some(SpecialCard::Mighty)
        } else if card == trump_jack(trump) {
            Some(SpecialCard::TrumpJack)
        } else if card == reverse_jack(trump) {
            Some(SpecialCard::ReverseJack)
        } else {
            None
        }
    }
}

pub fn is_mighty(card: Card) -> bool {
    card.is_mighty()
}

pub fn reverse_suit(trump: Suit) -> Suit {
    trump.reverse()
}

pub fn trump_jack(trump: Suit) -> Card {
    Card::new(Rank::Jack, trump)
}

pub fn reverse_jack(trump: Suit) -> Card {
    Card::new(Rank::Jack, trump.reverse())
}

/// Trick-taking strength of `card` for a trick led in `lead`.
///
/// Mighty > trump Jack > reverse Jack > other trumps > led suit by rank. Cards that are
/// neither trump nor of the led suit have no power and can never win.
pub fn card_power(card: Card, trump: Suit, lead: Suit) -> u8 {
    match SpecialCard::classify(card, trump) {
        Some(SpecialCard::Mighty) => 100,
        Some(SpecialCard::TrumpJack) => 99,
        Some(SpecialCard::ReverseJack) => 98,
        None if card.suit == trump => 50 + card.value(),
        None if card.suit == lead => card.value(),
        None => 0,
    }
}
