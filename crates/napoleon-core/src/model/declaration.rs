use crate::error::DeclarationError;
use crate::model::card::Card;
use crate::model::player::Seat;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};

pub const MIN_TARGET: u8 = 11;
/// Bidding ceiling: all twenty counting cards.
pub const MAX_TARGET: u8 = 20;

/// A standing bid during the Napoleon phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub seat: Seat,
    pub target: u8,
    pub trump: Suit,
}

impl Bid {
    pub fn validate(target: u8, standing: Option<&Bid>) -> Result<(), DeclarationError> {
        if !(MIN_TARGET..=MAX_TARGET).contains(&target) {
            return Err(DeclarationError::TargetOutOfRange {
                target,
                min: MIN_TARGET,
                max: MAX_TARGET,
            });
        }
        if let Some(standing) = standing {
            if target <= standing.target {
                return Err(DeclarationError::NotHigherThanStanding {
                    target,
                    standing: standing.target,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NapoleonDeclaration {
    pub napoleon: Seat,
    pub target: u8,
    pub trump: Suit,
    pub adjutant_card: Option<Card>,
}

impl From<Bid> for NapoleonDeclaration {
    fn from(bid: Bid) -> Self {
        Self {
            napoleon: bid.seat,
            target: bid.target,
            trump: bid.trump,
            adjutant_card: None,
        }
    }
}

/// Who, if anyone, fights alongside the Napoleon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "seat", rename_all = "snake_case")]
pub enum AdjutantRole {
    Ally(Seat),
    /// The Napoleon holds the named card, usually picked up from the hidden cards.
    SelfAdjutant,
    Alone,
}

impl AdjutantRole {
    pub fn ally(self) -> Option<Seat> {
        match self {
            AdjutantRole::Ally(seat) => Some(seat),
            _ => None,
        }
    }
}
