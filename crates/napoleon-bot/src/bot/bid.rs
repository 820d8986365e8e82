use napoleon_core::game::view::PlayerView;
use napoleon_core::model::card::Card;
use napoleon_core::model::declaration::{MAX_TARGET, MIN_TARGET};
use napoleon_core::model::rank::Rank;
use napoleon_core::model::suit::Suit;
use napoleon_core::rules::SpecialCard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidDecision {
    Pass,
    Declare { target: u8, trump: Suit },
}

/// Hand-strength bidder. Estimates how many counting cards the hand can win with each
/// suit as trump, then bids the cheapest legal target it believes it can make.
pub struct BidPlanner;

impl BidPlanner {
    pub fn choose(view: &PlayerView) -> BidDecision {
        let minimum = view
            .standing_bid
            .map(|bid| bid.target + 1)
            .unwrap_or(MIN_TARGET);
        if minimum > MAX_TARGET {
            return BidDecision::Pass;
        }

        let (trump, estimate) = Self::best_trump(&view.hand);
        if estimate >= minimum {
            BidDecision::Declare {
                target: minimum,
                trump,
            }
        } else {
            BidDecision::Pass
        }
    }

    /// Best trump suit for the hand and the faces it is expected to win. Ties keep the
    /// earlier suit in display order.
    pub fn best_trump(hand: &[Card]) -> (Suit, u8) {
        let mut best = (Suit::Spades, 0u8);
        for trump in Suit::ALL {
            let estimate = Self::estimate_faces(hand, trump);
            if estimate > best.1 {
                best = (trump, estimate);
            }
        }
        best
    }

    pub fn estimate_faces(hand: &[Card], trump: Suit) -> u8 {
        let mut points = 0.0f32;
        for card in hand {
            points += match SpecialCard::classify(*card, trump) {
                Some(SpecialCard::Mighty) => 3.0,
                Some(SpecialCard::TrumpJack) => 2.5,
                Some(SpecialCard::ReverseJack) => 2.0,
                None if card.suit == trump => match card.rank {
                    Rank::Ace => 2.0,
                    Rank::King => 1.5,
                    Rank::Queen => 1.0,
                    _ => 0.6,
                },
                None => match card.rank {
                    Rank::Ace => 1.2,
                    Rank::King => 0.5,
                    _ => 0.0,
                },
            };
        }
        // The adjutant and the hidden cards are worth a few faces on average.
        let estimate = 3.0 + points * 0.8;
        estimate.floor().clamp(0.0, MAX_TARGET as f32) as u8
    }
}
