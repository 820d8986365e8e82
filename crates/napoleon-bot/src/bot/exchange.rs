use super::{card_sort_key, count_cards_in_suit};
use napoleon_core::game::view::PlayerView;
use napoleon_core::model::card::Card;
use napoleon_core::model::deck::HIDDEN_CARD_COUNT;
use napoleon_core::model::rank::Rank;
use napoleon_core::model::suit::Suit;
use napoleon_core::rules::SpecialCard;
use std::cmp::Ordering;

/// Picks the Napoleon's four discards from hand plus hidden cards.
pub struct ExchangePlanner;

impl ExchangePlanner {
    pub fn choose(view: &PlayerView) -> Option<[Card; 4]> {
        let trump = view.trump()?;
        let hidden = view.hidden_cards.as_ref()?;
        let mut pool: Vec<Card> = view.hand.clone();
        pool.extend_from_slice(hidden);
        Self::choose_from(&pool, trump, view.adjutant_card())
    }

    pub fn choose_from(
        pool: &[Card],
        trump: Suit,
        adjutant_card: Option<Card>,
    ) -> Option<[Card; 4]> {
        if pool.len() < HIDDEN_CARD_COUNT {
            return None;
        }
        let mut scored: Vec<(Card, i32)> = pool
            .iter()
            .map(|card| (*card, keep_value(*card, pool, trump, adjutant_card)))
            .collect();
        scored.sort_by(|(card_a, score_a), (card_b, score_b)| match score_a.cmp(score_b) {
            Ordering::Equal => card_sort_key(*card_a).cmp(&card_sort_key(*card_b)),
            other => other,
        });
        Some([scored[0].0, scored[1].0, scored[2].0, scored[3].0])
    }
}

/// Higher means more worth keeping.
fn keep_value(card: Card, pool: &[Card], trump: Suit, adjutant_card: Option<Card>) -> i32 {
    if Some(card) == adjutant_card {
        return 1_000;
    }
    if let Some(special) = SpecialCard::classify(card, trump) {
        return match special {
            SpecialCard::Mighty => 900,
            SpecialCard::TrumpJack => 890,
            SpecialCard::ReverseJack => 880,
        };
    }
    if card.suit == trump {
        return 200 + card.value() as i32;
    }
    let mut value = match card.rank {
        Rank::Ace => 120,
        Rank::King => 60,
        _ => card.value() as i32,
    };
    // Discarding faces throws away points the Napoleon needs.
    if card.is_counting() {
        value += 30;
    }
    // Short side suits are cheap to void entirely.
    let length = count_cards_in_suit(pool, card.suit) as i32;
    value += length * 2;
    value
}

#[cfg(test)]
mod tests {
    use super::ExchangePlanner;
    use napoleon_core::model::card::Card;
    use napoleon_core::model::rank::Rank;
    use napoleon_core::model::suit::Suit;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn discards_low_side_cards_and_keeps_power() {
        let pool = vec![
            card(Rank::Ace, Suit::Spades),
            card(Rank::Jack, Suit::Hearts),
            card(Rank::Jack, Suit::Diamonds),
            card(Rank::Three, Suit::Hearts),
            card(Rank::King, Suit::Hearts),
            card(Rank::Ace, Suit::Clubs),
            card(Rank::Three, Suit::Clubs),
            card(Rank::Four, Suit::Clubs),
            card(Rank::Five, Suit::Diamonds),
            card(Rank::Six, Suit::Spades),
            card(Rank::Ten, Suit::Diamonds),
            card(Rank::Two, Suit::Spades),
            card(Rank::Nine, Suit::Hearts),
            card(Rank::Eight, Suit::Hearts),
            card(Rank::Queen, Suit::Hearts),
            card(Rank::Seven, Suit::Spades),
        ];
        let discards = ExchangePlanner::choose_from(&pool, Suit::Hearts, None).unwrap();
        for kept in [
            card(Rank::Ace, Suit::Spades),
            card(Rank::Jack, Suit::Hearts),
            card(Rank::Jack, Suit::Diamonds),
            card(Rank::Ace, Suit::Clubs),
        ] {
            assert!(!discards.contains(&kept));
        }
        assert!(discards.iter().all(|card| card.suit != Suit::Hearts));
        assert!(discards.iter().all(|card| !card.is_counting()));
        assert!(discards.contains(&card(Rank::Two, Suit::Spades)));
    }

    #[test]
    fn never_discards_the_adjutant_card() {
        let pool: Vec<Card> = [Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six]
            .into_iter()
            .map(|rank| card(rank, Suit::Clubs))
            .collect();
        let adjutant = card(Rank::Two, Suit::Clubs);
        let discards = ExchangePlanner::choose_from(&pool, Suit::Hearts, Some(adjutant)).unwrap();
        assert!(!discards.contains(&adjutant));
    }
}
