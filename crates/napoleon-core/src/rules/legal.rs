use crate::error::IllegalPlayReason;
use crate::model::card::Card;
use crate::model::suit::Suit;

/// Cards a player may play. With no led suit every card is legal; otherwise the led suit
/// must be followed when held. There is no obligation to trump.
pub fn legal_plays(hand: &[Card], leading_suit: Option<Suit>) -> Vec<Card> {
    match leading_suit {
        Some(lead) if hand.iter().any(|card| card.suit == lead) => hand
            .iter()
            .copied()
            .filter(|card| card.suit == lead)
            .collect(),
        _ => hand.to_vec(),
    }
}

pub fn check_play(
    hand: &[Card],
    leading_suit: Option<Suit>,
    card: Card,
) -> Result<(), IllegalPlayReason> {
    if !hand.contains(&card) {
        return Err(IllegalPlayReason::CardNotInHand(card));
    }
    if let Some(lead) = leading_suit {
        if card.suit != lead && hand.iter().any(|held| held.suit == lead) {
            return Err(IllegalPlayReason::MustFollowSuit(lead));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_play, legal_plays};
    use crate::error::IllegalPlayReason;
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn hand() -> Vec<Card> {
        vec![
            Card::MIGHTY,
            Card::new(Rank::Four, Suit::Hearts),
            Card::new(Rank::Nine, Suit::Hearts),
            Card::new(Rank::Queen, Suit::Clubs),
        ]
    }

    #[test]
    fn leading_is_unrestricted() {
        assert_eq!(legal_plays(&hand(), None), hand());
    }

    #[test]
    fn must_follow_when_holding_led_suit() {
        let legal = legal_plays(&hand(), Some(Suit::Hearts));
        assert_eq!(
            legal,
            vec![
                Card::new(Rank::Four, Suit::Hearts),
                Card::new(Rank::Nine, Suit::Hearts)
            ]
        );
        assert_eq!(
            check_play(&hand(), Some(Suit::Hearts), Card::MIGHTY),
            Err(IllegalPlayReason::MustFollowSuit(Suit::Hearts))
        );
    }

    #[test]
    fn void_players_may_play_anything() {
        assert_eq!(legal_plays(&hand(), Some(Suit::Diamonds)), hand());
        assert!(check_play(&hand(), Some(Suit::Diamonds), Card::MIGHTY).is_ok());
    }

    #[test]
    fn cards_outside_the_hand_are_rejected() {
        let missing = Card::new(Rank::Ace, Suit::Diamonds);
        assert_eq!(
            check_play(&hand(), None, missing),
            Err(IllegalPlayReason::CardNotInHand(missing))
        );
    }
}
