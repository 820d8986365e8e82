use crate::model::card::Card;
use crate::model::suit::Suit;
use crate::rules::special::card_power;

/// Index of the winning card among `cards` in play order. The first card sets the led suit.
pub fn winning_card_index(cards: &[Card], trump: Suit) -> Option<usize> {
    let lead = cards.first()?.suit;
    cards
        .iter()
        .enumerate()
        .max_by_key(|(_, card)| card_power(**card, trump, lead))
        .map(|(index, _)| index)
}

/// Same as [`winning_card_index`] for a completed trick of exactly four cards.
pub fn trick_winner_index(cards: &[Card], trump: Suit) -> Option<usize> {
    if cards.len() != 4 {
        return None;
    }
    winning_card_index(cards, trump)
}

#[cfg(test)]
mod tests {
    use super::{trick_winner_index, winning_card_index};
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn c(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn mighty_wins_regardless_of_lead() {
        let cards = [
            c(Rank::King, Suit::Hearts),
            c(Rank::Jack, Suit::Diamonds),
            Card::MIGHTY,
            c(Rank::Jack, Suit::Hearts),
        ];
        assert_eq!(trick_winner_index(&cards, Suit::Diamonds), Some(2));
        assert_eq!(trick_winner_index(&cards, Suit::Hearts), Some(2));
    }

    #[test]
    fn trump_jack_beats_other_trumps() {
        let cards = [
            c(Rank::Ace, Suit::Clubs),
            c(Rank::Ace, Suit::Hearts),
            c(Rank::Jack, Suit::Hearts),
            c(Rank::Jack, Suit::Diamonds),
        ];
        assert_eq!(trick_winner_index(&cards, Suit::Hearts), Some(2));
    }

    #[test]
    fn reverse_jack_beats_plain_trumps() {
        let cards = [
            c(Rank::Ace, Suit::Diamonds),
            c(Rank::Ace, Suit::Spades.reverse()),
            c(Rank::Jack, Suit::Spades.reverse()),
            c(Rank::King, Suit::Spades),
        ];
        assert_eq!(trick_winner_index(&cards, Suit::Spades), Some(2));
    }

    #[test]
    fn highest_trump_wins_without_specials() {
        let cards = [
            c(Rank::Ace, Suit::Clubs),
            c(Rank::Three, Suit::Spades),
            c(Rank::Nine, Suit::Spades),
            c(Rank::King, Suit::Clubs),
        ];
        assert_eq!(trick_winner_index(&cards, Suit::Spades), Some(2));
    }

    #[test]
    fn highest_led_card_wins_without_trumps() {
        let cards = [
            c(Rank::Ten, Suit::Clubs),
            c(Rank::Queen, Suit::Clubs),
            c(Rank::Ace, Suit::Diamonds),
            c(Rank::Four, Suit::Clubs),
        ];
        assert_eq!(trick_winner_index(&cards, Suit::Hearts), Some(1));
    }

    #[test]
    fn partial_tricks_report_current_leader_only_via_winning_card_index() {
        let cards = [c(Rank::Ten, Suit::Clubs), c(Rank::Two, Suit::Hearts)];
        assert_eq!(winning_card_index(&cards, Suit::Hearts), Some(1));
        assert_eq!(trick_winner_index(&cards, Suit::Hearts), None);
        assert_eq!(winning_card_index(&[], Suit::Hearts), None);
    }
}
