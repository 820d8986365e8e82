use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use crate::rules::special::{reverse_jack, trump_jack};

/// Card the Napoleon names to identify the adjutant.
///
/// Priority: Mighty, the trump Jack, the reverse Jack, then the first Ace (in suit display
/// order, never spades) the hand does not hold. `None` means every candidate is already in
/// the hand and the Napoleon plays alone.
pub fn select_adjutant_card(hand: &[Card], trump: Suit) -> Option<Card> {
    let specials = [Card::MIGHTY, trump_jack(trump), reverse_jack(trump)];
    let aces = Suit::ALL
        .iter()
        .copied()
        .filter(|suit| *suit != Suit::Spades)
        .map(|suit| Card::new(Rank::Ace, suit));
    specials
        .into_iter()
        .chain(aces)
        .find(|candidate| !hand.contains(candidate))
}
