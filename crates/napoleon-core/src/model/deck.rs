use crate::error::GameError;
use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::player::Player;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

pub const HIDDEN_CARD_COUNT: usize = 4;
pub const HAND_SIZE: usize = 12;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// The full 52-card deck, one card per suit and rank.
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }

    /// The 48 cards left once every two is removed.
    pub fn game_deck() -> Self {
        let cards = Self::standard()
            .cards
            .into_iter()
            .filter(|card| card.rank != Rank::Two)
            .collect();
        Self { cards }
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            cards: shuffle_deck(Self::standard().cards(), rng),
        }
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Returns a uniformly shuffled copy; the input slice is left untouched.
pub fn shuffle_deck<R: rand::Rng + ?Sized>(cards: &[Card], rng: &mut R) -> Vec<Card> {
    let mut shuffled = cards.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

/// Deterministic split of an ordered deck into hidden cards and four hands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    pub hidden: Vec<Card>,
    pub hands: [Vec<Card>; 4],
}

impl Deal {
    /// The first four cards are set aside, the remaining 48 go out in 12-card blocks by seat.
    pub fn partition(deck: &Deck) -> Self {
        let cards = deck.cards();
        let hidden = cards.iter().take(HIDDEN_CARD_COUNT).copied().collect();
        let mut hands: [Vec<Card>; 4] = Default::default();
        for (index, hand) in hands.iter_mut().enumerate() {
            let start = HIDDEN_CARD_COUNT + index * HAND_SIZE;
            *hand = cards
                .iter()
                .skip(start)
                .take(HAND_SIZE)
                .copied()
                .collect();
        }
        Self { hidden, hands }
    }
}

/// Shuffles a fresh deck and hands twelve cards to each of exactly four players.
/// Returns the four hidden cards.
pub fn deal_cards<R: rand::Rng + ?Sized>(
    players: &mut [Player],
    rng: &mut R,
) -> Result<Vec<Card>, GameError> {
    if players.len() != 4 {
        return Err(GameError::InvalidPlayerCount {
            found: players.len(),
        });
    }
    let deal = Deal::partition(&Deck::shuffled(rng));
    for (player, cards) in players.iter_mut().zip(deal.hands) {
        player.hand = Hand::with_cards(cards);
    }
    Ok(deal.hidden)
}

#[cfg(test)]
mod tests {
    use super::{Deal, Deck, deal_cards, shuffle_deck};
    use crate::error::GameError;
    use crate::model::player::{Player, Seat};
    use crate::model::rank::Rank;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn players(count: usize) -> Vec<Player> {
        (0..count)
            .map(|i| {
                Player::ai(
                    format!("p{i}"),
                    format!("Player {i}"),
                    Seat::from_index(i % 4).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn standard_deck_has_52_unique_cards() {
        let deck = Deck::standard();
        assert_eq!(deck.len(), 52);
        let ids: HashSet<_> = deck.cards().iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), 52);
    }

    #[test]
    fn game_deck_drops_twos() {
        let deck = Deck::game_deck();
        assert_eq!(deck.len(), 48);
        assert!(deck.cards().iter().all(|c| c.rank != Rank::Two));
    }

    #[test]
    fn shuffle_preserves_membership_and_leaves_input_alone() {
        let deck = Deck::standard();
        let mut rng = StdRng::seed_from_u64(7);
        let shuffled = shuffle_deck(deck.cards(), &mut rng);
        assert_eq!(shuffled.len(), deck.len());
        assert_ne!(shuffled.as_slice(), deck.cards());
        assert_eq!(deck.cards(), Deck::standard().cards());
        let before: HashSet<_> = deck.cards().iter().copied().collect();
        let after: HashSet<_> = shuffled.iter().copied().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn shuffle_handles_short_inputs() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(shuffle_deck(&[], &mut rng).is_empty());
        let one = [Deck::standard().cards()[0]];
        assert_eq!(shuffle_deck(&one, &mut rng), one.to_vec());
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        assert_eq!(
            Deck::shuffled_with_seed(42).cards(),
            Deck::shuffled_with_seed(42).cards()
        );
        assert_ne!(
            Deck::shuffled_with_seed(1).cards(),
            Deck::shuffled_with_seed(2).cards()
        );
    }

    #[test]
    fn partition_is_contiguous_by_seat() {
        let deck = Deck::standard();
        let deal = Deal::partition(&deck);
        assert_eq!(deal.hidden, deck.cards()[..4].to_vec());
        assert_eq!(deal.hands[0], deck.cards()[4..16].to_vec());
        assert_eq!(deal.hands[3], deck.cards()[40..52].to_vec());
    }

    #[test]
    fn dealing_covers_the_whole_deck() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut table = players(4);
            let hidden = deal_cards(&mut table, &mut rng).unwrap();
            assert_eq!(hidden.len(), 4);
            let mut seen = HashSet::new();
            for player in &table {
                assert_eq!(player.hand.len(), 12);
                for card in player.hand.iter() {
                    assert!(seen.insert(*card));
                }
            }
            for card in hidden {
                assert!(seen.insert(card));
            }
            assert_eq!(seen.len(), 52);
        }
    }

    #[test]
    fn dealing_rejects_wrong_player_counts() {
        let mut rng = StdRng::seed_from_u64(3);
        for count in [0, 3, 5] {
            let mut table = players(count);
            assert_eq!(
                deal_cards(&mut table, &mut rng),
                Err(GameError::InvalidPlayerCount { found: count })
            );
        }
    }
}
