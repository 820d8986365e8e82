use napoleon_core::game::view::PlayerView;
use napoleon_core::model::card::Card;
use napoleon_core::model::deck::Deck;
use napoleon_core::model::player::Seat;
use napoleon_core::model::suit::Suit;
use std::collections::HashSet;

/// Cards a seat has not yet seen, plus suit voids revealed by failures to follow.
#[derive(Debug, Clone, Default)]
pub struct UnseenTracker {
    unseen: HashSet<Card>,
    voids: [[bool; 4]; 4],
}

impl UnseenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_view(view: &PlayerView) -> Self {
        let mut tracker = Self::new();
        tracker.reset_for_view(view);
        tracker
    }

    pub fn reset_for_view(&mut self, view: &PlayerView) {
        self.unseen = Deck::standard().cards().iter().copied().collect();
        self.voids = [[false; 4]; 4];
        for card in &view.hand {
            self.unseen.remove(card);
        }
        for card in view.exchanged_cards.iter().flatten() {
            self.unseen.remove(card);
        }
        for trick in view.history.iter().chain(view.current_trick.as_ref()) {
            let Some(lead) = trick.leading_suit() else {
                continue;
            };
            for play in trick.plays() {
                self.unseen.remove(&play.card);
                if play.card.suit != lead {
                    self.voids[play.seat.index()][lead.index()] = true;
                }
            }
        }
    }

    pub fn is_unseen(&self, card: Card) -> bool {
        self.unseen.contains(&card)
    }

    pub fn unseen_count(&self) -> usize {
        self.unseen.len()
    }

    /// Unseen cards in deck order.
    pub fn unseen_cards(&self) -> Vec<Card> {
        Deck::standard()
            .cards()
            .iter()
            .copied()
            .filter(|card| self.unseen.contains(card))
            .collect()
    }

    pub fn is_void(&self, seat: Seat, suit: Suit) -> bool {
        self.voids[seat.index()][suit.index()]
    }

    pub fn void_matrix(&self) -> [[bool; 4]; 4] {
        self.voids
    }

    /// True when no unseen card of `card`'s suit outranks it.
    pub fn is_master(&self, card: Card) -> bool {
        !self
            .unseen
            .iter()
            .any(|other| other.suit == card.suit && other.value() > card.value())
    }
}
