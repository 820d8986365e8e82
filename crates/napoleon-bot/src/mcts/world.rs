//! Fully observable playout state for one determinization.

use napoleon_core::game::state::TOTAL_TRICKS;
use napoleon_core::model::card::Card;
use napoleon_core::model::player::Seat;
use napoleon_core::model::suit::Suit;
use napoleon_core::rules::{legal_plays, winning_card_index};

/// Weight of the won/lost outcome against the share of faces captured.
const OUTCOME_WEIGHT: f64 = 0.75;
const TOTAL_FACES: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    pub hands: [Vec<Card>; 4],
    pub trump: Suit,
    pub napoleon: Seat,
    /// Partner seat in this world; `None` when the Napoleon has no separate ally.
    pub adjutant: Option<Seat>,
    pub target: u8,
    pub trick: Vec<(Seat, Card)>,
    pub to_move: Seat,
    pub faces: [u8; 4],
    pub tricks_played: usize,
}

impl World {
    pub fn is_terminal(&self) -> bool {
        self.tricks_played >= TOTAL_TRICKS || self.hands.iter().all(Vec::is_empty)
    }

    pub fn leading_suit(&self) -> Option<Suit> {
        self.trick.first().map(|(_, card)| card.suit)
    }

    pub fn legal_moves(&self) -> Vec<Card> {
        legal_plays(&self.hands[self.to_move.index()], self.leading_suit())
    }

    /// Plays `card` for the seat to move. The caller guarantees legality.
    pub fn apply(&mut self, card: Card) {
        let seat = self.to_move;
        self.hands[seat.index()].retain(|held| *held != card);
        self.trick.push((seat, card));
        if self.trick.len() < 4 {
            self.to_move = seat.next();
            return;
        }
        let cards: Vec<Card> = self.trick.iter().map(|(_, card)| *card).collect();
        let winner = winning_card_index(&cards, self.trump)
            .map(|index| self.trick[index].0)
            .unwrap_or(seat);
        let faces = cards.iter().filter(|card| card.is_counting()).count() as u8;
        self.faces[winner.index()] += faces;
        self.trick.clear();
        self.tricks_played += 1;
        self.to_move = winner;
    }

    pub fn is_napoleon_side(&self, seat: Seat) -> bool {
        seat == self.napoleon || Some(seat) == self.adjutant
    }

    pub fn napoleon_side_faces(&self) -> u8 {
        Seat::LOOP
            .into_iter()
            .filter(|seat| self.is_napoleon_side(*seat))
            .map(|seat| self.faces[seat.index()])
            .sum()
    }

    /// Per-seat reward in `[0, 1]` for a finished playout.
    pub fn rewards(&self) -> [f64; 4] {
        let side = self.napoleon_side_faces();
        let captured: u8 = self.faces.iter().sum();
        let napoleon_won = side >= self.target;
        let mut rewards = [0.0; 4];
        for seat in Seat::LOOP {
            let (won, share) = if self.is_napoleon_side(seat) {
                (napoleon_won, side as f64 / TOTAL_FACES)
            } else {
                (!napoleon_won, (captured - side) as f64 / TOTAL_FACES)
            };
            let outcome = if won { 1.0 } else { 0.0 };
            rewards[seat.index()] = OUTCOME_WEIGHT * outcome + (1.0 - OUTCOME_WEIGHT) * share;
        }
        rewards
    }
}

#[cfg(test)]
mod tests {
    use super::World;
    use napoleon_core::model::card::Card;
    use napoleon_core::model::player::Seat;
    use napoleon_core::model::rank::Rank;
    use napoleon_core::model::suit::Suit;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    fn one_trick_world() -> World {
        World {
            hands: [
                vec![card(Rank::Ace, Suit::Hearts)],
                vec![card(Rank::King, Suit::Hearts)],
                vec![card(Rank::Two, Suit::Spades)],
                vec![card(Rank::Queen, Suit::Hearts)],
            ],
            trump: Suit::Spades,
            napoleon: Seat::First,
            adjutant: Some(Seat::Third),
            target: 3,
            trick: Vec::new(),
            to_move: Seat::First,
            faces: [0; 4],
            tricks_played: 11,
        }
    }

    #[test]
    fn trump_ruff_takes_the_faces() {
        let mut world = one_trick_world();
        for _ in 0..4 {
            let mv = world.legal_moves()[0];
            world.apply(mv);
        }
        assert!(world.is_terminal());
        assert_eq!(world.faces, [0, 0, 3, 0]);
        assert_eq!(world.to_move, Seat::Third);
        assert_eq!(world.napoleon_side_faces(), 3);
    }

    #[test]
    fn rewards_favor_the_side_that_made_its_target() {
        let mut world = one_trick_world();
        for _ in 0..4 {
            let mv = world.legal_moves()[0];
            world.apply(mv);
        }
        let rewards = world.rewards();
        assert!(rewards[Seat::First.index()] > rewards[Seat::Second.index()]);
        assert_eq!(rewards[Seat::First.index()], rewards[Seat::Third.index()]);
    }
}
