use crate::model::card::Card;
use crate::model::player::Seat;
use crate::model::suit::Suit;
use crate::rules::{trick_winner_index, winning_card_index};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    id: u8,
    leader: Seat,
    plays: Vec<PlayedCard>,
    winner: Option<Seat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedCard {
    pub card: Card,
    pub seat: Seat,
    pub order: u8,
    /// Set when this play exposed the adjutant.
    #[serde(default)]
    pub reveals_adjutant: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrickError {
    #[error("trick already complete")]
    TrickComplete,
    #[error("expected {expected} to play next but got {actual}")]
    OutOfTurn { expected: Seat, actual: Seat },
    #[error("{0} has already played this trick")]
    AlreadyPlayed(Seat),
}

impl Trick {
    pub fn new(id: u8, leader: Seat) -> Self {
        Self {
            id,
            leader,
            plays: Vec::with_capacity(4),
            winner: None,
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn leader(&self) -> Seat {
        self.leader
    }

    pub fn plays(&self) -> &[PlayedCard] {
        &self.plays
    }

    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.plays.iter().map(|play| play.card)
    }

    pub fn is_full(&self) -> bool {
        self.plays.len() == 4
    }

    /// True once the winner has been resolved.
    pub fn is_completed(&self) -> bool {
        self.winner.is_some()
    }

    pub fn winner(&self) -> Option<Seat> {
        self.winner
    }

    pub fn leading_suit(&self) -> Option<Suit> {
        self.plays.first().map(|play| play.card.suit)
    }

    pub fn has_played(&self, seat: Seat) -> bool {
        self.plays.iter().any(|play| play.seat == seat)
    }

    pub fn expected_seat(&self) -> Seat {
        self.plays
            .last()
            .map(|play| play.seat.next())
            .unwrap_or(self.leader)
    }

    pub fn play(
        &mut self,
        seat: Seat,
        card: Card,
        reveals_adjutant: bool,
    ) -> Result<(), TrickError> {
        if self.is_full() {
            return Err(TrickError::TrickComplete);
        }
        if self.has_played(seat) {
            return Err(TrickError::AlreadyPlayed(seat));
        }
        let expected = self.expected_seat();
        if expected != seat {
            return Err(TrickError::OutOfTurn {
                expected,
                actual: seat,
            });
        }
        self.plays.push(PlayedCard {
            card,
            seat,
            order: self.plays.len() as u8,
            reveals_adjutant,
        });
        Ok(())
    }

    /// Seat currently holding the trick, if any card has been played.
    pub fn current_winner(&self, trump: Suit) -> Option<Seat> {
        let cards: Vec<Card> = self.cards().collect();
        winning_card_index(&cards, trump).map(|index| self.plays[index].seat)
    }

    /// Resolves the winner of a full trick. Returns `None` while cards are missing.
    pub fn complete(&mut self, trump: Suit) -> Option<Seat> {
        if let Some(winner) = self.winner {
            return Some(winner);
        }
        let cards: Vec<Card> = self.cards().collect();
        let index = trick_winner_index(&cards, trump)?;
        let winner = self.plays[index].seat;
        self.winner = Some(winner);
        Some(winner)
    }

    pub fn counting_cards(&self) -> u8 {
        self.plays.iter().filter(|play| play.card.is_counting()).count() as u8
    }

    pub fn card_of(&self, seat: Seat) -> Option<Card> {
        self.plays
            .iter()
            .find(|play| play.seat == seat)
            .map(|play| play.card)
    }
}

#[cfg(test)]
mod tests {
    use super::{Trick, TrickError};
    use crate::model::card::Card;
    use crate::model::player::Seat;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn plays_follow_turn_order() {
        let mut trick = Trick::new(0, Seat::First);
        assert!(
            trick
                .play(Seat::First, Card::new(Rank::Two, Suit::Clubs), false)
                .is_ok()
        );
        assert!(matches!(
            trick.play(Seat::Third, Card::new(Rank::Three, Suit::Clubs), false),
            Err(TrickError::OutOfTurn { .. })
        ));
        assert_eq!(
            trick.play(Seat::First, Card::new(Rank::Four, Suit::Clubs), false),
            Err(TrickError::AlreadyPlayed(Seat::First))
        );
    }

    #[test]
    fn winner_is_set_only_when_completed() {
        let mut trick = Trick::new(3, Seat::Third);
        trick
            .play(Seat::Third, Card::new(Rank::Ten, Suit::Clubs), false)
            .unwrap();
        trick
            .play(Seat::Fourth, Card::new(Rank::Queen, Suit::Clubs), false)
            .unwrap();
        assert_eq!(trick.complete(Suit::Hearts), None);
        assert!(!trick.is_completed());
        assert_eq!(trick.current_winner(Suit::Hearts), Some(Seat::Fourth));

        trick
            .play(Seat::First, Card::new(Rank::Four, Suit::Hearts), false)
            .unwrap();
        trick
            .play(Seat::Second, Card::new(Rank::Ace, Suit::Clubs), false)
            .unwrap();

        assert_eq!(trick.complete(Suit::Hearts), Some(Seat::First));
        assert!(trick.is_completed());
        assert_eq!(trick.counting_cards(), 3);
        let orders: Vec<u8> = trick.plays().iter().map(|p| p.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }

    #[test]
    fn full_trick_rejects_more_cards() {
        let mut trick = Trick::new(0, Seat::First);
        for (seat, rank) in Seat::LOOP.iter().zip([Rank::Two, Rank::Three, Rank::Four, Rank::Five])
        {
            trick.play(*seat, Card::new(rank, Suit::Diamonds), false).unwrap();
        }
        assert_eq!(
            trick.play(Seat::First, Card::new(Rank::Six, Suit::Diamonds), false),
            Err(TrickError::TrickComplete)
        );
    }
}
