use crate::game::state::{GameState, PhaseKind};
use crate::model::card::Card;
use crate::model::declaration::{AdjutantRole, Bid};
use crate::model::player::Seat;
use crate::model::suit::Suit;
use crate::model::trick::Trick;
use crate::rules::legal_plays;
use serde::{Deserialize, Serialize};

/// What a seat knows about its own allegiance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerRole {
    /// No Napoleon has been declared yet.
    Undecided,
    Napoleon,
    Adjutant,
    Alliance,
}

/// The declaration as a given seat may see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleDeclaration {
    pub napoleon: Seat,
    pub target: u8,
    pub trump: Suit,
    /// `None` when this seat is not entitled to know the card yet.
    pub adjutant_card: Option<Card>,
}

/// Public projection of a `GameState` for one seat.
///
/// Opponents' hands, the hidden cards and the discards are stripped unless the seat is
/// entitled to them. AI evaluators only ever receive this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub game_id: String,
    pub version: u64,
    pub seat: Seat,
    pub phase: PhaseKind,
    pub role: ViewerRole,
    pub hand: Vec<Card>,
    pub hand_sizes: [usize; 4],
    pub declaration: Option<VisibleDeclaration>,
    /// Seat publicly exposed as adjutant by playing the named card.
    pub revealed_adjutant: Option<Seat>,
    pub hidden_cards: Option<Vec<Card>>,
    pub exchanged_cards: Option<Vec<Card>>,
    pub passed: Vec<Seat>,
    pub standing_bid: Option<Bid>,
    pub current_seat: Option<Seat>,
    pub current_trick: Option<Trick>,
    pub history: Vec<Trick>,
    pub showing_trick_result: bool,
    pub scores: [i32; 4],
}

impl PlayerView {
    pub fn project(state: &GameState, seat: Seat) -> Self {
        let phase = state.phase_kind();
        let hand = state.hand(seat).cards().to_vec();
        let napoleon = state.napoleon_seat();
        let is_napoleon = napoleon == Some(seat);
        let adjutant_card = state
            .napoleon_declaration()
            .and_then(|declaration| declaration.adjutant_card);
        let holds_adjutant_card = adjutant_card.is_some_and(|card| hand.contains(&card));

        let revealed_adjutant = state
            .trick_history()
            .iter()
            .chain(state.current_trick())
            .flat_map(|trick| trick.plays().iter())
            .find(|play| play.reveals_adjutant)
            .map(|play| play.seat);

        let role = match napoleon {
            None => ViewerRole::Undecided,
            Some(_) if is_napoleon => ViewerRole::Napoleon,
            Some(_) if holds_adjutant_card || revealed_adjutant == Some(seat) => {
                ViewerRole::Adjutant
            }
            Some(_) => ViewerRole::Alliance,
        };

        let card_visible = is_napoleon
            || holds_adjutant_card
            || revealed_adjutant.is_some()
            || phase == PhaseKind::Finished;
        let declaration = state
            .napoleon_declaration()
            .map(|declaration| VisibleDeclaration {
                napoleon: declaration.napoleon,
                target: declaration.target,
                trump: declaration.trump,
                adjutant_card: declaration.adjutant_card.filter(|_| card_visible),
            });

        let hidden_cards = match phase {
            PhaseKind::Exchange if is_napoleon => state.hidden_cards().map(<[Card]>::to_vec),
            _ => None,
        };
        let exchanged_cards = if is_napoleon && !state.exchanged_cards().is_empty() {
            Some(state.exchanged_cards().to_vec())
        } else {
            None
        };

        let players = state.players();
        Self {
            game_id: state.id().to_string(),
            version: state.version(),
            seat,
            phase,
            role,
            hand,
            hand_sizes: [0, 1, 2, 3].map(|index| players[index].hand.len()),
            declaration,
            revealed_adjutant,
            hidden_cards,
            exchanged_cards,
            passed: state.passed_players().to_vec(),
            standing_bid: state.standing_bid().copied(),
            current_seat: state.current_seat(),
            current_trick: state.current_trick().cloned(),
            history: state.trick_history().to_vec(),
            showing_trick_result: state.showing_trick_result(),
            scores: [0, 1, 2, 3].map(|index| players[index].score),
        }
    }

    pub fn trump(&self) -> Option<Suit> {
        self.declaration.map(|declaration| declaration.trump)
    }

    pub fn napoleon(&self) -> Option<Seat> {
        self.declaration.map(|declaration| declaration.napoleon)
    }

    pub fn adjutant_card(&self) -> Option<Card> {
        self.declaration
            .and_then(|declaration| declaration.adjutant_card)
    }

    pub fn leading_suit(&self) -> Option<Suit> {
        self.current_trick.as_ref().and_then(Trick::leading_suit)
    }

    pub fn legal_plays(&self) -> Vec<Card> {
        if self.phase != PhaseKind::Playing {
            return Vec::new();
        }
        legal_plays(&self.hand, self.leading_suit())
    }

    pub fn tricks_completed(&self) -> usize {
        self.history.len()
    }

    /// Cards already on the table this game, including the trick in progress.
    pub fn played_cards(&self) -> Vec<Card> {
        self.history
            .iter()
            .chain(self.current_trick.as_ref())
            .flat_map(|trick| trick.cards())
            .collect()
    }

    /// Seats this viewer can be certain share its side.
    pub fn known_partners(&self) -> Vec<Seat> {
        let Some(napoleon) = self.napoleon() else {
            return Vec::new();
        };
        match self.role {
            ViewerRole::Undecided => Vec::new(),
            ViewerRole::Napoleon => self
                .revealed_adjutant
                .filter(|seat| *seat != self.seat)
                .into_iter()
                .collect(),
            ViewerRole::Adjutant => vec![napoleon],
            ViewerRole::Alliance => Seat::LOOP
                .into_iter()
                .filter(|seat| {
                    *seat != self.seat && *seat != napoleon && Some(*seat) != self.revealed_adjutant
                })
                .filter(|_| self.revealed_adjutant.is_some())
                .collect(),
        }
    }

    /// Whether this viewer plays on the Napoleon's side.
    pub fn on_napoleon_side(&self) -> bool {
        matches!(self.role, ViewerRole::Napoleon | ViewerRole::Adjutant)
    }
}

/// Full-information role lookup, for scoring and tooling that may see everything.
pub fn full_role(state: &GameState, seat: Seat) -> ViewerRole {
    match (state.napoleon_seat(), state.adjutant_role()) {
        (None, _) => ViewerRole::Undecided,
        (Some(napoleon), _) if napoleon == seat => ViewerRole::Napoleon,
        (Some(_), Some(AdjutantRole::Ally(ally))) if ally == seat => ViewerRole::Adjutant,
        _ => ViewerRole::Alliance,
    }
}

#[cfg(test)]
mod tests {
    use super::{ViewerRole, full_role};
    use crate::game::fixtures::{playing_game, seat_holding};
    use crate::game::state::PhaseKind;
    use crate::model::player::Seat;

    #[test]
    fn opponents_hands_are_reduced_to_counts() {
        let game = playing_game(7);
        let view = game.view_for(Seat::Second);
        assert_eq!(view.hand, game.hand(Seat::Second).cards());
        assert_eq!(view.hand_sizes, [12, 12, 12, 12]);
        assert_eq!(view.phase, PhaseKind::Playing);
        assert!(view.hidden_cards.is_none());
    }

    #[test]
    fn exchanged_cards_only_reach_the_napoleon() {
        let game = playing_game(11);
        let napoleon = game.napoleon_seat().unwrap();
        assert_eq!(
            game.view_for(napoleon).exchanged_cards.as_deref(),
            Some(game.exchanged_cards())
        );
        for seat in Seat::LOOP.into_iter().filter(|seat| *seat != napoleon) {
            assert!(game.view_for(seat).exchanged_cards.is_none());
        }
    }

    #[test]
    fn adjutant_card_is_hidden_from_the_alliance_until_played() {
        let game = playing_game(3);
        let napoleon = game.napoleon_seat().unwrap();
        let card = game.napoleon_declaration().unwrap().adjutant_card.unwrap();
        let holder = seat_holding(&game, card);

        assert_eq!(game.view_for(napoleon).adjutant_card(), Some(card));
        if let Some(holder) = holder {
            let view = game.view_for(holder);
            assert_eq!(view.adjutant_card(), Some(card));
            if holder != napoleon {
                assert_eq!(view.role, ViewerRole::Adjutant);
                assert_eq!(view.known_partners(), vec![napoleon]);
            }
        }
        for seat in Seat::LOOP {
            if seat == napoleon || Some(seat) == holder {
                continue;
            }
            let view = game.view_for(seat);
            assert_eq!(view.adjutant_card(), None);
            assert_eq!(view.role, ViewerRole::Alliance);
            assert!(view.known_partners().is_empty());
        }
    }

    #[test]
    fn full_role_sees_through_the_secret() {
        let game = playing_game(5);
        let napoleon = game.napoleon_seat().unwrap();
        assert_eq!(full_role(&game, napoleon), ViewerRole::Napoleon);
        if let Some(ally) = game.adjutant_role().and_then(|role| role.ally()) {
            assert_eq!(full_role(&game, ally), ViewerRole::Adjutant);
        }
    }
}
