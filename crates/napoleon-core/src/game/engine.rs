//! Value-in, value-out transitions for callers that persist each `GameState` they receive.
//!
//! Each function clones the input, applies one action and returns the new state. On error
//! the caller still holds the untouched original.

use crate::error::GameError;
use crate::game::state::{BiddingOutcome, GameState, PlayOutcome};
use crate::model::card::Card;
use crate::model::player::{PlayerId, Seat};
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

/// A card decision bound to the exact state it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiMove {
    pub game_id: String,
    pub version: u64,
    pub player_id: PlayerId,
    pub seat: Seat,
    pub card: Card,
}

impl AiMove {
    pub fn for_state(state: &GameState, seat: Seat, card: Card) -> Self {
        Self {
            game_id: state.id().to_string(),
            version: state.version(),
            player_id: state.player(seat).id.clone(),
            seat,
            card,
        }
    }

    pub fn is_current(&self, state: &GameState) -> bool {
        self.game_id == state.id() && self.version == state.version()
    }
}

pub fn deal<R: rand::Rng + ?Sized>(state: &GameState, rng: &mut R) -> Result<GameState, GameError> {
    let mut next = state.clone();
    next.deal(rng)?;
    Ok(next)
}

pub fn declare(
    state: &GameState,
    player_id: &str,
    target: u8,
    trump: Suit,
) -> Result<(GameState, BiddingOutcome), GameError> {
    let mut next = state.clone();
    let outcome = next.declare(player_id, target, trump)?;
    Ok((next, outcome))
}

pub fn pass(state: &GameState, player_id: &str) -> Result<(GameState, BiddingOutcome), GameError> {
    let mut next = state.clone();
    let outcome = next.pass(player_id)?;
    Ok((next, outcome))
}

pub fn resolve_adjutant(state: &GameState) -> Result<(GameState, Option<Card>), GameError> {
    let mut next = state.clone();
    let card = next.resolve_adjutant()?;
    Ok((next, card))
}

pub fn exchange(
    state: &GameState,
    player_id: &str,
    discards: &[Card],
) -> Result<GameState, GameError> {
    let mut next = state.clone();
    next.exchange(player_id, discards)?;
    Ok(next)
}

pub fn play_card(
    state: &GameState,
    player_id: &str,
    card: Card,
) -> Result<(GameState, PlayOutcome), GameError> {
    let mut next = state.clone();
    let outcome = next.play_card(player_id, card)?;
    Ok((next, outcome))
}

pub fn continue_after_trick(state: &GameState) -> Result<GameState, GameError> {
    let mut next = state.clone();
    next.continue_after_trick()?;
    Ok(next)
}

/// Applies an AI decision only if the state has not moved on since it was computed.
pub fn apply_ai_move(
    state: &GameState,
    ai_move: &AiMove,
) -> Result<(GameState, PlayOutcome), GameError> {
    if !ai_move.is_current(state) {
        event!(
            target: "napoleon::engine",
            Level::DEBUG,
            game = state.id(),
            decided_at = ai_move.version,
            current = state.version(),
            "discarding stale AI move"
        );
        return Err(GameError::StaleDecision);
    }
    play_card(state, ai_move.player_id.as_str(), ai_move.card)
}

#[cfg(test)]
mod tests {
    use super::{AiMove, apply_ai_move, play_card};
    use crate::error::{GameError, IllegalPlayReason};
    use crate::game::fixtures::playing_game;

    #[test]
    fn failed_action_leaves_the_input_untouched() {
        let state = playing_game(13);
        let napoleon = state.napoleon_seat().unwrap();
        let other = napoleon.next();
        let card = state.hand(other).cards()[0];
        let err = play_card(&state, state.player(other).id.as_str(), card).unwrap_err();
        assert!(matches!(
            err,
            GameError::IllegalPlay(IllegalPlayReason::OutOfTurn { .. })
        ));
        assert_eq!(state.hand(other).len(), 12);
    }

    #[test]
    fn stale_ai_move_is_rejected() {
        let state = playing_game(17);
        let napoleon = state.napoleon_seat().unwrap();
        let card = state.legal_plays_for(napoleon)[0];
        let decision = AiMove::for_state(&state, napoleon, card);

        let (advanced, _) = apply_ai_move(&state, &decision).unwrap();
        assert_eq!(advanced.version(), state.version() + 1);
        assert_eq!(
            apply_ai_move(&advanced, &decision),
            Err(GameError::StaleDecision)
        );
    }
}
