//! Samples complete worlds consistent with what one seat has observed.

use super::SearchError;
use super::world::World;
use crate::bot::UnseenTracker;
use napoleon_core::game::view::{PlayerView, ViewerRole};
use napoleon_core::model::card::Card;
use napoleon_core::model::deck::HIDDEN_CARD_COUNT;
use napoleon_core::model::player::Seat;
use rand::Rng;
use rand::seq::SliceRandom;

const MAX_ATTEMPTS: usize = 64;
/// Pseudo-slot for the Napoleon's unseen discards.
const DISCARD_SLOT: usize = 4;

/// Deals every unseen card to a seat (or the discard pile) so that hand sizes match and
/// no seat receives a suit it has shown to be void in.
pub fn sample_world<R: Rng + ?Sized>(view: &PlayerView, rng: &mut R) -> Result<World, SearchError> {
    let declaration = view.declaration.ok_or_else(|| SearchError::Sampling {
        reason: "no declaration in view".to_string(),
    })?;
    let tracker = UnseenTracker::from_view(view);
    let mut pool = tracker.unseen_cards();

    let mut capacity = [0usize; 5];
    for seat in Seat::LOOP {
        if seat != view.seat {
            capacity[seat.index()] = view.hand_sizes[seat.index()];
        }
    }
    if view.exchanged_cards.is_none() {
        capacity[DISCARD_SLOT] = HIDDEN_CARD_COUNT;
    }
    let slots: usize = capacity.iter().sum();
    if slots != pool.len() {
        return Err(SearchError::Sampling {
            reason: format!("{} unseen cards for {} open slots", pool.len(), slots),
        });
    }

    let voids = tracker.void_matrix();
    let eligible = |card: Card, slot: usize| -> bool {
        slot == DISCARD_SLOT || !voids[slot][card.suit.index()]
    };

    'attempt: for _ in 0..MAX_ATTEMPTS {
        pool.shuffle(rng);
        // Most constrained cards first.
        pool.sort_by_key(|card| {
            (0..5)
                .filter(|slot| capacity[*slot] > 0 && eligible(*card, *slot))
                .count()
        });
        let mut remaining = capacity;
        let mut dealt: [Vec<Card>; 5] = Default::default();
        for card in &pool {
            let open: Vec<usize> = (0..5)
                .filter(|slot| remaining[*slot] > 0 && eligible(*card, *slot))
                .collect();
            let total: usize = open.iter().map(|slot| remaining[*slot]).sum();
            if total == 0 {
                continue 'attempt;
            }
            let mut pick = rng.gen_range(0..total);
            let mut chosen = open[0];
            for slot in open {
                if pick < remaining[slot] {
                    chosen = slot;
                    break;
                }
                pick -= remaining[slot];
            }
            remaining[chosen] -= 1;
            dealt[chosen].push(*card);
        }

        let [h0, h1, h2, h3, discards] = dealt;
        let mut hands = [h0, h1, h2, h3];
        hands[view.seat.index()] = view.hand.clone();
        let adjutant = adjutant_in_world(view, &hands, &discards, rng);
        let current = view.current_trick.as_ref();
        let trick: Vec<(Seat, Card)> = current
            .map(|trick| trick.plays().iter().map(|play| (play.seat, play.card)).collect())
            .unwrap_or_default();
        let to_move = view
            .current_seat
            .or_else(|| current.map(|trick| trick.expected_seat()))
            .unwrap_or(view.seat);

        let mut faces = [0u8; 4];
        for trick in &view.history {
            if let Some(winner) = trick.winner() {
                faces[winner.index()] += trick.counting_cards();
            }
        }

        return Ok(World {
            hands,
            trump: declaration.trump,
            napoleon: declaration.napoleon,
            adjutant,
            target: declaration.target,
            trick,
            to_move,
            faces,
            tricks_played: view.history.len(),
        });
    }

    Err(SearchError::Sampling {
        reason: format!("no consistent deal after {MAX_ATTEMPTS} attempts"),
    })
}

/// Ally seat for the sampled world, using only what the viewer is entitled to know.
fn adjutant_in_world<R: Rng + ?Sized>(
    view: &PlayerView,
    hands: &[Vec<Card>; 4],
    discards: &[Card],
    rng: &mut R,
) -> Option<Seat> {
    let napoleon = view.napoleon()?;
    if let Some(seat) = view.revealed_adjutant {
        return (seat != napoleon).then_some(seat);
    }
    match (view.role, view.adjutant_card()) {
        (ViewerRole::Adjutant, _) => Some(view.seat),
        (_, Some(card)) => {
            if discards.contains(&card) {
                return None;
            }
            Seat::LOOP
                .into_iter()
                .find(|seat| hands[seat.index()].contains(&card))
                .filter(|seat| *seat != napoleon)
        }
        (ViewerRole::Napoleon, None) => None,
        (_, None) => {
            // The card is secret: any other alliance seat might hold it, or nobody.
            let candidates: Vec<Seat> = Seat::LOOP
                .into_iter()
                .filter(|seat| *seat != napoleon && *seat != view.seat)
                .collect();
            let pick = rng.gen_range(0..=candidates.len());
            candidates.get(pick).copied()
        }
    }
}
