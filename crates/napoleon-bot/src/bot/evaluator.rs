use super::tracker::UnseenTracker;
use super::{card_strength, count_cards_in_suit};
use napoleon_core::game::state::TOTAL_TRICKS;
use napoleon_core::game::view::{PlayerView, ViewerRole};
use napoleon_core::model::card::Card;
use napoleon_core::model::declaration::MIN_TARGET;
use napoleon_core::model::player::Seat;
use napoleon_core::rules::{SpecialCard, winning_card_index};

pub const ADJUTANT_CARD_BONUS: i32 = 500;
const WIN_TRICK_BONUS: i32 = 40;
const FACE_ON_TABLE_MULT: i32 = 15;
const OVERTAKE_PARTNER_PENALTY: i32 = 60;
const FEED_PARTNER_BONUS: i32 = 20;
const FEED_OPPONENT_PENALTY: i32 = 25;
const MASTER_LEAD_BONUS: i32 = 30;
const VOID_CREATION_BONUS: i32 = 10;
const ENDGAME_PRESSURE_MULT: i32 = 3;

/// Per-factor breakdown of a card's desirability. `total()` is the evaluator's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CardScore {
    pub base: i32,
    pub adjutant: i32,
    pub trick: i32,
    pub void: i32,
    pub endgame: i32,
}

impl CardScore {
    pub fn total(&self) -> i32 {
        self.base + self.adjutant + self.trick + self.void + self.endgame
    }
}

/// Desirability of playing `card` from the viewer's seat. Pure and deterministic.
pub fn evaluate_card_strategic_value(card: Card, view: &PlayerView) -> i32 {
    evaluate_card_breakdown(card, view).total()
}

pub fn evaluate_card_breakdown(card: Card, view: &PlayerView) -> CardScore {
    let Some(trump) = view.trump() else {
        return CardScore {
            base: card.value() as i32,
            ..CardScore::default()
        };
    };
    let strength = card_strength(card, trump);
    let tracker = UnseenTracker::from_view(view);
    let table: Vec<(Seat, Card)> = view
        .current_trick
        .as_ref()
        .map(|trick| trick.plays().iter().map(|play| (play.seat, play.card)).collect())
        .unwrap_or_default();

    let mut score = CardScore {
        base: strength,
        ..CardScore::default()
    };

    if view.role == ViewerRole::Adjutant && view.adjutant_card() == Some(card) {
        score.adjutant = ADJUTANT_CARD_BONUS;
    }

    let faces_on_table =
        table.iter().filter(|(_, c)| c.is_counting()).count() as i32 + card.is_counting() as i32;
    let wins = if table.is_empty() {
        false
    } else {
        let mut cards: Vec<Card> = table.iter().map(|(_, c)| *c).collect();
        let holder = winning_card_index(&cards, trump).map(|index| table[index].0);
        cards.push(card);
        let wins = winning_card_index(&cards, trump) == Some(table.len());
        let partner_holds = holder.is_some_and(|seat| is_partner(view, seat));
        if wins {
            score.trick = WIN_TRICK_BONUS + FACE_ON_TABLE_MULT * faces_on_table;
            if partner_holds {
                score.trick -= OVERTAKE_PARTNER_PENALTY;
            }
        } else {
            // Losing plays should spend as little strength as possible.
            score.trick = -2 * strength;
            if card.is_counting() {
                score.trick += if partner_holds {
                    FEED_PARTNER_BONUS
                } else {
                    -FEED_OPPONENT_PENALTY
                };
            }
        }
        wins
    };

    let lead = view.leading_suit();
    match lead {
        None => {
            if tracker.is_master(card) || SpecialCard::classify(card, trump).is_some() {
                score.trick += MASTER_LEAD_BONUS;
            }
            if card.suit != trump && count_cards_in_suit(&view.hand, card.suit) == 1 {
                score.void += VOID_CREATION_BONUS / 2;
            }
        }
        Some(lead) if card.suit != lead && card.suit != trump && !wins => {
            score.void += 15 - card.value() as i32;
            if count_cards_in_suit(&view.hand, card.suit) == 1 {
                score.void += VOID_CREATION_BONUS;
            }
        }
        Some(_) => {}
    }

    let leads_trump = card.suit == trump || SpecialCard::classify(card, trump).is_some();
    let takes_control = wins || (lead.is_none() && leads_trump);
    score.endgame = endgame_pressure(view, card, takes_control);
    score
}

fn is_partner(view: &PlayerView, seat: Seat) -> bool {
    seat == view.seat || view.known_partners().contains(&seat)
}

/// Counting cards the viewer's side needs, or must deny, with the remaining tricks.
fn endgame_pressure(view: &PlayerView, card: Card, takes_control: bool) -> i32 {
    if !takes_control {
        return 0;
    }
    let completed = view.tricks_completed() as i32;
    let remaining = TOTAL_TRICKS as i32 - completed;
    if remaining <= 0 {
        return 0;
    }
    let target = view
        .declaration
        .map(|declaration| declaration.target as i32)
        .unwrap_or(MIN_TARGET as i32);
    let napoleon = view.napoleon();
    let revealed = view.revealed_adjutant;
    let mut napoleon_faces = 0;
    let mut alliance_faces = 0;
    for trick in &view.history {
        let Some(winner) = trick.winner() else {
            continue;
        };
        if Some(winner) == napoleon || Some(winner) == revealed {
            napoleon_faces += trick.counting_cards() as i32;
        } else {
            alliance_faces += trick.counting_cards() as i32;
        }
    }
    // The alliance wins by holding 21 - target faces.
    let urgency = match view.role {
        ViewerRole::Napoleon | ViewerRole::Adjutant => (target - napoleon_faces).max(0),
        ViewerRole::Alliance => (21 - target - alliance_faces).max(0),
        ViewerRole::Undecided => 0,
    };
    let weight = if card.is_counting() { 2 } else { 1 };
    ENDGAME_PRESSURE_MULT * urgency * completed * weight / TOTAL_TRICKS as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use napoleon_core::game::state::GameState;
    use napoleon_core::model::declaration::NapoleonDeclaration;
    use napoleon_core::model::hand::Hand;
    use napoleon_core::model::player::Player;
    use napoleon_core::model::rank::Rank;
    use napoleon_core::model::suit::Suit;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    /// Napoleon in seat 0 with hearts trump; the adjutant card (J♥) sits in seat 2.
    fn game() -> GameState {
        let hands = [
            vec![
                card(Rank::Ace, Suit::Spades),
                card(Rank::King, Suit::Hearts),
                card(Rank::Four, Suit::Clubs),
            ],
            vec![
                card(Rank::Ace, Suit::Clubs),
                card(Rank::Five, Suit::Clubs),
                card(Rank::Six, Suit::Diamonds),
            ],
            vec![
                card(Rank::Jack, Suit::Hearts),
                card(Rank::Ten, Suit::Clubs),
                card(Rank::Seven, Suit::Diamonds),
            ],
            vec![
                card(Rank::Queen, Suit::Clubs),
                card(Rank::Three, Suit::Hearts),
                card(Rank::Eight, Suit::Diamonds),
            ],
        ];
        let players = Seat::LOOP
            .iter()
            .zip(hands)
            .map(|(seat, cards)| {
                let mut player = Player::ai(format!("p{}", seat.index()), "bot", *seat);
                player.hand = Hand::with_cards(cards);
                player
            })
            .collect();
        let declaration = NapoleonDeclaration {
            napoleon: Seat::First,
            target: 12,
            trump: Suit::Hearts,
            adjutant_card: Some(card(Rank::Jack, Suit::Hearts)),
        };
        let exchanged = vec![
            card(Rank::Two, Suit::Clubs),
            card(Rank::Two, Suit::Diamonds),
            card(Rank::Two, Suit::Hearts),
            card(Rank::Two, Suit::Spades),
        ];
        GameState::resume_playing_unchecked("eval", players, declaration, exchanged).unwrap()
    }

    #[test]
    fn adjutant_card_carries_the_fixed_bonus_for_its_holder_only() {
        let game = game();
        let jack = card(Rank::Jack, Suit::Hearts);
        let view = game.view_for(Seat::Third);
        assert_eq!(view.role, ViewerRole::Adjutant);

        let with_bonus = evaluate_card_strategic_value(jack, &view);
        let mut masked = view.clone();
        if let Some(declaration) = masked.declaration.as_mut() {
            declaration.adjutant_card = None;
        }
        let without_bonus = evaluate_card_strategic_value(jack, &masked);
        assert_eq!(with_bonus - without_bonus, ADJUTANT_CARD_BONUS);
        assert_eq!(evaluate_card_breakdown(jack, &view).adjutant, ADJUTANT_CARD_BONUS);

        let napoleon_view = game.view_for(Seat::First);
        assert_eq!(evaluate_card_breakdown(jack, &napoleon_view).adjutant, 0);
        let alliance_view = game.view_for(Seat::Second);
        assert_eq!(evaluate_card_breakdown(jack, &alliance_view).adjutant, 0);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let game = game();
        let view = game.view_for(Seat::First);
        for card in view.hand.clone() {
            let first = evaluate_card_strategic_value(card, &view);
            for _ in 0..5 {
                assert_eq!(evaluate_card_strategic_value(card, &view), first);
            }
        }
    }

    #[test]
    fn mighty_outranks_a_low_card_when_leading() {
        let game = game();
        let view = game.view_for(Seat::First);
        let mighty = evaluate_card_strategic_value(Card::MIGHTY, &view);
        let low = evaluate_card_strategic_value(card(Rank::Four, Suit::Clubs), &view);
        assert!(mighty > low);
    }

    #[test]
    fn winning_follow_outscores_a_losing_one() {
        let mut game = game();
        game.play_card("p0", card(Rank::Four, Suit::Clubs)).unwrap();
        game.play_card("p1", card(Rank::Ace, Suit::Clubs)).unwrap();
        game.play_card("p2", card(Rank::Ten, Suit::Clubs)).unwrap();
        let view = game.view_for(Seat::Fourth);
        let winning_trump = evaluate_card_breakdown(card(Rank::Three, Suit::Hearts), &view);
        let losing_club = evaluate_card_breakdown(card(Rank::Queen, Suit::Clubs), &view);
        assert!(winning_trump.trick > 0);
        assert!(losing_club.trick < 0);
    }
}
