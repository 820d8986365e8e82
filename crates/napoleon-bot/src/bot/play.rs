use super::evaluator::evaluate_card_strategic_value;
use napoleon_core::game::view::PlayerView;
use napoleon_core::model::card::Card;

pub struct PlayPlanner;

impl PlayPlanner {
    /// Highest-valued legal card. Equal scores keep the first card in `legal`.
    pub fn choose(legal: &[Card], view: &PlayerView) -> Option<Card> {
        Self::rank(legal, view).first().map(|(card, _)| *card)
    }

    /// Legal cards with their scores, best first. The sort is stable.
    pub fn rank(legal: &[Card], view: &PlayerView) -> Vec<(Card, i32)> {
        let mut scored: Vec<(Card, i32)> = legal
            .iter()
            .map(|card| (*card, evaluate_card_strategic_value(*card, view)))
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored
    }
}
