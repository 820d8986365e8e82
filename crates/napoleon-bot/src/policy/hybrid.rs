use super::Policy;
use super::heuristic::{log_bid_decision, log_exchange_decision};
use crate::bot::{BidDecision, BidPlanner, Difficulty, ExchangePlanner};
use crate::strategy::{AiChoice, StrategyConfig, select_ai_choice};
use napoleon_core::game::view::PlayerView;
use napoleon_core::model::card::Card;

/// Planner bidding and exchange with search-backed card play.
pub struct HybridPolicy {
    difficulty: Difficulty,
    config: StrategyConfig,
}

impl HybridPolicy {
    pub fn new(difficulty: Difficulty, config: StrategyConfig) -> Self {
        Self { difficulty, config }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }
}

impl Policy for HybridPolicy {
    fn name(&self) -> &'static str {
        "hybrid"
    }

    fn choose_bid(&mut self, view: &PlayerView) -> BidDecision {
        let decision = BidPlanner::choose(view);
        log_bid_decision(view, self.difficulty, decision);
        decision
    }

    fn choose_exchange(&mut self, view: &PlayerView) -> Option<[Card; 4]> {
        let discards = ExchangePlanner::choose(view)?;
        log_exchange_decision(view, self.difficulty, &discards);
        Some(discards)
    }

    fn choose_play(&mut self, view: &PlayerView) -> Option<AiChoice> {
        select_ai_choice(view, &self.config)
    }
}
