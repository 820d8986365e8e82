use super::Policy;
use crate::bot::{BidDecision, BidPlanner, Difficulty, ExchangePlanner};
use crate::strategy::{AiChoice, StrategyConfig, select_ai_choice};
use napoleon_core::game::view::PlayerView;
use napoleon_core::model::card::Card;
use tracing::{Level, event};

/// Evaluator-only policy wrapping the bid, exchange and play planners.
pub struct HeuristicPolicy {
    difficulty: Difficulty,
    config: StrategyConfig,
}

impl HeuristicPolicy {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            config: StrategyConfig::for_difficulty(Difficulty::Easy),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self::new(Difficulty::Easy)
    }
}

impl Policy for HeuristicPolicy {
    fn name(&self) -> &'static str {
        "heuristic"
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

pub(super) fn log_bid_decision(view: &PlayerView, difficulty: Difficulty, decision: BidDecision) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    let summary = match decision {
        BidDecision::Pass => "pass".to_string(),
        BidDecision::Declare { target, trump } => format!("{target} {trump}"),
    };
    event!(
        target: "napoleon::ai",
        Level::DEBUG,
        seat = view.seat.number(),
        difficulty = difficulty.as_str(),
        standing = ?view.standing_bid,
        decision = %summary,
        "ai bid"
    );
}

pub(super) fn log_exchange_decision(view: &PlayerView, difficulty: Difficulty, discards: &[Card; 4]) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    let cards = discards
        .iter()
        .map(|card| card.to_string())
        .collect::<Vec<_>>()
        .join(",");
    event!(
        target: "napoleon::ai",
        Level::DEBUG,
        seat = view.seat.number(),
        difficulty = difficulty.as_str(),
        discards = %cards,
        "ai exchange"
    );
}
