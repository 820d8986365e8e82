mod heuristic;
mod hybrid;

pub use heuristic::HeuristicPolicy;
pub use hybrid::HybridPolicy;

use crate::bot::{BidDecision, Difficulty};
use crate::strategy::{AiChoice, Strategy, StrategyConfig};
use napoleon_core::game::view::PlayerView;
use napoleon_core::model::card::Card;

/// Unified interface for every AI decision a seat has to make in a game.
pub trait Policy: Send {
    fn name(&self) -> &'static str;

    /// Declare or pass during the Napoleon phase.
    fn choose_bid(&mut self, view: &PlayerView) -> BidDecision;

    /// Four cards for the Napoleon to discard; `None` when the view carries no hidden cards.
    fn choose_exchange(&mut self, view: &PlayerView) -> Option<[Card; 4]>;

    /// Card to play; `None` only when the seat has no legal play.
    fn choose_play(&mut self, view: &PlayerView) -> Option<AiChoice>;
}

pub fn for_difficulty(difficulty: Difficulty) -> Box<dyn Policy> {
    let config = StrategyConfig::for_difficulty(difficulty);
    match config.strategy {
        Strategy::Heuristic => Box::new(HeuristicPolicy::new(difficulty)),
        Strategy::Hybrid => Box::new(HybridPolicy::new(difficulty, config)),
    }
}
