pub mod bot;
pub mod mcts;
pub mod policy;
pub mod scheduler;
pub mod strategy;

pub use bot::{
    BidDecision, BidPlanner, CardScore, Difficulty, ExchangePlanner, PlayPlanner, UnseenTracker,
    evaluate_card_breakdown, evaluate_card_strategic_value,
};
pub use mcts::{MctsConfig, SearchError, SearchOutcome};
pub use policy::{HeuristicPolicy, HybridPolicy, Policy};
pub use scheduler::{AiDecision, AiTurnScheduler, DEFAULT_AI_DELAY};
pub use strategy::{
    AiChoice, DecisionSource, Strategy, StrategyConfig, create_custom_mcts_config,
    select_ai_card, select_ai_card_for, select_ai_choice, strategy_config_by_difficulty,
};
