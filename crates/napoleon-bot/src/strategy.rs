//! Chooses between the heuristic evaluator and determinized search for each card play.

use crate::bot::{Difficulty, PlayPlanner};
use crate::mcts::{self, MctsConfig};
use napoleon_core::game::state::{GameState, TOTAL_TRICKS};
use napoleon_core::game::view::PlayerView;
use napoleon_core::model::card::Card;
use napoleon_core::model::player::Seat;
use std::fmt;
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Evaluator only.
    Heuristic,
    /// Evaluator early in the hand, search afterwards.
    Hybrid,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Heuristic => "heuristic",
            Strategy::Hybrid => "hybrid",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyConfig {
    pub strategy: Strategy,
    pub mcts: MctsConfig,
    /// Share of tricks completed below which the hybrid strategy stays heuristic.
    pub early_game_threshold: f64,
}

impl StrategyConfig {
    pub const EARLY_GAME_THRESHOLD: f64 = 0.3;

    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                strategy: Strategy::Heuristic,
                mcts: MctsConfig::default(),
                early_game_threshold: Self::EARLY_GAME_THRESHOLD,
            },
            Difficulty::Normal => Self {
                strategy: Strategy::Hybrid,
                mcts: create_custom_mcts_config(200, 1_000, 8),
                early_game_threshold: Self::EARLY_GAME_THRESHOLD,
            },
            Difficulty::Hard => Self {
                strategy: Strategy::Hybrid,
                mcts: create_custom_mcts_config(600, 3_000, 16),
                early_game_threshold: Self::EARLY_GAME_THRESHOLD,
            },
        }
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::default())
    }
}

pub fn strategy_config_by_difficulty(difficulty: Difficulty) -> StrategyConfig {
    StrategyConfig::for_difficulty(difficulty)
}

/// Search configuration with the standard UCT exploration constant.
pub fn create_custom_mcts_config(
    simulation_count: u32,
    time_limit_ms: u64,
    determinization_count: u32,
) -> MctsConfig {
    MctsConfig {
        simulation_count,
        time_limit_ms,
        determinization_count,
        exploration_constant: std::f64::consts::SQRT_2,
        ..MctsConfig::default()
    }
}

/// Which path produced a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionSource {
    Heuristic,
    /// Hybrid strategy before the early-game threshold.
    EarlyGame,
    Search,
    /// Search failed and the evaluator answered instead.
    Fallback,
}

impl DecisionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionSource::Heuristic => "heuristic",
            DecisionSource::EarlyGame => "early_game",
            DecisionSource::Search => "search",
            DecisionSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiChoice {
    pub card: Card,
    pub source: DecisionSource,
}

/// Card to play for the viewing seat, or `None` when it has no legal play.
pub fn select_ai_card(view: &PlayerView, config: &StrategyConfig) -> Option<Card> {
    select_ai_choice(view, config).map(|choice| choice.card)
}

/// Same as [`select_ai_card`] but built from the full state. Only the seat's own view
/// reaches the evaluator.
pub fn select_ai_card_for(state: &GameState, seat: Seat, config: &StrategyConfig) -> Option<Card> {
    select_ai_card(&state.view_for(seat), config)
}

pub fn select_ai_choice(view: &PlayerView, config: &StrategyConfig) -> Option<AiChoice> {
    let legal = view.legal_plays();
    if legal.is_empty() {
        event!(
            target: "napoleon::ai",
            Level::WARN,
            seat = view.seat.number(),
            hand = view.hand.len(),
            "no legal plays for AI seat"
        );
        return None;
    }

    let progress = game_progress(view);
    let choice = match config.strategy {
        Strategy::Heuristic => heuristic_choice(&legal, view, DecisionSource::Heuristic),
        Strategy::Hybrid if progress < config.early_game_threshold => {
            heuristic_choice(&legal, view, DecisionSource::EarlyGame)
        }
        Strategy::Hybrid => match mcts::search(view, &config.mcts) {
            Ok(outcome) => Some(AiChoice {
                card: outcome.card,
                source: DecisionSource::Search,
            }),
            Err(err) => {
                event!(
                    target: "napoleon::ai",
                    Level::WARN,
                    seat = view.seat.number(),
                    error = %err,
                    "search failed; using heuristic"
                );
                heuristic_choice(&legal, view, DecisionSource::Fallback)
            }
        },
    }?;

    event!(
        target: "napoleon::ai",
        Level::DEBUG,
        seat = view.seat.number(),
        strategy = %config.strategy,
        source = choice.source.as_str(),
        progress,
        legal_count = legal.len(),
        chosen = %choice.card,
        "ai card selected"
    );
    Some(choice)
}

/// Completed tricks as a share of the hand.
pub fn game_progress(view: &PlayerView) -> f64 {
    view.tricks_completed() as f64 / TOTAL_TRICKS as f64
}

fn heuristic_choice(legal: &[Card], view: &PlayerView, source: DecisionSource) -> Option<AiChoice> {
    PlayPlanner::choose(legal, view).map(|card| AiChoice { card, source })
}
