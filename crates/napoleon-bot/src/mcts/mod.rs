//! Determinized Monte Carlo tree search.
//!
//! Each determinization samples one complete deal consistent with the viewer's knowledge,
//! runs UCT on it, and reports visit counts for the root moves. Counts are summed across
//! worlds and the most visited card is chosen.

mod determinize;
mod tree;
mod world;

pub use determinize::sample_world;
pub use tree::{NodeId, SearchTree};
pub use world::World;

use napoleon_core::game::view::PlayerView;
use napoleon_core::model::card::Card;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MctsConfig {
    /// Simulations per determinized world.
    pub simulation_count: u32,
    pub time_limit_ms: u64,
    pub determinization_count: u32,
    pub exploration_constant: f64,
    /// Spread determinizations across the rayon pool.
    pub parallel: bool,
    /// Fixed seed for reproducible searches; otherwise derived from the view.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            simulation_count: 200,
            time_limit_ms: 1_000,
            determinization_count: 8,
            exploration_constant: std::f64::consts::SQRT_2,
            parallel: true,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("no legal moves for the searching seat")]
    NoLegalMoves,
    #[error("could not sample a consistent world: {reason}")]
    Sampling { reason: String },
    #[error("search finished without running a single simulation")]
    NoSimulations,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub card: Card,
    /// Aggregated root visits per legal card, in legal-move order.
    pub visits: Vec<(Card, u32)>,
    pub worlds: u32,
    pub simulations: u64,
    pub elapsed: Duration,
}

struct WorldStats {
    visits: Vec<u32>,
    value_sums: Vec<f64>,
    simulations: u64,
}

pub fn search(view: &PlayerView, config: &MctsConfig) -> Result<SearchOutcome, SearchError> {
    let started = Instant::now();
    let legal = view.legal_plays();
    if legal.is_empty() {
        return Err(SearchError::NoLegalMoves);
    }
    if legal.len() == 1 {
        return Ok(SearchOutcome {
            card: legal[0],
            visits: vec![(legal[0], 0)],
            worlds: 0,
            simulations: 0,
            elapsed: started.elapsed(),
        });
    }

    let deadline = started + Duration::from_millis(config.time_limit_ms);
    let base_seed = config.seed.unwrap_or_else(|| view_seed(view));
    let worlds = config.determinization_count.max(1);
    let run = |index: u32| -> Result<WorldStats, SearchError> {
        let mut rng = StdRng::seed_from_u64(base_seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let world = sample_world(view, &mut rng)?;
        Ok(search_world(world, &legal, config, deadline, &mut rng))
    };
    let results: Vec<Result<WorldStats, SearchError>> = if config.parallel {
        (0..worlds).into_par_iter().map(run).collect()
    } else {
        (0..worlds).map(run).collect()
    };

    let Totals {
        visits,
        value_sums,
        simulations,
        worlds,
    } = aggregate(results, legal.len())?;

    // Most visits wins; ties go to the better mean value, then to legal-move order.
    let mut best = 0;
    for index in 1..legal.len() {
        let mean = |i: usize| value_sums[i] / visits[i].max(1) as f64;
        if visits[index] > visits[best] || (visits[index] == visits[best] && mean(index) > mean(best))
        {
            best = index;
        }
    }

    let outcome = SearchOutcome {
        card: legal[best],
        visits: legal.iter().copied().zip(visits.iter().copied()).collect(),
        worlds,
        simulations,
        elapsed: started.elapsed(),
    };
    event!(
        target: "napoleon::ai",
        Level::DEBUG,
        seat = view.seat.number(),
        worlds = outcome.worlds,
        simulations = outcome.simulations,
        elapsed_ms = outcome.elapsed.as_millis() as u64,
        chosen = %outcome.card,
        "mcts search complete"
    );
    Ok(outcome)
}

struct Totals {
    visits: Vec<u32>,
    value_sums: Vec<f64>,
    simulations: u64,
    /// Worlds that ran at least one simulation.
    worlds: u32,
}

/// Sums per-world statistics. Worlds cut off by the deadline before their first
/// simulation contribute nothing and are not counted.
fn aggregate(
    results: Vec<Result<WorldStats, SearchError>>,
    moves: usize,
) -> Result<Totals, SearchError> {
    let mut totals = Totals {
        visits: vec![0; moves],
        value_sums: vec![0.0; moves],
        simulations: 0,
        worlds: 0,
    };
    let mut sampled = 0u32;
    let mut last_error = None;
    for result in results {
        let stats = match result {
            Ok(stats) => stats,
            Err(err) => {
                last_error = Some(err);
                continue;
            }
        };
        sampled += 1;
        if stats.simulations == 0 {
            continue;
        }
        totals.worlds += 1;
        totals.simulations += stats.simulations;
        for index in 0..moves {
            totals.visits[index] += stats.visits[index];
            totals.value_sums[index] += stats.value_sums[index];
        }
    }
    if sampled == 0 {
        return Err(last_error.unwrap_or(SearchError::NoSimulations));
    }
    if totals.simulations == 0 {
        return Err(SearchError::NoSimulations);
    }
    Ok(totals)
}

fn search_world(
    root: World,
    legal: &[Card],
    config: &MctsConfig,
    deadline: Instant,
    rng: &mut StdRng,
) -> WorldStats {
    let mut tree = SearchTree::new(legal.to_vec());
    let mut simulations = 0u64;
    for _ in 0..config.simulation_count {
        if Instant::now() >= deadline {
            break;
        }
        let mut world = root.clone();
        let mut node = NodeId::ROOT;

        // Selection.
        while tree.get(node).untried.is_empty() && !tree.get(node).children.is_empty() {
            let Some(child) = tree.select_child(node, config.exploration_constant) else {
                break;
            };
            if let Some((_, card)) = tree.get(child).action {
                world.apply(card);
            }
            node = child;
        }

        // Expansion.
        if !world.is_terminal() {
            if let Some(card) = tree.get(node).untried.choose(rng).copied() {
                let seat = world.to_move;
                world.apply(card);
                let untried = if world.is_terminal() {
                    Vec::new()
                } else {
                    world.legal_moves()
                };
                node = tree.add_child(node, seat, card, untried);
            }
        }

        // Random rollout.
        while !world.is_terminal() {
            let moves = world.legal_moves();
            let Some(card) = moves.choose(rng).copied() else {
                break;
            };
            world.apply(card);
        }

        tree.backpropagate(node, &world.rewards());
        simulations += 1;
    }

    let mut visits = vec![0u32; legal.len()];
    let mut value_sums = vec![0.0f64; legal.len()];
    for (card, count, mean) in tree.root_stats() {
        if let Some(index) = legal.iter().position(|candidate| *candidate == card) {
            visits[index] = count;
            value_sums[index] = mean * count as f64;
        }
    }
    WorldStats {
        visits,
        value_sums,
        simulations,
    }
}

fn view_seed(view: &PlayerView) -> u64 {
    let mut hasher = DefaultHasher::new();
    view.game_id.hash(&mut hasher);
    view.version.hash(&mut hasher);
    view.seat.hash(&mut hasher);
    hasher.finish()
}
