mod permutations;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use napoleon_bot::bot::BidDecision;
use napoleon_bot::policy::{HeuristicPolicy, HybridPolicy, Policy};
use napoleon_bot::strategy::{DecisionSource, Strategy, StrategyConfig, create_custom_mcts_config};
use napoleon_core::error::GameError;
use napoleon_core::game::match_state::MatchState;
use napoleon_core::game::scoring::GameResult;
use napoleon_core::game::state::{BiddingOutcome, PhaseKind};
use napoleon_core::model::declaration::{AdjutantRole, NapoleonDeclaration};
use napoleon_core::model::player::{Player, Seat};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{AgentConfig, AgentDifficulty, BenchmarkConfig, ResolvedOutputs};

pub use permutations::SeatPermutations;

/// Primary entry point for orchestrating tournaments.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    seat_permutations: SeatPermutations,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub permutations: usize,
    pub rows_written: usize,
    pub abandoned: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents);

        if agents.len() != 4 {
            return Err(RunnerError::SeatCount {
                found: agents.len(),
            });
        }

        if config.games.permutations > SeatPermutations::max() {
            return Err(RunnerError::PermutationLimit {
                requested: config.games.permutations,
                max: SeatPermutations::max(),
            });
        }

        let seat_permutations = SeatPermutations::new(config.games.permutations);

        Ok(Self {
            config,
            outputs,
            agents,
            seat_permutations,
        })
    }

    /// Execute the tournament, streaming one JSONL row per game to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let permutations = self.seat_permutations.as_slice();
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut abandoned = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config);

        for game_index in 0..self.config.games.count {
            let base_seed = rng.next_u64();

            for (perm_index, perm) in permutations.iter().enumerate() {
                let outcome = self.play_game(game_index, perm_index, base_seed, perm)?;
                if outcome.result.is_none() {
                    abandoned += 1;
                }
                analytics.record_game(&outcome)?;
                write_game_row(&mut writer, &self.config, base_seed, &outcome)?;
                rows_written += 1;
            }
        }

        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;

        Ok(RunSummary {
            games_played: self.config.games.count,
            permutations: permutations.len(),
            rows_written,
            abandoned,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }

    fn play_game(
        &self,
        game_index: usize,
        permutation_index: usize,
        base_seed: u64,
        permutation: &[usize; 4],
    ) -> Result<GameOutcome, RunnerError> {
        let game_id = format!("G{game_index:05}_P{permutation_index:02}");
        let mut seats = build_seat_states(permutation, &self.agents)?;
        let players = seats
            .iter()
            .map(|seat| Player::ai(seat.agent_name.clone(), seat.agent_name.clone(), seat.seat))
            .collect();
        let mut table = MatchState::with_seed(game_id.clone(), players, base_seed)?
            .with_max_redeals(self.config.games.max_redeals);
        table.start_game()?;

        let mut abandoned = false;
        loop {
            let phase = table.game().phase_kind();
            match phase {
                PhaseKind::Napoleon => {
                    let seat = current_seat(&table)?;
                    let view = table.game().view_for(seat);
                    let state = &mut seats[seat.index()];
                    let start = Instant::now();
                    let decision = state.policy.choose_bid(&view);
                    state.metrics.record(start.elapsed(), None);

                    let player_id = table.game().player(seat).id.as_str().to_string();
                    let outcome = match decision {
                        BidDecision::Pass => table.game_mut().pass(&player_id)?,
                        BidDecision::Declare { target, trump } => {
                            table.game_mut().declare(&player_id, target, trump)?
                        }
                    };
                    if matches!(outcome, BiddingOutcome::Redeal) && !table.redeal()? {
                        abandoned = true;
                        break;
                    }
                }
                PhaseKind::Adjutant => {
                    table.game_mut().resolve_adjutant()?;
                }
                PhaseKind::Exchange => {
                    let seat = current_seat(&table)?;
                    let view = table.game().view_for(seat);
                    let state = &mut seats[seat.index()];
                    let start = Instant::now();
                    let discards = state.policy.choose_exchange(&view).ok_or_else(|| {
                        RunnerError::game(format!("{} produced no discards", state.agent_name))
                    })?;
                    state.metrics.record(start.elapsed(), None);
                    let player_id = table.game().player(seat).id.as_str().to_string();
                    table.game_mut().exchange(&player_id, &discards)?;
                }
                PhaseKind::Playing => {
                    if table.game().showing_trick_result() {
                        table.game_mut().continue_after_trick()?;
                        continue;
                    }
                    let seat = current_seat(&table)?;
                    let view = table.game().view_for(seat);
                    let state = &mut seats[seat.index()];
                    let start = Instant::now();
                    let choice = state.policy.choose_play(&view).ok_or_else(|| {
                        RunnerError::game(format!(
                            "{} had no legal play with {} cards",
                            state.agent_name,
                            view.hand.len()
                        ))
                    })?;
                    let elapsed_ms = state.metrics.record(start.elapsed(), Some(choice.source));

                    if tracing::enabled!(Level::DEBUG) {
                        event!(
                            target: "napoleon_bench::play",
                            Level::DEBUG,
                            run_id = %self.config.run_id,
                            game = %game_id,
                            seat = seat.number(),
                            agent = %state.agent_name,
                            card = %choice.card,
                            source = choice.source.as_str(),
                            elapsed_ms
                        );
                    }

                    let player_id = table.game().player(seat).id.as_str().to_string();
                    table.game_mut().play_card(&player_id, choice.card)?;
                }
                PhaseKind::Finished => break,
                PhaseKind::Setup | PhaseKind::Dealing => {
                    return Err(RunnerError::game(format!(
                        "game {game_id} stalled in the {phase} phase"
                    )));
                }
            }
        }

        let game = table.game();
        let result = if abandoned { None } else { game.result().copied() };
        let declaration = game.napoleon_declaration().copied();
        let redeals = game.reshuffle_count();

        event!(
            target: "napoleon_bench::game",
            Level::INFO,
            run_id = %self.config.run_id,
            game = %game_id,
            redeals,
            abandoned,
            napoleon = declaration.map(|d| d.napoleon.number()),
            napoleon_won = result.map(|r| r.napoleon_won),
        );

        let seating = seats
            .iter()
            .map(|seat| SeatSnapshot {
                seat: seat.seat.number(),
                agent: seat.agent_name.clone(),
                difficulty: seat.difficulty,
            })
            .collect();

        let seat_results = seats
            .into_iter()
            .map(|seat| SeatResult {
                role: SeatRole::from_result(result.as_ref(), seat.seat),
                delta: result.map(|r| r.delta(seat.seat)).unwrap_or(0),
                agent_name: seat.agent_name,
                seat: seat.seat,
                metrics: seat.metrics.finalize(),
            })
            .collect();

        Ok(GameOutcome {
            game_id,
            game_index,
            permutation_index,
            redeals,
            seating,
            seat_results,
            declaration,
            result,
        })
    }
}

fn current_seat(table: &MatchState) -> Result<Seat, RunnerError> {
    table
        .game()
        .current_seat()
        .ok_or_else(|| RunnerError::game(format!("no seat to act in {}", table.game().phase_kind())))
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_game_row(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    base_seed: u64,
    outcome: &GameOutcome,
) -> Result<(), RunnerError> {
    let result = outcome.result.as_ref();
    let decisions: u32 = outcome.seat_results.iter().map(|s| s.metrics.decisions).sum();
    let total_ms: f64 = outcome.seat_results.iter().map(|s| s.metrics.total_ms).sum();
    let row = GameLogRow {
        run_id: config.run_id.clone(),
        game_id: outcome.game_id.clone(),
        game_index: outcome.game_index,
        permutation_index: outcome.permutation_index,
        seed: base_seed,
        redeals: outcome.redeals,
        abandoned: result.is_none(),
        seating: outcome.seating.clone(),
        napoleon_seat: outcome.declaration.map(|d| d.napoleon.number()),
        target: outcome.declaration.map(|d| d.target),
        trump: outcome.declaration.map(|d| d.trump.to_string()),
        adjutant_card: outcome
            .declaration
            .and_then(|d| d.adjutant_card)
            .map(|card| card.id()),
        adjutant: result.map(|r| adjutant_label(r.adjutant)),
        napoleon_won: result.map(|r| r.napoleon_won),
        napoleon_side_faces: result.map(|r| r.napoleon_side_faces),
        deltas: result.map(|r| r.deltas).unwrap_or([0; 4]),
        decisions,
        search_decisions: outcome
            .seat_results
            .iter()
            .map(|s| s.metrics.search_decisions)
            .sum(),
        fallback_decisions: outcome
            .seat_results
            .iter()
            .map(|s| s.metrics.fallback_decisions)
            .sum(),
        avg_ms_per_decision: if decisions == 0 {
            0.0
        } else {
            total_ms / f64::from(decisions)
        },
    };

    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

fn adjutant_label(role: AdjutantRole) -> &'static str {
    match role {
        AdjutantRole::Ally(_) => "ally",
        AdjutantRole::SelfAdjutant => "self",
        AdjutantRole::Alone => "alone",
    }
}

fn build_seat_states(
    permutation: &[usize; 4],
    agents: &[AgentBlueprint],
) -> Result<Vec<SeatState>, RunnerError> {
    let mut seats = Vec::with_capacity(4);
    for (seat_idx, agent_idx) in permutation.iter().enumerate() {
        let seat = Seat::from_index(seat_idx).ok_or_else(|| {
            RunnerError::game(format!("invalid seat index generated: {}", seat_idx))
        })?;
        let agent = agents
            .get(*agent_idx)
            .ok_or(RunnerError::InvalidPermutation {
                index: seat_idx,
                agent_index: *agent_idx,
            })?;
        seats.push(SeatState::new(seat, agent));
    }
    Ok(seats)
}

struct SeatState {
    seat: Seat,
    agent_name: String,
    difficulty: AgentDifficulty,
    policy: Box<dyn Policy>,
    metrics: DecisionMetrics,
}

impl SeatState {
    fn new(seat: Seat, agent: &AgentBlueprint) -> Self {
        Self {
            seat,
            agent_name: agent.name.clone(),
            difficulty: agent.difficulty,
            policy: agent.spawn_policy(),
            metrics: DecisionMetrics::default(),
        }
    }
}

pub struct GameOutcome {
    pub game_id: String,
    pub game_index: usize,
    pub permutation_index: usize,
    pub redeals: u32,
    pub seating: Vec<SeatSnapshot>,
    pub seat_results: Vec<SeatResult>,
    pub declaration: Option<NapoleonDeclaration>,
    /// `None` when the redeal cap was reached before anyone declared.
    pub result: Option<GameResult>,
}

#[derive(Clone, Serialize)]
pub struct SeatSnapshot {
    pub seat: u8,
    pub agent: String,
    pub difficulty: AgentDifficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatRole {
    Napoleon,
    Adjutant,
    Alliance,
    /// Abandoned game.
    None,
}

impl SeatRole {
    fn from_result(result: Option<&GameResult>, seat: Seat) -> Self {
        match result {
            None => SeatRole::None,
            Some(r) if r.napoleon == seat => SeatRole::Napoleon,
            Some(r) if r.adjutant.ally() == Some(seat) => SeatRole::Adjutant,
            Some(_) => SeatRole::Alliance,
        }
    }
}

pub struct SeatResult {
    pub agent_name: String,
    pub seat: Seat,
    pub role: SeatRole,
    pub delta: i32,
    pub metrics: DecisionSummary,
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
    search_decisions: u32,
    fallback_decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration, source: Option<DecisionSource>) -> f64 {
        self.total += duration;
        self.decisions += 1;
        match source {
            Some(DecisionSource::Search) => self.search_decisions += 1,
            Some(DecisionSource::Fallback) => self.fallback_decisions += 1,
            _ => {}
        }
        duration.as_secs_f64() * 1000.0
    }

    fn finalize(self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            search_decisions: self.search_decisions,
            fallback_decisions: self.fallback_decisions,
            avg_ms_per_decision: avg_ms,
            total_ms: self.total.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Clone)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub search_decisions: u32,
    pub fallback_decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[derive(Serialize)]
struct GameLogRow {
    run_id: String,
    game_id: String,
    game_index: usize,
    permutation_index: usize,
    seed: u64,
    redeals: u32,
    abandoned: bool,
    seating: Vec<SeatSnapshot>,
    napoleon_seat: Option<u8>,
    target: Option<u8>,
    trump: Option<String>,
    adjutant_card: Option<String>,
    adjutant: Option<&'static str>,
    napoleon_won: Option<bool>,
    napoleon_side_faces: Option<u8>,
    deltas: [i32; 4],
    decisions: u32,
    search_decisions: u32,
    fallback_decisions: u32,
    avg_ms_per_decision: f64,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("engine rejected an AI action: {0}")]
    Engine(#[from] GameError),
    #[error("game execution failed: {message}")]
    Game { message: String },
    #[error("configuration requires exactly 4 agents but found {found}")]
    SeatCount { found: usize },
    #[error("requested {requested} seat permutations exceeds maximum of {max}")]
    PermutationLimit { requested: usize, max: usize },
    #[error("permutation index {index} references invalid agent index {agent_index}")]
    InvalidPermutation { index: usize, agent_index: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl RunnerError {
    fn game(message: String) -> Self {
        RunnerError::Game { message }
    }
}

struct AgentBlueprint {
    name: String,
    difficulty: AgentDifficulty,
    strategy: StrategyConfig,
}

impl AgentBlueprint {
    fn from_configs(configs: &[AgentConfig]) -> Vec<Self> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Self {
        let mut strategy = StrategyConfig::for_difficulty(config.difficulty.difficulty());
        if let Some(search) = config.search {
            strategy.mcts =
                create_custom_mcts_config(search.simulations, search.time_limit_ms, search.worlds);
        }
        Self {
            name: config.name.clone(),
            difficulty: config.difficulty,
            strategy,
        }
    }

    fn spawn_policy(&self) -> Box<dyn Policy> {
        let difficulty = self.difficulty.difficulty();
        match self.strategy.strategy {
            Strategy::Heuristic => Box::new(HeuristicPolicy::new(difficulty)),
            Strategy::Hybrid => Box::new(HybridPolicy::new(difficulty, self.strategy)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchOverrides;

    fn agent(difficulty: AgentDifficulty, search: Option<SearchOverrides>) -> AgentConfig {
        AgentConfig {
            name: "bot".to_string(),
            difficulty,
            search,
        }
    }

    #[test]
    fn easy_agents_spawn_heuristic_policies() {
        let blueprint = AgentBlueprint::from_config(&agent(AgentDifficulty::Easy, None));
        assert_eq!(blueprint.spawn_policy().name(), "heuristic");
    }

    #[test]
    fn search_overrides_replace_the_budget() {
        let overrides = SearchOverrides {
            simulations: 12,
            time_limit_ms: 34,
            worlds: 2,
        };
        let blueprint =
            AgentBlueprint::from_config(&agent(AgentDifficulty::Hard, Some(overrides)));
        assert_eq!(blueprint.strategy.strategy, Strategy::Hybrid);
        assert_eq!(blueprint.strategy.mcts.simulation_count, 12);
        assert_eq!(blueprint.strategy.mcts.time_limit_ms, 34);
        assert_eq!(blueprint.strategy.mcts.determinization_count, 2);
        assert_eq!(blueprint.spawn_policy().name(), "hybrid");
    }

    #[test]
    fn seat_roles_follow_the_result() {
        let result = GameResult {
            napoleon: Seat::Second,
            adjutant: AdjutantRole::Ally(Seat::Fourth),
            target: 13,
            napoleon_won: true,
            faces_by_seat: [2, 8, 0, 6],
            napoleon_side_faces: 14,
            alliance_side_faces: 2,
            deltas: [-20, 110, -20, 60],
        };
        assert_eq!(SeatRole::from_result(Some(&result), Seat::Second), SeatRole::Napoleon);
        assert_eq!(SeatRole::from_result(Some(&result), Seat::Fourth), SeatRole::Adjutant);
        assert_eq!(SeatRole::from_result(Some(&result), Seat::First), SeatRole::Alliance);
        assert_eq!(SeatRole::from_result(None, Seat::First), SeatRole::None);
        assert_eq!(adjutant_label(result.adjutant), "ally");
    }
}
