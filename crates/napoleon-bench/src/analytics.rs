//! Per-agent tallies over a tournament and the Markdown summary built from them.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};
use thiserror::Error;

use crate::config::{AgentDifficulty, BenchmarkConfig};
use crate::tournament::{DecisionSummary, GameOutcome, SeatRole};

const CONFIDENCE: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("seat played by unconfigured agent '{0}'")]
    UnknownAgent(String),
    #[error("writing summary {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Games and wins in one role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleRecord {
    pub games: usize,
    pub wins: usize,
}

impl RoleRecord {
    fn add(&mut self, won: bool) {
        self.games += 1;
        self.wins += usize::from(won);
    }

    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        }
    }
}

struct AgentTally {
    name: String,
    difficulty: AgentDifficulty,
    napoleon: RoleRecord,
    adjutant: RoleRecord,
    alliance: RoleRecord,
    deltas: Vec<f64>,
    /// Own delta minus the baseline's, one entry per game both finished.
    paired: Vec<f64>,
    decisions: u64,
    search_decisions: u64,
    fallback_decisions: u64,
    decision_ms: f64,
}

impl AgentTally {
    fn new(name: String, difficulty: AgentDifficulty) -> Self {
        Self {
            name,
            difficulty,
            napoleon: RoleRecord::default(),
            adjutant: RoleRecord::default(),
            alliance: RoleRecord::default(),
            deltas: Vec::new(),
            paired: Vec::new(),
            decisions: 0,
            search_decisions: 0,
            fallback_decisions: 0,
            decision_ms: 0.0,
        }
    }

    fn add_decisions(&mut self, metrics: &DecisionSummary) {
        self.decisions += u64::from(metrics.decisions);
        self.search_decisions += u64::from(metrics.search_decisions);
        self.fallback_decisions += u64::from(metrics.fallback_decisions);
        self.decision_ms += metrics.total_ms;
    }

    fn add_game(&mut self, role: SeatRole, delta: i32, won: bool) {
        self.deltas.push(f64::from(delta));
        match role {
            SeatRole::Napoleon => self.napoleon.add(won),
            SeatRole::Adjutant => self.adjutant.add(won),
            SeatRole::Alliance => self.alliance.add(won),
            SeatRole::None => {}
        }
    }

    fn report(&self, latency_budget_ms: u64, baseline_mean: Option<f64>) -> AgentReport {
        let mean_delta = mean(&self.deltas);
        let average_ms_per_decision = if self.decisions == 0 {
            0.0
        } else {
            self.decision_ms / self.decisions as f64
        };
        let finished = self.deltas.len();
        let wins = self.napoleon.wins + self.adjutant.wins + self.alliance.wins;
        AgentReport {
            name: self.name.clone(),
            difficulty: self.difficulty,
            games: finished,
            wins,
            napoleon: self.napoleon,
            adjutant: self.adjutant,
            alliance: self.alliance,
            mean_delta,
            ci95: confidence_interval(&self.deltas),
            delta_vs_baseline: baseline_mean.map(|base| mean_delta - base),
            average_ms_per_decision,
            search_decisions: self.search_decisions,
            fallback_decisions: self.fallback_decisions,
            over_budget: average_ms_per_decision > latency_budget_ms as f64,
        }
    }
}

pub struct AnalyticsCollector {
    run_id: String,
    tallies: Vec<AgentTally>,
    index: HashMap<String, usize>,
    baseline: Option<usize>,
    latency_budget_ms: u64,
    games: usize,
    abandoned: usize,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        let tallies: Vec<AgentTally> = config
            .agents
            .iter()
            .map(|agent| AgentTally::new(agent.name.clone(), agent.difficulty))
            .collect();
        let index: HashMap<String, usize> = tallies
            .iter()
            .enumerate()
            .map(|(position, tally)| (tally.name.clone(), position))
            .collect();
        let baseline = config
            .metrics
            .baseline
            .as_ref()
            .and_then(|name| index.get(name).copied());
        Self {
            run_id: config.run_id.clone(),
            tallies,
            index,
            baseline,
            latency_budget_ms: config.metrics.latency_budget_ms,
            games: 0,
            abandoned: 0,
        }
    }

    /// Adds one game. Abandoned games only contribute decision timings.
    pub fn record_game(&mut self, outcome: &GameOutcome) -> Result<(), AnalyticsError> {
        self.games += 1;
        let result = outcome.result.as_ref();
        if result.is_none() {
            self.abandoned += 1;
        }
        let baseline_delta = self.baseline.and_then(|base| {
            let name = &self.tallies[base].name;
            outcome
                .seat_results
                .iter()
                .find(|seat| &seat.agent_name == name)
                .map(|seat| seat.delta)
        });

        for seat in &outcome.seat_results {
            let position = *self
                .index
                .get(&seat.agent_name)
                .ok_or_else(|| AnalyticsError::UnknownAgent(seat.agent_name.clone()))?;
            let tally = &mut self.tallies[position];
            tally.add_decisions(&seat.metrics);
            let Some(result) = result else {
                continue;
            };
            let won = result.is_napoleon_side(seat.seat) == result.napoleon_won;
            tally.add_game(seat.role, seat.delta, won);
            if let Some(base) = baseline_delta
                && self.baseline != Some(position)
            {
                tally.paired.push(f64::from(seat.delta - base));
            }
        }
        Ok(())
    }

    pub fn finalize(self) -> AnalyticsSummary {
        let baseline = self.baseline.map(|base| &self.tallies[base]);
        let baseline_mean = baseline.map(|tally| mean(&tally.deltas));
        let agents = self
            .tallies
            .iter()
            .map(|tally| tally.report(self.latency_budget_ms, baseline_mean))
            .collect();
        let comparisons = match self.baseline {
            Some(base) => self
                .tallies
                .iter()
                .enumerate()
                .filter(|(position, _)| *position != base)
                .map(|(_, tally)| {
                    let (p_value, sample_size) = wilcoxon_signed_rank(&tally.paired);
                    ComparisonReport {
                        agent: tally.name.clone(),
                        p_value,
                        sample_size,
                    }
                })
                .collect(),
            None => Vec::new(),
        };

        AnalyticsSummary {
            run_id: self.run_id.clone(),
            baseline: baseline.map(|tally| tally.name.clone()),
            games: self.games,
            abandoned: self.abandoned,
            agents,
            comparisons,
            latency_budget_ms: self.latency_budget_ms,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub run_id: String,
    pub baseline: Option<String>,
    pub games: usize,
    pub abandoned: usize,
    pub agents: Vec<AgentReport>,
    pub comparisons: Vec<ComparisonReport>,
    pub latency_budget_ms: u64,
}

impl AnalyticsSummary {
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Napoleon tournament `{}`\n", self.run_id);
        let _ = writeln!(
            out,
            "{} games, {} abandoned at the redeal cap. Decisions slower than {} ms on \
             average are flagged.\n",
            self.games, self.abandoned, self.latency_budget_ms
        );

        out.push_str("## Results\n\n");
        out.push_str("| Agent | Difficulty | Finished | Win % | Mean Δ | 95% CI | ms/decision | Search | Fallback | Slow |\n");
        out.push_str("|---|---|---|---|---|---|---|---|---|---|\n");
        for agent in &self.agents {
            let finished = RoleRecord {
                games: agent.games,
                wins: agent.wins,
            };
            let _ = writeln!(
                out,
                "| {} | {} | {} | {:.1}% | {:+.2} | [{:.2}, {:.2}] | {:.2} | {} | {} | {} |",
                agent.name,
                agent.difficulty.difficulty().as_str(),
                agent.games,
                finished.win_rate() * 100.0,
                agent.mean_delta,
                agent.ci95.0,
                agent.ci95.1,
                agent.average_ms_per_decision,
                agent.search_decisions,
                agent.fallback_decisions,
                if agent.over_budget { "yes" } else { "no" },
            );
        }

        out.push_str("\n## Roles\n\n");
        out.push_str("| Agent | Napoleon | Adjutant | Alliance |\n");
        out.push_str("|---|---|---|---|\n");
        for agent in &self.agents {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} |",
                agent.name,
                role_cell(agent.napoleon),
                role_cell(agent.adjutant),
                role_cell(agent.alliance),
            );
        }

        if let Some(baseline) = &self.baseline {
            let _ = writeln!(out, "\n## Compared with `{baseline}`\n");
            out.push_str("| Agent | Δ vs baseline | Paired games | p-value |\n");
            out.push_str("|---|---|---|---|\n");
            for comparison in &self.comparisons {
                let delta = self
                    .agents
                    .iter()
                    .find(|agent| agent.name == comparison.agent)
                    .and_then(|agent| agent.delta_vs_baseline)
                    .unwrap_or(0.0);
                let _ = writeln!(
                    out,
                    "| {} | {:+.2} | {} | {:.3} |",
                    comparison.agent, delta, comparison.sample_size, comparison.p_value
                );
            }
        }
        out
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let path = path.as_ref();
        fs::write(path, self.to_markdown()).map_err(|source| AnalyticsError::Write {
            path: path.display().to_string(),
            source,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub difficulty: AgentDifficulty,
    /// Games that reached scoring.
    pub games: usize,
    pub wins: usize,
    pub napoleon: RoleRecord,
    pub adjutant: RoleRecord,
    pub alliance: RoleRecord,
    pub mean_delta: f64,
    pub ci95: (f64, f64),
    pub delta_vs_baseline: Option<f64>,
    pub average_ms_per_decision: f64,
    pub search_decisions: u64,
    pub fallback_decisions: u64,
    pub over_budget: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub agent: String,
    pub p_value: f64,
    pub sample_size: usize,
}

fn role_cell(record: RoleRecord) -> String {
    if record.games == 0 {
        "-".to_string()
    } else {
        format!(
            "{}/{} ({:.0}%)",
            record.wins,
            record.games,
            record.win_rate() * 100.0
        )
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Two-sided Student-t interval for the mean.
fn confidence_interval(values: &[f64]) -> (f64, f64) {
    let center = mean(values);
    if values.len() < 2 {
        return (center, center);
    }
    let n = values.len() as f64;
    let variance = values.iter().map(|v| (v - center).powi(2)).sum::<f64>() / (n - 1.0);
    let critical = StudentsT::new(0.0, 1.0, n - 1.0)
        .map(|t| t.inverse_cdf(0.5 + CONFIDENCE / 2.0))
        .unwrap_or(1.96);
    let margin = critical * (variance / n).sqrt();
    (center - margin, center + margin)
}

/// Wilcoxon signed-rank test under the normal approximation with tie and continuity
/// corrections. Zero differences are dropped; returns the p-value and the pairs used.
fn wilcoxon_signed_rank(diffs: &[f64]) -> (f64, usize) {
    let mut nonzero: Vec<f64> = diffs
        .iter()
        .copied()
        .filter(|d| d.abs() > f64::EPSILON)
        .collect();
    let pairs = nonzero.len();
    if pairs == 0 {
        return (1.0, 0);
    }
    nonzero.sort_by(|a, b| a.abs().total_cmp(&b.abs()));

    let mut positive_ranks = 0.0;
    let mut tie_term = 0.0;
    let mut ranked = 0usize;
    for group in nonzero.chunk_by(|a, b| (a.abs() - b.abs()).abs() < 1e-12) {
        let size = group.len() as f64;
        let rank = ranked as f64 + (size + 1.0) / 2.0;
        positive_ranks += rank * group.iter().filter(|d| **d > 0.0).count() as f64;
        tie_term += size.powi(3) - size;
        ranked += group.len();
    }

    let n = pairs as f64;
    let rank_total = n * (n + 1.0) / 2.0;
    let statistic = positive_ranks.min(rank_total - positive_ranks);
    let variance = n * (n + 1.0) * (2.0 * n + 1.0) / 24.0 - tie_term / 48.0;
    if variance <= 0.0 {
        return (1.0, pairs);
    }
    let z = (((statistic - rank_total / 2.0).abs() - 0.5) / variance.sqrt()).max(0.0);
    let p = match Normal::new(0.0, 1.0) {
        Ok(normal) => 2.0 * (1.0 - normal.cdf(z)),
        Err(_) => 1.0,
    };
    (p.clamp(0.0, 1.0), pairs)
}
