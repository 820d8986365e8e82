//! Tournament configuration read from YAML.
//!
//! A run names four agents, one per seat, and replays each dealt seed under a number of
//! seat orders. Paths may contain `{run_id}`, which is substituted after command line
//! overrides are applied.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use napoleon_bot::Difficulty;
use napoleon_core::model::player::Seat;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;

use crate::tournament::SeatPermutations;

const RUN_ID_TOKEN: &str = "{run_id}";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub games: GamesConfig,
    pub agents: Vec<AgentConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let mut config: BenchmarkConfig =
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
        config
            .validate()
            .map_err(|source| ConfigError::Invalid { path, source })?;
        Ok(config)
    }

    /// Checks every block. Call again after applying command line overrides.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if !is_identifier(&self.run_id) {
            return Err(invalid(
                "run_id",
                "use letters, digits, '.', '_' or '-' only",
            ));
        }
        self.games.validate()?;
        self.outputs.validate(&self.run_id)?;
        validate_agents(&self.agents)?;
        self.metrics.validate(&self.agents)?;
        self.logging.validate()
    }

    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: self.outputs.resolve(&self.outputs.jsonl, &self.run_id),
            summary_md: self.outputs.resolve(&self.outputs.summary_md, &self.run_id),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GamesConfig {
    /// Seed for the deal stream; `None` plays from seed 0.
    pub seed: Option<u64>,
    pub count: usize,
    /// Consecutive all-pass redeals tolerated before a game is abandoned.
    #[serde(default = "GamesConfig::default_max_redeals")]
    pub max_redeals: u32,
    /// Seat orders each deal is replayed under.
    #[serde(default = "GamesConfig::default_permutations")]
    pub permutations: usize,
}

impl GamesConfig {
    const DEFAULT_MAX_REDEALS: u32 = 10;

    fn default_max_redeals() -> u32 {
        Self::DEFAULT_MAX_REDEALS
    }

    fn default_permutations() -> usize {
        Seat::LOOP.len()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.count == 0 {
            return Err(invalid("games.count", "play at least one game"));
        }
        let orders = SeatPermutations::max();
        if !(1..=orders).contains(&self.permutations) {
            return Err(invalid(
                "games.permutations",
                format!("four seats have 1 to {orders} orders, got {}", self.permutations),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    pub name: String,
    pub difficulty: AgentDifficulty,
    /// Replaces the difficulty's search budget.
    #[serde(default)]
    pub search: Option<SearchOverrides>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentDifficulty {
    Easy,
    Normal,
    Hard,
}

impl AgentDifficulty {
    pub fn difficulty(self) -> Difficulty {
        match self {
            AgentDifficulty::Easy => Difficulty::Easy,
            AgentDifficulty::Normal => Difficulty::Normal,
            AgentDifficulty::Hard => Difficulty::Hard,
        }
    }

    /// Easy agents play from the evaluator alone.
    fn searches(self) -> bool {
        self != AgentDifficulty::Easy
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SearchOverrides {
    pub simulations: u32,
    pub time_limit_ms: u64,
    /// Determinized worlds per decision.
    pub worlds: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn resolve(&self, template: &str, run_id: &str) -> PathBuf {
        PathBuf::from(template.replace(RUN_ID_TOKEN, run_id))
    }

    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        if self.jsonl.trim().is_empty() {
            return Err(invalid("outputs.jsonl", "path is empty"));
        }
        if self.summary_md.trim().is_empty() {
            return Err(invalid("outputs.summary_md", "path is empty"));
        }
        if self.resolve(&self.jsonl, run_id) == self.resolve(&self.summary_md, run_id) {
            return Err(invalid(
                "outputs",
                "game rows and the summary must go to different files",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Agent the others are compared against; no comparison when unset.
    #[serde(default)]
    pub baseline: Option<String>,
    /// Mean decision time above which an agent is flagged in the summary.
    #[serde(default = "MetricsConfig::default_latency_budget_ms")]
    pub latency_budget_ms: u64,
}

impl MetricsConfig {
    const DEFAULT_LATENCY_BUDGET_MS: u64 = 1_200;

    fn default_latency_budget_ms() -> u64 {
        Self::DEFAULT_LATENCY_BUDGET_MS
    }

    fn validate(&self, agents: &[AgentConfig]) -> Result<(), ValidationError> {
        if let Some(baseline) = &self.baseline
            && agents.iter().all(|agent| &agent.name != baseline)
        {
            return Err(invalid(
                "metrics.baseline",
                format!("no agent is named '{baseline}'"),
            ));
        }
        if self.latency_budget_ms == 0 {
            return Err(invalid("metrics.latency_budget_ms", "budget must be positive"));
        }
        Ok(())
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            baseline: None,
            latency_budget_ms: Self::DEFAULT_LATENCY_BUDGET_MS,
        }
    }
}

/// Structured logging is off unless enabled.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "LoggingConfig::default_level")]
    pub tracing_level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        Level::INFO.as_str().to_ascii_lowercase()
    }

    /// Configured level; `INFO` when the text does not name one.
    pub fn level(&self) -> Level {
        Level::from_str(self.tracing_level.trim()).unwrap_or(Level::INFO)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match Level::from_str(self.tracing_level.trim()) {
            Ok(_) => Ok(()),
            Err(_) => Err(invalid(
                "logging.tracing_level",
                format!("'{}' is not a tracing level", self.tracing_level),
            )),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: Self::default_level(),
        }
    }
}

fn validate_agents(agents: &[AgentConfig]) -> Result<(), ValidationError> {
    if agents.len() != Seat::LOOP.len() {
        return Err(invalid(
            "agents",
            format!("one agent per seat is required, found {}", agents.len()),
        ));
    }
    let mut names = HashSet::new();
    for agent in agents {
        let field = format!("agents.{}", agent.name);
        if !is_identifier(&agent.name) {
            return Err(invalid(field, "use letters, digits, '.', '_' or '-' only"));
        }
        if !names.insert(agent.name.as_str()) {
            return Err(invalid(field, "name is used twice"));
        }
        let Some(search) = agent.search else {
            continue;
        };
        if !agent.difficulty.searches() {
            return Err(invalid(
                format!("{field}.search"),
                "easy agents never search",
            ));
        }
        if search.simulations == 0 || search.worlds == 0 || search.time_limit_ms == 0 {
            return Err(invalid(
                format!("{field}.search"),
                "simulations, worlds and time_limit_ms must be positive",
            ));
        }
    }
    Ok(())
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

impl ResolvedOutputs {
    /// Directory of the summary file; telemetry is written beside it.
    pub fn summary_dir(&self) -> PathBuf {
        match self.summary_md.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}
