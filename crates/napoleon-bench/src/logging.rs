//! JSON telemetry for a tournament run.
//!
//! Engine and AI events are filtered at the configured level; everything else only
//! reports warnings. `RUST_LOG` replaces the whole filter.

use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{Level, event};
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use crate::config::{LoggingConfig, ResolvedOutputs};

pub const TELEMETRY_FILE: &str = "telemetry.jsonl";

/// Targets the tournament reports on.
const TARGETS: [&str; 3] = ["napoleon::engine", "napoleon::ai", "napoleon_bench"];

/// Keeps the background writer alive; pending lines are flushed on drop.
pub struct Telemetry {
    _writer: WorkerGuard,
    pub path: PathBuf,
}

/// Opens `telemetry.jsonl` beside the summary and installs the subscriber. Returns `None`
/// when structured logging is disabled.
pub fn init_telemetry(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
    run_id: &str,
) -> Result<Option<Telemetry>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let dir = outputs.summary_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("creating telemetry directory {}", dir.display()))?;
    let path = dir.join(TELEMETRY_FILE);
    let file = File::create(&path)
        .with_context(|| format!("creating telemetry file {}", path.display()))?;
    let (writer, guard) = NonBlockingBuilder::default().lossy(false).finish(file);

    let level = logging.level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // Test binaries may have installed one already; their events go there instead.
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        event!(
            target: "napoleon_bench::telemetry",
            Level::INFO,
            run_id,
            level = %level,
            "telemetry started"
        );
    }

    Ok(Some(Telemetry {
        _writer: guard,
        path,
    }))
}

/// Filter text for `level`: the tournament's own targets at that level, others at `warn`.
pub fn filter_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.join(",")
}
