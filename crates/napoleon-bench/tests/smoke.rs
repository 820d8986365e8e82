use std::fs;
use std::path::Path;

use napoleon_bench::config::BenchmarkConfig;
use napoleon_bench::tournament::TournamentRunner;
use sha2::{Digest, Sha256};
use tempfile::tempdir;

fn load_config(output_dir: &Path) -> BenchmarkConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
games:
  seed: 4242
  count: 2
  permutations: 2
agents:
  - name: "baseline"
    difficulty: "easy"
  - name: "easy_2"
    difficulty: "easy"
  - name: "searcher"
    difficulty: "normal"
    search:
      simulations: 12
      time_limit_ms: 60000
      worlds: 2
  - name: "easy_3"
    difficulty: "easy"
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
metrics:
  baseline: "baseline"
logging:
  enable_structured: false
"#,
        jsonl = output_dir.join("games.jsonl").display(),
        summary = output_dir.join("summary.md").display(),
    );

    let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

/// Hashes the JSONL with wall-clock fields zeroed.
fn normalized_digest(jsonl: &str) -> String {
    let mut normalized = String::new();
    for line in jsonl.lines() {
        let mut value: serde_json::Value = serde_json::from_str(line).expect("row decodes to JSON");
        if let Some(obj) = value.as_object_mut()
            && let Some(speed) = obj.get_mut("avg_ms_per_decision")
        {
            *speed = serde_json::Value::from(0);
        }
        normalized.push_str(&serde_json::to_string(&value).expect("re-serialize normalized row"));
        normalized.push('\n');
    }

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

#[test]
fn tournament_smoke_test_produces_stable_jsonl_hash() {
    let mut digests = Vec::new();
    for _ in 0..2 {
        let dir = tempdir().expect("temp dir");
        let config = load_config(dir.path());
        let outputs = config.resolved_outputs();

        let runner = TournamentRunner::new(config, outputs).expect("runner created");
        let summary = runner.run().expect("tournament completes");

        assert_eq!(summary.games_played, 2);
        assert_eq!(summary.permutations, 2);
        assert_eq!(summary.rows_written, 4);
        assert!(summary.summary_path.exists(), "summary markdown missing");

        let jsonl = fs::read_to_string(&summary.jsonl_path).expect("jsonl readable");
        assert_eq!(jsonl.lines().count(), 4);
        for line in jsonl.lines() {
            let row: serde_json::Value = serde_json::from_str(line).expect("row decodes");
            let abandoned = row["abandoned"].as_bool().expect("abandoned flag");
            let deltas: Vec<i64> = row["deltas"]
                .as_array()
                .expect("deltas array")
                .iter()
                .map(|d| d.as_i64().expect("integer delta"))
                .collect();
            assert_eq!(deltas.len(), 4);
            if abandoned {
                assert!(deltas.iter().all(|d| *d == 0));
            } else {
                assert!(row["napoleon_won"].is_boolean());
            }
        }

        let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
        assert!(markdown.contains("| searcher |"));
        assert!(markdown.contains("Compared with `baseline`"));

        digests.push(normalized_digest(&jsonl));
    }

    assert_eq!(
        digests[0], digests[1],
        "same seed must replay identical tournaments"
    );
}
