//! Append-only result store.
//!
//! Each run gets a fresh namespace `<results>/<provider>/<model>/<run-key>/`
//! where the run key is a UTC timestamp plus a short random suffix, so
//! concurrent runs of the same (provider, model) pair never collide. Records
//! are written once per completed test — no update or delete exists, history
//! only grows. Readers enumerate whatever exists right now and must not
//! assume a stable snapshot.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::error::HarnessError;
use crate::types::{RunSummary, TestRunRecord};

/// Write handle for one run's namespace.
pub struct ResultStore {
    run_dir: PathBuf,
}

impl ResultStore {
    /// Create the namespace for a new run.
    pub fn for_run(
        results_dir: &Path,
        provider: &str,
        model: &str,
    ) -> Result<Self, HarnessError> {
        let run_key = format!(
            "{}-{}",
            Utc::now().format("%Y%m%dT%H%M%SZ"),
            &Uuid::new_v4().simple().to_string()[..8]
        );
        let run_dir = results_dir
            .join(provider)
            .join(sanitize_component(model))
            .join(run_key);
        std::fs::create_dir_all(run_dir.join("tests"))?;
        Ok(ResultStore { run_dir })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Persist one test record. `ordinal` keeps registry order visible in the
    /// filename. Refuses to overwrite: records are write-once.
    pub fn append_record(
        &self,
        ordinal: usize,
        record: &TestRunRecord,
    ) -> Result<(), HarnessError> {
        let path = self.run_dir.join("tests").join(format!(
            "{:03}-{}.json",
            ordinal,
            sanitize_component(&record.test_id)
        ));
        write_new(&path, record)
    }

    /// Persist the run summary alongside the records.
    pub fn append_summary(&self, summary: &RunSummary) -> Result<(), HarnessError> {
        write_new(&self.run_dir.join("summary.json"), summary)
    }
}

fn write_new<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), HarnessError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| {
            HarnessError::Store(format!("cannot create {}: {}", path.display(), e))
        })?;
    let json = serde_json::to_string_pretty(value)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Enumerate every persisted test record under the results directory.
///
/// Files that fail to parse (for example, half-written by a run still in
/// progress) are warned about and skipped, matching the tolerant read policy
/// of the downstream tooling. Paths are sorted so repeated scans over an
/// unchanged store yield records in the same order.
pub fn load_all_records(results_dir: &Path) -> Result<Vec<TestRunRecord>, HarnessError> {
    let pattern = format!("{}/**/tests/*.json", results_dir.display());
    let paths = glob::glob(&pattern)
        .map_err(|e| HarnessError::Store(format!("bad results glob '{}': {}", pattern, e)))?;

    let mut files: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
    files.sort();

    let mut records = Vec::with_capacity(files.len());
    for path in files {
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Skipping unreadable record: {}", e);
                continue;
            }
        };
        match serde_json::from_str::<TestRunRecord>(&content) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Skipping unparseable record: {}", e);
            }
        }
    }
    Ok(records)
}

/// Keep path components filesystem-safe; model tags like `llama3.1:8b` or
/// `accounts/fireworks/x` contain separators.
fn sanitize_component(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c => c,
        })
        .collect()
}
