//! End-to-end pipeline test: registry -> runner -> store -> analysis ->
//! report -> gate, with a scripted provider standing in for the network.

use std::path::Path;

use async_trait::async_trait;

use conformance_harness::analysis::analyze;
use conformance_harness::gate::{decide_default, GateDecision};
use conformance_harness::provider::Provider;
use conformance_harness::registry::Registry;
use conformance_harness::report::render_report;
use conformance_harness::runner::{run_suite, RunContext};
use conformance_harness::store::{load_all_records, ResultStore};
use conformance_harness::HarnessError;

/// Emits output satisfying every pattern of the `python` suite's cases.
struct ConformantPython;

#[async_trait]
impl Provider for ConformantPython {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn invoke(
        &self,
        _model: &str,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<String, HarnessError> {
        Ok(r#"
from typing import Iterable
from pydantic import BaseModel
from fastapi import FastAPI

app = FastAPI()

class User(BaseModel):
    name: str

@app.post("/users")
async def create_user(user: User) -> User:
    return user

def group_totals(rows: Iterable[tuple[str, int]]) -> dict[str, int]:
    totals: dict[str, int] = {}
    for account, amount in rows:
        totals[account] = totals.get(account, 0) + amount
    return totals
"#
        .to_string())
    }
}

/// Same shape, but leaks a `print(` call and skips type hints.
struct SloppyPython;

#[async_trait]
impl Provider for SloppyPython {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn invoke(
        &self,
        _model: &str,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<String, HarnessError> {
        Ok("def group_totals(rows):\n    print(rows)\n    return {}\n".to_string())
    }
}

async fn run_model(
    results_dir: &Path,
    rules_dir: &Path,
    provider: &dyn Provider,
    model: &str,
) {
    let registry = Registry::load().unwrap();
    let store = ResultStore::for_run(results_dir, provider.name(), model).unwrap();
    let ctx = RunContext {
        registry: &registry,
        store: &store,
        rules_dir,
    };
    run_suite(provider, model, "python", &ctx).await.unwrap();
}

#[tokio::test]
async fn two_model_pipeline_produces_analysis_report_and_gate_decision() {
    let dir = tempfile::tempdir().unwrap();
    let results_dir = dir.path().join("results");

    run_model(&results_dir, dir.path(), &ConformantPython, "good-model").await;
    run_model(&results_dir, dir.path(), &SloppyPython, "sloppy-model").await;

    let records = load_all_records(&results_dir).unwrap();
    assert_eq!(records.len(), 4); // 2 models x 2 python-suite tests

    let analysis = analyze(&records);
    assert!(analysis.has_data());
    assert_eq!(analysis.by_model.len(), 2);
    assert_eq!(analysis.by_test.len(), 2);

    // The sloppy model drags every test apart, so the gate must fail.
    assert!(!analysis.overall.consistent);
    let decision = decide_default(&analysis);
    assert!(!decision.passed());
    match decision {
        GateDecision::Fail(reasons) => {
            assert!(reasons.iter().any(|r| r.contains("consistency")));
        }
        GateDecision::Pass => unreachable!(),
    }

    // Report renders all sections and names the offender's issues.
    let report = render_report(&analysis);
    assert!(report.contains("## Test-by-Test Analysis"));
    assert!(report.contains("scripted/sloppy-model"));
    assert!(report.contains("Found forbidden patterns"));
    assert!(report.contains("**Result: FAIL**"));
}

#[tokio::test]
async fn single_conformant_model_passes_the_gate() {
    let dir = tempfile::tempdir().unwrap();
    let results_dir = dir.path().join("results");

    run_model(&results_dir, dir.path(), &ConformantPython, "good-model").await;

    let records = load_all_records(&results_dir).unwrap();
    let analysis = analyze(&records);

    // One model per test: spread 0, every test consistent.
    assert!(analysis.overall.consistent);
    assert!(analysis.overall.average_score >= 90.0);
    assert!(decide_default(&analysis).passed());
}
