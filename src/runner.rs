//! Test runner: orchestrates one suite against one provider/model pair.
//!
//! Test cases execute sequentially in registry order — duration accounting
//! stays simple and a single credential's rate limit is never hammered.
//! Persistence is incremental per completed test, so an interrupt aborts the
//! remaining cases without touching what is already on disk.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;

use crate::error::HarnessError;
use crate::provider::Provider;
use crate::registry::{RegisteredCase, Registry};
use crate::rules;
use crate::scorer;
use crate::store::ResultStore;
use crate::types::{RunSummary, TestRunRecord};

/// Everything a run needs besides the provider itself.
pub struct RunContext<'a> {
    pub registry: &'a Registry,
    pub store: &'a ResultStore,
    pub rules_dir: &'a Path,
}

/// Run every test case of the named suite against one model.
///
/// A provider fault on one test case is recorded as a failed record (score 0,
/// error populated) and the suite continues — one backend hiccup must not
/// abort the whole run. Configuration problems (unknown suite) abort before
/// the first generation call.
pub async fn run_suite(
    provider: &dyn Provider,
    model: &str,
    suite_name: &str,
    ctx: &RunContext<'_>,
) -> Result<RunSummary, HarnessError> {
    let cases = ctx.registry.suite(suite_name)?;
    let total = cases.len();
    tracing::info!(
        provider = provider.name(),
        model,
        suite = suite_name,
        tests = total,
        "Starting suite run"
    );

    let mut records = Vec::with_capacity(total);
    for (ordinal, case) in cases.iter().enumerate() {
        let record = run_case(provider, model, case, ctx.rules_dir).await;

        tracing::info!(
            "[{}/{}] {}: {} (score {}, {}ms)",
            ordinal + 1,
            total,
            record.test_id,
            if record.passed { "PASS" } else { "FAIL" },
            record.score,
            record.duration_ms,
        );
        if let Some(ref error) = record.error {
            tracing::warn!(test = %record.test_id, "Provider call failed: {}", error);
        }

        ctx.store.append_record(ordinal, &record)?;
        records.push(record);
    }

    let summary = RunSummary::from_records(provider.name(), model, suite_name, records);
    ctx.store.append_summary(&summary)?;
    Ok(summary)
}

/// Execute one test case: resolve rules, invoke the provider, score.
async fn run_case(
    provider: &dyn Provider,
    model: &str,
    case: &RegisteredCase,
    rules_dir: &Path,
) -> TestRunRecord {
    let system_prompt = rules::load_rule_content(rules_dir, &case.case.rule_refs);

    let started = Instant::now();
    let invocation = provider
        .invoke(model, &system_prompt, &case.case.prompt)
        .await;
    let duration_ms = started.elapsed().as_millis() as u64;

    let (score, passed, output, validation, error) = match invocation {
        Ok(output) => {
            let scored = scorer::score_output(&output, &case.expected, &case.forbidden);
            (scored.score, scored.passed, output, scored.validation, None)
        }
        Err(e) => (
            0,
            false,
            String::new(),
            scorer::empty_outcome(&case.expected, &case.forbidden),
            Some(e.to_string()),
        ),
    };

    TestRunRecord {
        test_id: case.case.id.clone(),
        test_name: case.case.name.clone(),
        language: case.case.language.clone(),
        framework: case.case.framework.clone(),
        provider: provider.name().to_string(),
        model: model.to_string(),
        score,
        passed,
        duration_ms,
        output,
        validation,
        error,
        timestamp: Utc::now(),
    }
}
