//! Shared value types for the harness.
//!
//! Persisted types serialize as camelCase JSON; the on-disk schema is consumed
//! by CI tooling downstream, so field names are part of the contract. Records
//! are fixed-field structs on purpose: a missing or misspelled field is a
//! compile error here, not a silent `None` at aggregation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Test specification
// ============================================================================

/// One prompt plus its expected/forbidden-pattern specification.
///
/// Immutable, defined at configuration time in the registry. Pattern fields
/// hold the regex source strings; compiled forms live in the registry so a
/// malformed pattern is caught at load, never mid-run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    pub name: String,
    pub language: String,
    pub framework: String,
    pub prompt: String,
    pub expected_patterns: Vec<String>,
    pub forbidden_patterns: Vec<String>,
    /// Rule files (relative to the rules dir) concatenated into the system prompt.
    pub rule_refs: Vec<String>,
}

// ============================================================================
// Scoring output
// ============================================================================

/// Deterministic partition of a test case's patterns against one output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    /// Expected patterns found in the output.
    pub expected_matches: Vec<String>,
    /// Expected patterns absent from the output.
    pub expected_missing: Vec<String>,
    /// Forbidden patterns found in the output.
    pub forbidden_found: Vec<String>,
    /// Forbidden patterns absent from the output (the good case).
    pub forbidden_missing: Vec<String>,
}

// ============================================================================
// Persisted records
// ============================================================================

/// One (test case x provider x model) execution outcome. Write-once: the
/// store exposes no update or delete, so a persisted record never mutates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunRecord {
    pub test_id: String,
    pub test_name: String,
    pub language: String,
    pub framework: String,
    pub provider: String,
    pub model: String,
    /// Conformance score, 0..=100.
    pub score: u8,
    /// Always `score >= PASS_SCORE_THRESHOLD`.
    pub passed: bool,
    pub duration_ms: u64,
    /// Raw provider output, kept verbatim for the comparison report.
    pub output: String,
    pub validation: ValidationOutcome,
    /// Populated when the provider call failed; score is 0 in that case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate over all records of one (provider, model, suite) execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub provider: String,
    pub model: String,
    pub test_suite: String,
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    /// Mean score across all tests in the run.
    pub average_score: f64,
    /// Percentage of tests that passed, 0.0..=100.0.
    pub pass_rate: f64,
    pub tests: Vec<TestRunRecord>,
    pub timestamp: DateTime<Utc>,
}

impl RunSummary {
    /// Build a summary from the records of one completed run.
    pub fn from_records(
        provider: &str,
        model: &str,
        test_suite: &str,
        tests: Vec<TestRunRecord>,
    ) -> Self {
        let total_tests = tests.len();
        let passed = tests.iter().filter(|t| t.passed).count();
        let failed = total_tests - passed;
        let (average_score, pass_rate) = if total_tests == 0 {
            (0.0, 0.0)
        } else {
            (
                tests.iter().map(|t| t.score as f64).sum::<f64>() / total_tests as f64,
                passed as f64 * 100.0 / total_tests as f64,
            )
        };

        RunSummary {
            provider: provider.to_string(),
            model: model.to_string(),
            test_suite: test_suite.to_string(),
            total_tests,
            passed,
            failed,
            average_score,
            pass_rate,
            tests,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: u8, passed: bool) -> TestRunRecord {
        TestRunRecord {
            test_id: "t1".into(),
            test_name: "t1".into(),
            language: "typescript".into(),
            framework: "react".into(),
            provider: "openai".into(),
            model: "gpt-test".into(),
            score,
            passed,
            duration_ms: 10,
            output: String::new(),
            validation: ValidationOutcome {
                expected_matches: vec![],
                expected_missing: vec![],
                forbidden_found: vec![],
                forbidden_missing: vec![],
            },
            error: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn summary_counts_and_averages() {
        let summary = RunSummary::from_records(
            "openai",
            "gpt-test",
            "critical",
            vec![record(100, true), record(90, true), record(50, false)],
        );
        assert_eq!(summary.total_tests, 3);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.average_score, 80.0);
        assert!((summary.pass_rate - 66.666).abs() < 0.01);
    }

    #[test]
    fn summary_of_empty_run_is_zeroed() {
        let summary = RunSummary::from_records("openai", "gpt-test", "critical", vec![]);
        assert_eq!(summary.total_tests, 0);
        assert_eq!(summary.average_score, 0.0);
        assert_eq!(summary.pass_rate, 0.0);
    }

    #[test]
    fn record_serializes_camel_case() {
        let json = serde_json::to_value(record(86, false)).unwrap();
        assert!(json.get("testId").is_some());
        assert!(json.get("durationMs").is_some());
        assert!(json.get("validation").is_some());
        // error is None, so the key is omitted entirely
        assert!(json.get("error").is_none());
    }
}
