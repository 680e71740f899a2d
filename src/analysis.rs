//! Cross-run aggregator: statistics over every persisted test record.
//!
//! Order-independent by construction — records are grouped by test identity
//! and by (provider, model) key into sorted maps, so repeated scans over an
//! unchanged store produce byte-identical analyses regardless of arrival
//! order. Never persisted as a source of truth: always recomputable from the
//! records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::TestRunRecord;

/// Maximum score range (max - min) across models for a test to count as
/// consistent.
pub const CONSISTENCY_VARIANCE_THRESHOLD: u8 = 10;

// ============================================================================
// Analysis types
// ============================================================================

/// One model's result on one test, with the validation detail the report
/// needs for its issues section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelScore {
    /// `provider/model` key.
    pub model: String,
    pub score: u8,
    pub passed: bool,
    pub expected_matched: usize,
    pub expected_missing: Vec<String>,
    pub forbidden_found: Vec<String>,
    pub forbidden_absent: usize,
    pub error: Option<String>,
}

/// Per-test statistics across every model that ran it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStats {
    pub name: String,
    /// Sorted by descending score, then model key.
    pub results: Vec<ModelScore>,
    pub average: f64,
    pub min: u8,
    pub max: u8,
    /// Score range (max - min) across models.
    pub spread: u8,
    pub pass_rate: f64,
    /// `spread <= CONSISTENCY_VARIANCE_THRESHOLD`.
    pub consistent: bool,
}

/// Per-(provider, model) statistics across all of that model's records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub average: f64,
    pub pass_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_records: usize,
    pub models_tested: Vec<String>,
    /// Mean over every individual score.
    pub average_score: f64,
    /// AND over all per-test consistency flags. False when there is no data.
    pub consistent: bool,
}

/// The full cross-model picture, computed on demand from whatever records
/// exist right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossModelAnalysis {
    pub by_test: BTreeMap<String, TestStats>,
    pub by_model: BTreeMap<String, ModelStats>,
    pub overall: OverallStats,
}

impl CrossModelAnalysis {
    /// The distinguished result for an empty record store. Downstream gating
    /// treats absence of evidence as failure rather than crashing.
    pub fn no_data() -> Self {
        CrossModelAnalysis {
            by_test: BTreeMap::new(),
            by_model: BTreeMap::new(),
            overall: OverallStats {
                total_records: 0,
                models_tested: Vec::new(),
                average_score: 0.0,
                consistent: false,
            },
        }
    }

    pub fn has_data(&self) -> bool {
        self.overall.total_records > 0
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Compute the cross-model analysis over all given records.
pub fn analyze(records: &[TestRunRecord]) -> CrossModelAnalysis {
    if records.is_empty() {
        return CrossModelAnalysis::no_data();
    }

    let mut by_test: BTreeMap<String, Vec<&TestRunRecord>> = BTreeMap::new();
    let mut by_model: BTreeMap<String, Vec<&TestRunRecord>> = BTreeMap::new();

    for record in records {
        by_test
            .entry(record.test_id.clone())
            .or_default()
            .push(record);
        by_model
            .entry(model_key(record))
            .or_default()
            .push(record);
    }

    let by_test: BTreeMap<String, TestStats> = by_test
        .into_iter()
        .map(|(test_id, group)| (test_id, test_stats(&group)))
        .collect();

    let by_model: BTreeMap<String, ModelStats> = by_model
        .into_iter()
        .map(|(key, group)| (key, model_stats(&group)))
        .collect();

    let average_score =
        records.iter().map(|r| r.score as f64).sum::<f64>() / records.len() as f64;
    let consistent = by_test.values().all(|t| t.consistent);

    CrossModelAnalysis {
        overall: OverallStats {
            total_records: records.len(),
            models_tested: by_model.keys().cloned().collect(),
            average_score,
            consistent,
        },
        by_test,
        by_model,
    }
}

fn model_key(record: &TestRunRecord) -> String {
    format!("{}/{}", record.provider, record.model)
}

fn test_stats(group: &[&TestRunRecord]) -> TestStats {
    let mut results: Vec<ModelScore> = group
        .iter()
        .map(|r| ModelScore {
            model: model_key(r),
            score: r.score,
            passed: r.passed,
            expected_matched: r.validation.expected_matches.len(),
            expected_missing: r.validation.expected_missing.clone(),
            forbidden_found: r.validation.forbidden_found.clone(),
            forbidden_absent: r.validation.forbidden_missing.len(),
            error: r.error.clone(),
        })
        .collect();
    results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.model.cmp(&b.model)));

    let min = group.iter().map(|r| r.score).min().unwrap_or(0);
    let max = group.iter().map(|r| r.score).max().unwrap_or(0);
    let spread = max - min;
    let passed = group.iter().filter(|r| r.passed).count();

    TestStats {
        name: group[0].test_name.clone(),
        results,
        average: group.iter().map(|r| r.score as f64).sum::<f64>() / group.len() as f64,
        min,
        max,
        spread,
        pass_rate: passed as f64 * 100.0 / group.len() as f64,
        consistent: spread <= CONSISTENCY_VARIANCE_THRESHOLD,
    }
}

fn model_stats(group: &[&TestRunRecord]) -> ModelStats {
    let passed = group.iter().filter(|r| r.passed).count();
    ModelStats {
        total: group.len(),
        passed,
        failed: group.len() - passed,
        average: group.iter().map(|r| r.score as f64).sum::<f64>() / group.len() as f64,
        pass_rate: passed as f64 * 100.0 / group.len() as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValidationOutcome;
    use chrono::Utc;

    fn record(test_id: &str, provider: &str, model: &str, score: u8) -> TestRunRecord {
        TestRunRecord {
            test_id: test_id.into(),
            test_name: format!("name of {}", test_id),
            language: "typescript".into(),
            framework: "react".into(),
            provider: provider.into(),
            model: model.into(),
            score,
            passed: score >= 90,
            duration_ms: 5,
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
    fn empty_input_returns_no_data() {
        let analysis = analyze(&[]);
        assert!(!analysis.has_data());
        assert!(!analysis.overall.consistent);
        assert_eq!(analysis.overall.average_score, 0.0);
    }

    #[test]
    fn spread_of_10_is_consistent() {
        let records = vec![
            record("t1", "anthropic", "a", 90),
            record("t1", "openai", "b", 95),
            record("t1", "google", "c", 85),
        ];
        let analysis = analyze(&records);
        let stats = &analysis.by_test["t1"];
        assert_eq!(stats.spread, 10);
        assert!(stats.consistent);
    }

    #[test]
    fn spread_of_30_is_inconsistent() {
        let records = vec![
            record("t1", "anthropic", "a", 90),
            record("t1", "ollama", "b", 60),
        ];
        let analysis = analyze(&records);
        assert!(!analysis.by_test["t1"].consistent);
        assert!(!analysis.overall.consistent);
    }

    #[test]
    fn two_models_92_and_100() {
        let records = vec![
            record("t1", "anthropic", "a", 92),
            record("t1", "openai", "b", 100),
        ];
        let analysis = analyze(&records);
        let stats = &analysis.by_test["t1"];
        assert_eq!(stats.average, 96.0);
        assert_eq!(stats.spread, 8);
        assert!(stats.consistent);
        assert_eq!(stats.pass_rate, 100.0);
    }

    #[test]
    fn global_consistent_is_and_over_tests() {
        let records = vec![
            record("t1", "anthropic", "a", 95),
            record("t1", "openai", "b", 93),
            record("t2", "anthropic", "a", 95),
            record("t2", "openai", "b", 40),
        ];
        let analysis = analyze(&records);
        assert!(analysis.by_test["t1"].consistent);
        assert!(!analysis.by_test["t2"].consistent);
        assert!(!analysis.overall.consistent);
    }

    #[test]
    fn per_model_averages() {
        let records = vec![
            record("t1", "openai", "b", 100),
            record("t2", "openai", "b", 80),
            record("t1", "anthropic", "a", 90),
        ];
        let analysis = analyze(&records);
        assert_eq!(analysis.by_model["openai/b"].average, 90.0);
        assert_eq!(analysis.by_model["openai/b"].total, 2);
        assert_eq!(analysis.by_model["anthropic/a"].passed, 1);
        assert_eq!(
            analysis.overall.models_tested,
            vec!["anthropic/a".to_string(), "openai/b".to_string()]
        );
    }

    #[test]
    fn analysis_is_order_independent_and_idempotent() {
        let mut records = vec![
            record("t2", "openai", "b", 80),
            record("t1", "anthropic", "a", 90),
            record("t1", "openai", "b", 100),
        ];
        let first = analyze(&records);
        records.reverse();
        let second = analyze(&records);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_results_sorted_by_descending_score() {
        let records = vec![
            record("t1", "anthropic", "a", 70),
            record("t1", "openai", "b", 100),
            record("t1", "google", "c", 85),
        ];
        let analysis = analyze(&records);
        let scores: Vec<u8> = analysis.by_test["t1"]
            .results
            .iter()
            .map(|m| m.score)
            .collect();
        assert_eq!(scores, vec![100, 85, 70]);
    }
}
