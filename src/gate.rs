//! Threshold gate: the final pass/fail decision consumed by CI automation.
//!
//! Absence of evidence fails the gate: an empty record store produces a
//! distinguished no-data analysis, and no data means no pass.

use crate::analysis::CrossModelAnalysis;
use crate::scorer::PASS_SCORE_THRESHOLD;

/// Outcome of the gate, with every failed check enumerated.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Pass,
    Fail(Vec<String>),
}

impl GateDecision {
    pub fn passed(&self) -> bool {
        matches!(self, GateDecision::Pass)
    }
}

/// Decide pass/fail for the analysis against a minimum score (default 90).
///
/// Pass iff the store has data, the overall average meets the minimum, and
/// every test is consistent across models. Per-model shortfalls are listed as
/// additional reasons so the CI log names the offenders directly.
pub fn decide(analysis: &CrossModelAnalysis, min_score: f64) -> GateDecision {
    if !analysis.has_data() {
        return GateDecision::Fail(vec![
            "no persisted test records found; nothing has been measured".to_string(),
        ]);
    }

    let mut reasons = Vec::new();
    let overall = &analysis.overall;

    if overall.average_score < min_score {
        reasons.push(format!(
            "overall average score {:.1}/100 is below threshold {:.0}/100",
            overall.average_score, min_score
        ));
    }

    if !overall.consistent {
        let inconsistent: Vec<&str> = analysis
            .by_test
            .iter()
            .filter(|(_, s)| !s.consistent)
            .map(|(id, _)| id.as_str())
            .collect();
        reasons.push(format!(
            "cross-model consistency not met for: {}",
            inconsistent.join(", ")
        ));
    }

    for (model, stats) in &analysis.by_model {
        if stats.average < min_score {
            reasons.push(format!(
                "{} average score {:.1}/100 is below threshold {:.0}/100",
                model, stats.average, min_score
            ));
        }
        if stats.pass_rate < min_score {
            reasons.push(format!(
                "{} pass rate {:.0}% is below threshold {:.0}%",
                model, stats.pass_rate, min_score
            ));
        }
    }

    // The authoritative pass condition is the global one; per-model reasons
    // are reporting detail and never flip a passing gate on their own.
    if overall.average_score >= min_score && overall.consistent {
        GateDecision::Pass
    } else {
        GateDecision::Fail(reasons)
    }
}

/// The default gate at the standard pass threshold of 90.
pub fn decide_default(analysis: &CrossModelAnalysis) -> GateDecision {
    decide(analysis, PASS_SCORE_THRESHOLD as f64)
}
