//! Conformance scorer: pure function from (output, patterns) to a score.
//!
//! No I/O and no clock access, so every property here is unit-testable without
//! network or filesystem doubles. Identical inputs always yield the identical
//! `ScoredOutcome`.

use regex::Regex;

use crate::types::ValidationOutcome;

/// Minimum score for a test to count as passed.
pub const PASS_SCORE_THRESHOLD: u8 = 90;

/// Weight of the expected-pattern portion of the score.
pub const EXPECTED_WEIGHT: f64 = 70.0;

/// Weight of the forbidden-pattern portion of the score.
pub const FORBIDDEN_WEIGHT: f64 = 30.0;

/// Result of scoring one output against one test case's patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredOutcome {
    /// 0..=100.
    pub score: u8,
    /// Always `score >= PASS_SCORE_THRESHOLD`.
    pub passed: bool,
    pub validation: ValidationOutcome,
}

/// Score one generated output against expected and forbidden patterns.
///
/// Each expected pattern contributes its share of 70 points when it matches;
/// each forbidden pattern contributes its share of 30 points when it is
/// absent. An empty pattern list yields full credit for its portion —
/// "nothing required" and "nothing forbidden" are trivially satisfied, and
/// this keeps the arithmetic well-defined without a division by zero.
pub fn score_output(output: &str, expected: &[Regex], forbidden: &[Regex]) -> ScoredOutcome {
    let mut validation = ValidationOutcome {
        expected_matches: Vec::new(),
        expected_missing: Vec::new(),
        forbidden_found: Vec::new(),
        forbidden_missing: Vec::new(),
    };

    for pattern in expected {
        if pattern.is_match(output) {
            validation.expected_matches.push(pattern.as_str().to_string());
        } else {
            validation.expected_missing.push(pattern.as_str().to_string());
        }
    }

    for pattern in forbidden {
        if pattern.is_match(output) {
            validation.forbidden_found.push(pattern.as_str().to_string());
        } else {
            validation.forbidden_missing.push(pattern.as_str().to_string());
        }
    }

    let expected_weight = if expected.is_empty() {
        EXPECTED_WEIGHT
    } else {
        EXPECTED_WEIGHT * validation.expected_matches.len() as f64 / expected.len() as f64
    };

    let forbidden_weight = if forbidden.is_empty() {
        FORBIDDEN_WEIGHT
    } else {
        FORBIDDEN_WEIGHT * validation.forbidden_missing.len() as f64 / forbidden.len() as f64
    };

    let score = (expected_weight + forbidden_weight).round().clamp(0.0, 100.0) as u8;

    ScoredOutcome {
        score,
        passed: score >= PASS_SCORE_THRESHOLD,
        validation,
    }
}

/// Validation outcome for a test that never produced output (provider fault):
/// every expected pattern is missing, every forbidden pattern is absent.
pub fn empty_outcome(expected: &[Regex], forbidden: &[Regex]) -> ValidationOutcome {
    ValidationOutcome {
        expected_matches: Vec::new(),
        expected_missing: expected.iter().map(|p| p.as_str().to_string()).collect(),
        forbidden_found: Vec::new(),
        forbidden_missing: forbidden.iter().map(|p| p.as_str().to_string()).collect(),
    }
}
