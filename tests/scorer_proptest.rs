//! Property-based tests for the conformance scorer.
//!
//! The scorer is the one pure kernel of the harness, so its contract is
//! checked over generated inputs: bounds, determinism, pass-threshold
//! exactness, and monotonicity in both pattern directions.

use proptest::prelude::*;
use regex::{Regex, RegexBuilder};

use conformance_harness::scorer::{score_output, PASS_SCORE_THRESHOLD};

fn literal(pattern: &str) -> Regex {
    RegexBuilder::new(&regex::escape(pattern))
        .multi_line(true)
        .build()
        .expect("escaped literal always compiles")
}

fn literals(patterns: &[String]) -> Vec<Regex> {
    patterns.iter().map(|p| literal(p)).collect()
}

proptest! {
    #[test]
    fn score_is_always_in_bounds(
        output in "[a-z0-9 \n]{0,200}",
        expected in prop::collection::vec("[a-z0-9 ]{1,12}", 0..6),
        forbidden in prop::collection::vec("[a-z0-9 ]{1,12}", 0..6),
    ) {
        let outcome = score_output(&output, &literals(&expected), &literals(&forbidden));
        prop_assert!(outcome.score <= 100);
    }

    #[test]
    fn passed_is_exactly_score_at_least_threshold(
        output in "[a-z0-9 \n]{0,200}",
        expected in prop::collection::vec("[a-z0-9 ]{1,12}", 0..6),
        forbidden in prop::collection::vec("[a-z0-9 ]{1,12}", 0..6),
    ) {
        let outcome = score_output(&output, &literals(&expected), &literals(&forbidden));
        prop_assert_eq!(outcome.passed, outcome.score >= PASS_SCORE_THRESHOLD);
    }

    #[test]
    fn scoring_is_deterministic(
        output in "[a-z0-9 \n]{0,200}",
        expected in prop::collection::vec("[a-z0-9 ]{1,12}", 0..6),
        forbidden in prop::collection::vec("[a-z0-9 ]{1,12}", 0..6),
    ) {
        let expected = literals(&expected);
        let forbidden = literals(&forbidden);
        let a = score_output(&output, &expected, &forbidden);
        let b = score_output(&output, &expected, &forbidden);
        prop_assert_eq!(a, b);
    }

    /// Adding one more matched expected pattern never decreases the score.
    #[test]
    fn extra_matched_expected_never_decreases_score(
        output in "[a-z0-9 ]{1,100}",
        expected in prop::collection::vec("[a-z0-9 ]{1,12}", 0..5),
        forbidden in prop::collection::vec("[a-z0-9 ]{1,12}", 0..5),
    ) {
        let forbidden = literals(&forbidden);
        let base = literals(&expected);
        let before = score_output(&output, &base, &forbidden);

        // A pattern matching the whole output is guaranteed to match.
        let mut extended = base;
        extended.push(literal(&output));
        let after = score_output(&output, &extended, &forbidden);

        prop_assert!(after.score >= before.score,
            "score dropped from {} to {}", before.score, after.score);
    }

    /// Adding one more found forbidden pattern never increases the score.
    #[test]
    fn extra_found_forbidden_never_increases_score(
        output in "[a-z0-9 ]{1,100}",
        expected in prop::collection::vec("[a-z0-9 ]{1,12}", 0..5),
        forbidden in prop::collection::vec("[a-z0-9 ]{1,12}", 0..5),
    ) {
        let expected = literals(&expected);
        let base = literals(&forbidden);
        let before = score_output(&output, &expected, &base);

        let mut extended = base;
        extended.push(literal(&output));
        let after = score_output(&output, &expected, &extended);

        prop_assert!(after.score <= before.score,
            "score rose from {} to {}", before.score, after.score);
    }

    /// The validation partition is total: every pattern lands in exactly one bucket.
    #[test]
    fn partition_is_total(
        output in "[a-z0-9 \n]{0,200}",
        expected in prop::collection::vec("[a-z0-9 ]{1,12}", 0..6),
        forbidden in prop::collection::vec("[a-z0-9 ]{1,12}", 0..6),
    ) {
        let outcome = score_output(&output, &literals(&expected), &literals(&forbidden));
        prop_assert_eq!(
            outcome.validation.expected_matches.len() + outcome.validation.expected_missing.len(),
            expected.len()
        );
        prop_assert_eq!(
            outcome.validation.forbidden_found.len() + outcome.validation.forbidden_missing.len(),
            forbidden.len()
        );
    }
}
