//! Report generator: pure transform from a cross-model analysis to a markdown
//! document.
//!
//! Section order is fixed: Overall Summary, Model Performance, Test-by-Test
//! Analysis, Recommendations, Success Criteria. Recommendations are
//! deterministic branches over the analysis — nothing in here is generative.

use std::fmt::Write;

use crate::analysis::{CrossModelAnalysis, TestStats};
use crate::scorer::PASS_SCORE_THRESHOLD;

/// Overall average at or above this reads as "meeting excellence criteria" in
/// the report narrative. Distinct from the pass/fail gate threshold (90) on
/// purpose; the two measure different bars.
pub const EXCELLENCE_THRESHOLD: f64 = 92.0;

/// Tests whose failure rate exceeds this fraction get called out.
const PROBLEMATIC_FAILURE_RATE: f64 = 20.0;

/// Render the full conformance report.
pub fn render_report(analysis: &CrossModelAnalysis) -> String {
    let mut md = String::new();

    md.push_str("# Cross-Model Conformance Report\n\n");
    overall_summary(&mut md, analysis);
    model_performance(&mut md, analysis);
    test_breakdown(&mut md, analysis);
    recommendations(&mut md, analysis);
    success_criteria(&mut md, analysis);

    md
}

// ============================================================================
// Sections
// ============================================================================

fn overall_summary(md: &mut String, analysis: &CrossModelAnalysis) {
    md.push_str("## Overall Summary\n\n");

    if !analysis.has_data() {
        md.push_str("No test records found. Nothing has been measured.\n\n");
        return;
    }

    let overall = &analysis.overall;
    let _ = writeln!(md, "- **Models Tested**: {}", overall.models_tested.join(", "));
    let _ = writeln!(md, "- **Total Test Runs**: {}", overall.total_records);
    let _ = writeln!(md, "- **Average Score**: {:.1}/100", overall.average_score);
    let _ = writeln!(
        md,
        "- **Cross-Model Consistency**: {}",
        if overall.consistent { "yes" } else { "no" }
    );
    md.push('\n');

    let status = if overall.average_score >= EXCELLENCE_THRESHOLD {
        "✅ **Status**: EXCELLENT - All models producing consistent, rule-conformant code"
    } else if overall.average_score >= 85.0 {
        "⚠️ **Status**: GOOD - Most models producing quality code, minor improvements needed"
    } else if overall.average_score >= 75.0 {
        "⚠️ **Status**: FAIR - Significant quality gaps between models"
    } else {
        "❌ **Status**: POOR - Major quality inconsistencies across models"
    };
    md.push_str(status);
    md.push_str("\n\n");
}

fn model_performance(md: &mut String, analysis: &CrossModelAnalysis) {
    md.push_str("## Model Performance\n\n");

    if analysis.by_model.is_empty() {
        md.push_str("_No data._\n\n");
        return;
    }

    md.push_str("| Model | Tests | Passed | Failed | Avg Score | Pass Rate |\n");
    md.push_str("|-------|-------|--------|--------|-----------|-----------|\n");
    for (model, stats) in &analysis.by_model {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} | {:.1}/100 | {:.0}% |",
            model, stats.total, stats.passed, stats.failed, stats.average, stats.pass_rate
        );
    }
    md.push('\n');
}

fn test_breakdown(md: &mut String, analysis: &CrossModelAnalysis) {
    md.push_str("## Test-by-Test Analysis\n\n");

    if analysis.by_test.is_empty() {
        md.push_str("_No data._\n\n");
        return;
    }

    for (test_id, stats) in &analysis.by_test {
        let _ = writeln!(md, "### {} — {}\n", test_id, stats.name);
        let _ = writeln!(
            md,
            "Average {:.1}/100, range {}–{} (spread {}), pass rate {:.0}%, consistency: {}\n",
            stats.average,
            stats.min,
            stats.max,
            stats.spread,
            stats.pass_rate,
            if stats.consistent { "✅" } else { "❌" }
        );

        md.push_str("| Model | Score | Status | Expected Patterns | Forbidden Patterns |\n");
        md.push_str("|-------|-------|--------|-------------------|--------------------|\n");
        for result in &stats.results {
            let _ = writeln!(
                md,
                "| {} | {}/100 | {} | {} ✓, {} ✗ | {} ✓, {} ✗ |",
                result.model,
                result.score,
                if result.passed { "✅ PASS" } else { "❌ FAIL" },
                result.expected_matched,
                result.expected_missing.len(),
                result.forbidden_absent,
                result.forbidden_found.len(),
            );
        }
        md.push('\n');

        issues_found(md, stats);
        md.push_str("---\n\n");
    }
}

fn issues_found(md: &mut String, stats: &TestStats) {
    let with_issues: Vec<_> = stats
        .results
        .iter()
        .filter(|r| {
            !r.expected_missing.is_empty() || !r.forbidden_found.is_empty() || r.error.is_some()
        })
        .collect();

    if with_issues.is_empty() {
        md.push_str("✅ All models passed this test cleanly.\n\n");
        return;
    }

    md.push_str("**Issues found:**\n\n");
    for result in with_issues {
        let _ = writeln!(md, "- **{}**:", result.model);
        if let Some(ref error) = result.error {
            let _ = writeln!(md, "  - Provider error: {}", error);
        }
        if !result.expected_missing.is_empty() {
            let _ = writeln!(
                md,
                "  - Missing expected patterns: `{}`",
                result.expected_missing.join("`, `")
            );
        }
        if !result.forbidden_found.is_empty() {
            let _ = writeln!(
                md,
                "  - Found forbidden patterns: `{}`",
                result.forbidden_found.join("`, `")
            );
        }
    }
    md.push('\n');
}

fn recommendations(md: &mut String, analysis: &CrossModelAnalysis) {
    md.push_str("## Recommendations\n\n");

    if !analysis.has_data() {
        md.push_str(
            "No records to analyze. Run at least one suite before drawing conclusions.\n\n",
        );
        return;
    }

    let overall = &analysis.overall;
    if overall.consistent && overall.average_score >= EXCELLENCE_THRESHOLD {
        md.push_str("✅ All models performing excellently. No immediate actions required.\n\n");
        md.push_str("**Maintenance:**\n");
        md.push_str("- Continue monitoring scheduled runs\n");
        md.push_str("- Review any new failures promptly\n");
        md.push_str("- Keep rule files updated with new patterns\n\n");
        return;
    }

    md.push_str("### Immediate Actions Required\n\n");

    if !overall.consistent {
        md.push_str("**Tests with inconsistent results across models:**\n");
        for (test_id, stats) in &analysis.by_test {
            if !stats.consistent {
                let _ = writeln!(
                    md,
                    "- **{}**: score spread {} (max allowed {})",
                    test_id,
                    stats.spread,
                    crate::analysis::CONSISTENCY_VARIANCE_THRESHOLD
                );
            }
        }
        md.push('\n');
    }

    // Arg-min model by average score.
    if let Some((model, stats)) = analysis
        .by_model
        .iter()
        .min_by(|a, b| a.1.average.total_cmp(&b.1.average).then(a.0.cmp(b.0)))
    {
        let _ = writeln!(
            md,
            "**Lowest performing model**: {} ({:.1}/100 average)\n",
            model, stats.average
        );
    }

    let below_threshold: Vec<_> = analysis
        .by_model
        .iter()
        .filter(|(_, s)| s.average < PASS_SCORE_THRESHOLD as f64)
        .collect();
    if !below_threshold.is_empty() {
        md.push_str("**Models below the pass threshold:**\n");
        for (model, stats) in below_threshold {
            let _ = writeln!(
                md,
                "- **{}**: {:.1}/100 average (target: {})",
                model, stats.average, PASS_SCORE_THRESHOLD
            );
        }
        md.push('\n');
    }

    let problematic: Vec<_> = analysis
        .by_test
        .iter()
        .filter(|(_, s)| 100.0 - s.pass_rate > PROBLEMATIC_FAILURE_RATE)
        .collect();
    if !problematic.is_empty() {
        md.push_str("**Tests with high failure rates:**\n");
        for (test_id, stats) in problematic {
            let _ = writeln!(
                md,
                "- **{}**: {:.0}% failure rate",
                test_id,
                100.0 - stats.pass_rate
            );
        }
        md.push('\n');
    }

    md.push_str("**Recommended fixes:**\n");
    md.push_str("1. Add more explicit ALWAYS/NEVER directives to the affected rule files\n");
    md.push_str("2. Include more common-mistake examples in the instructions\n");
    md.push_str("3. Re-run the affected suites after applying fixes\n\n");
}

fn success_criteria(md: &mut String, analysis: &CrossModelAnalysis) {
    md.push_str("## Success Criteria\n\n");

    let overall = &analysis.overall;
    let average_met = analysis.has_data() && overall.average_score >= PASS_SCORE_THRESHOLD as f64;
    let consistency_met = analysis.has_data() && overall.consistent;

    let _ = writeln!(
        md,
        "- Overall average ≥ {}: {} ({:.1}/100)",
        PASS_SCORE_THRESHOLD,
        if average_met { "MET" } else { "NOT MET" },
        overall.average_score
    );
    let _ = writeln!(
        md,
        "- Cross-model consistency: {}",
        if consistency_met { "MET" } else { "NOT MET" }
    );
    md.push('\n');

    if average_met && consistency_met {
        md.push_str("**Result: PASS** — instructions produce consistent, rule-conformant output across models.\n");
    } else {
        md.push_str("**Result: FAIL** — thresholds not met.\n");
    }
}
