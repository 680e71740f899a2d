use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use conformance_harness::analysis;
use conformance_harness::config::HarnessConfig;
use conformance_harness::gate::{self, GateDecision};
use conformance_harness::logging;
use conformance_harness::provider::{resolve_provider, ProviderKind};
use conformance_harness::registry::Registry;
use conformance_harness::report::render_report;
use conformance_harness::runner::{self, RunContext};
use conformance_harness::store::{load_all_records, ResultStore};
use conformance_harness::types::RunSummary;
use conformance_harness::HarnessError;

/// Cross-model conformance harness for AI coding-standard instructions.
#[derive(Parser, Debug)]
#[command(name = "conformance-harness")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one test suite against one provider/model pair
    Run {
        /// Backend tag: anthropic, openai, google, or ollama
        #[arg(long)]
        provider: String,

        /// Model name as the backend knows it
        #[arg(long)]
        model: String,

        /// Suite name from the registry
        #[arg(long, default_value = "critical")]
        suite: String,

        /// Directory holding the rule content files
        #[arg(long, default_value = "rules")]
        rules_dir: PathBuf,

        /// Directory the run's records are appended under
        #[arg(long, default_value = "test-results")]
        results_dir: PathBuf,
    },

    /// Render the cross-model report from all persisted results
    Report {
        #[arg(long, default_value = "test-results")]
        results_dir: PathBuf,

        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check quality thresholds; the exit code is the pass/fail signal
    Gate {
        #[arg(long, default_value = "test-results")]
        results_dir: PathBuf,

        /// Minimum overall average score required
        #[arg(long, default_value_t = 90.0)]
        min_score: f64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(kind = e.kind(), "{}", e);
            ExitCode::from(2)
        }
    }
}

async fn execute(cli: Cli) -> Result<ExitCode, HarnessError> {
    match cli.command {
        Commands::Run {
            provider,
            model,
            suite,
            rules_dir,
            results_dir,
        } => {
            let config = HarnessConfig::from_env();
            let kind = ProviderKind::from_tag(&provider)?;
            // Fail fast: catalog validation and credential resolution both
            // happen before the first generation call.
            let registry = Registry::load()?;
            let adapter = resolve_provider(kind, &config)?;
            let store = ResultStore::for_run(&results_dir, kind.as_tag(), &model)?;

            let ctx = RunContext {
                registry: &registry,
                store: &store,
                rules_dir: &rules_dir,
            };
            let summary = runner::run_suite(adapter.as_ref(), &model, &suite, &ctx).await?;
            print_run_summary(&summary, &store);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Report {
            results_dir,
            output,
        } => {
            let records = load_all_records(&results_dir)?;
            let analysis = analysis::analyze(&records);
            let report = render_report(&analysis);
            match output {
                Some(path) => {
                    std::fs::write(&path, &report)?;
                    tracing::info!(path = %path.display(), "Report written");
                }
                None => print!("{}", report),
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Gate {
            results_dir,
            min_score,
        } => {
            let records = load_all_records(&results_dir)?;
            let analysis = analysis::analyze(&records);
            match gate::decide(&analysis, min_score) {
                GateDecision::Pass => {
                    println!("✅ ALL THRESHOLDS MET");
                    println!(
                        "   Overall average {:.1}/100 across {} records, consistent across models",
                        analysis.overall.average_score, analysis.overall.total_records
                    );
                    Ok(ExitCode::SUCCESS)
                }
                GateDecision::Fail(reasons) => {
                    println!("❌ THRESHOLD CHECK FAILED ({} issues found):", reasons.len());
                    for reason in &reasons {
                        println!("  • {}", reason);
                    }
                    Ok(ExitCode::from(1))
                }
            }
        }
    }
}

/// The final aggregate summary, always printed after a run.
fn print_run_summary(summary: &RunSummary, store: &ResultStore) {
    println!();
    println!(
        "Suite '{}' on {}/{}: {}/{} passed ({:.0}%), average score {:.1}/100",
        summary.test_suite,
        summary.provider,
        summary.model,
        summary.passed,
        summary.total_tests,
        summary.pass_rate,
        summary.average_score,
    );
    println!("Results persisted to {}", store.run_dir().display());
}
