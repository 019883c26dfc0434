//! CLI for issue-digest.
//!
//! Scans a GitHub repository's open issues into a local SQLite cache and
//! analyzes the cached issues with Gemini.

use clap::{Parser, Subcommand};
use issue_digest::{
    AnalysisOutcome, CacheStatus, Config, RateLimitInfo, Runner, RunnerError, ScanSummary,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Issue Digest - Cache a repository's open issues and analyze them with an LLM.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file (missing file means defaults).
    #[arg(long, default_value = "issue-digest.toml")]
    config: PathBuf,

    /// GitHub Personal Access Token (optional; raises the rate limit).
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Path to the SQLite issue cache.
    #[arg(long, env = "ISSUE_DIGEST_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch all open issues of a repository and cache them.
    Scan {
        /// Repository in "owner/name" format.
        repo: String,
    },

    /// Analyze a scanned repository's cached issues.
    Analyze {
        /// Repository in "owner/name" format.
        repo: String,

        /// What you want to know about the issues.
        #[arg(long, short)]
        prompt: String,
    },

    /// Show what the cache holds for a repository.
    Status {
        /// Repository in "owner/name" format.
        repo: String,
    },

    /// Show the remaining GitHub API quota.
    RateLimit,

    /// Check that the LLM is reachable with the configured key.
    CheckLlm,
}

/// Result of one command, printed on success.
enum Report {
    Scan(ScanSummary),
    Analysis(AnalysisOutcome),
    Status(CacheStatus),
    RateLimit(RateLimitInfo),
    LlmReachable,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    init_tracing();

    // Both ring and aws-lc-rs end up linked; pick one for rustls.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    // Parse arguments
    let args = Args::parse();

    match run(args).await {
        Ok(report) => {
            print_report(&report);
            ExitCode::from(0)
        }
        Err(e) if e.is_critical() => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            ExitCode::from(1)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Loads configuration, overlays flags and environment, and runs the command.
async fn run(args: Args) -> Result<Report, RunnerError> {
    let mut config = Config::load(&args.config)?;
    if args.token.is_some() {
        config.github.token = args.token;
    }
    if args.gemini_api_key.is_some() {
        config.llm.api_key = args.gemini_api_key;
    }
    if let Some(db) = args.db {
        config.cache.path = db;
    }

    let runner = Runner::new(&config)?;
    match args.command {
        Command::Scan { repo } => runner.scan(&repo).await.map(Report::Scan),
        Command::Analyze { repo, prompt } => {
            runner.analyze(&repo, &prompt).await.map(Report::Analysis)
        }
        Command::Status { repo } => runner.status(&repo).map(Report::Status),
        Command::RateLimit => runner.rate_limit().await.map(Report::RateLimit),
        Command::CheckLlm => runner.check_llm().await.map(|()| Report::LlmReachable),
    }
}

/// Prints the result of a successful command.
fn print_report(report: &Report) {
    match report {
        Report::Scan(summary) => {
            println!("\nScan:");
            println!("  Repository: {}", summary.repo);
            println!("  Issues fetched: {}", summary.issues_fetched);
            println!(
                "  Cached: {}",
                if summary.cached_successfully { "yes" } else { "no" }
            );
        }
        Report::Analysis(outcome) => {
            println!(
                "\nAnalysis of {} ({} issues, {} LLM calls):\n",
                outcome.repo, outcome.issues_analyzed, outcome.llm_calls
            );
            println!("{}", outcome.analysis);
        }
        Report::Status(status) => {
            println!("\nCache:");
            println!("  Repository: {}", status.repo);
            println!("  Cached issues: {}", status.issue_count);
            match &status.last_scan {
                Some(scan) => println!("  Last scan: {}", scan.scanned_at),
                None => println!("  Last scan: never"),
            }
        }
        Report::RateLimit(info) => {
            println!("\nGitHub core API:");
            println!("  Remaining: {}/{}", info.remaining, info.limit);
            println!("  Resets in: {}s", info.seconds_until_reset_from_now());
        }
        Report::LlmReachable => println!("LLM connection OK"),
    }
}
