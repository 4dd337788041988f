use crate::candidate::Candidate;
use anyhow::{Context, Result};
use blitz_apply::{resolve, ApplicationDriver};
use blitz_browser::ChromeLauncher;
use blitz_core::{
    AppConfig, ApplicationRepository, ApplicationResult, ApplicationStats, InMemoryRepository,
};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "blitz",
    about = "Fill in and submit job application forms from a candidate profile",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply to one or more job postings
    Apply(ApplyArgs),
    /// Show which value each form label would receive
    Match(MatchArgs),
}

#[derive(Args, Debug)]
struct ApplyArgs {
    /// Job posting URLs
    #[arg(required = true)]
    urls: Vec<String>,
    /// Candidate TOML file with profile and custom answers
    #[arg(long, short)]
    candidate: PathBuf,
    /// Configuration file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Show the browser window
    #[arg(long)]
    headful: bool,
    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct MatchArgs {
    /// Form labels to resolve
    #[arg(required = true)]
    labels: Vec<String>,
    /// Candidate TOML file with profile and custom answers
    #[arg(long, short)]
    candidate: PathBuf,
    /// Print matches as JSON
    #[arg(long)]
    json: bool,
}

pub(crate) async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Apply(args) => apply(args).await,
        Command::Match(args) => match_labels(&args),
    }
}

/// Initialize tracing subscriber for logging
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,blitz=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => {
            let mut config = AppConfig::load_from(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config.validate()?;
            config
        }
        None => AppConfig::load_with_env()?,
    };
    Ok(config)
}

async fn apply(args: ApplyArgs) -> Result<()> {
    let candidate = Candidate::load(&args.candidate)?;
    let mut config = load_config(args.config.as_deref()).context("failed to load configuration")?;
    if args.headful {
        config.browser.headless = false;
    }

    info!("Starting Blitz v{}", env!("CARGO_PKG_VERSION"));

    let launcher = Arc::new(ChromeLauncher::new(config.browser.clone()));
    let driver = ApplicationDriver::new(launcher, &config);
    let results = driver
        .apply_batch(&args.urls, &candidate.profile, &candidate.custom_fields)
        .await;

    let repository = InMemoryRepository::new();
    for (url, result) in args.urls.iter().zip(results) {
        let record = repository.record(&candidate.id, url, result).await?;
        if !args.json {
            print_result(url, &record.result);
        }
    }

    let records = repository.list_for(&candidate.id).await?;
    let stats = repository.stats(&candidate.id).await?;
    if args.json {
        let report = serde_json::json!({ "applications": records, "stats": stats });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_stats(&stats);
    }
    Ok(())
}

fn print_result(url: &str, result: &ApplicationResult) {
    println!("{url}");
    println!(
        "  {:?}: {} at {}",
        result.status, result.job_title, result.company_name
    );
    println!("  answered {} question(s)", result.questions_answered);
    for qa in &result.questions_and_answers {
        println!("    {} = {} ({:?})", qa.question, qa.answer, qa.source);
    }
    if !result.missing_fields.is_empty() {
        println!("  missing: {}", result.missing_fields.join(", "));
    }
    if let Some(error) = &result.error_message {
        println!("  error: {error}");
    }
    if let Some(method) = &result.submitted_via {
        println!("  submitted via {method:?}");
    }
}

fn print_stats(stats: &ApplicationStats) {
    println!(
        "{} application(s): {} succeeded, {} failed ({:.1}% success)",
        stats.total, stats.successful, stats.failed, stats.success_rate
    );
}

fn match_labels(args: &MatchArgs) -> Result<()> {
    let candidate = Candidate::load(&args.candidate)?;

    if args.json {
        let matches: Vec<_> = args
            .labels
            .iter()
            .map(|label| {
                serde_json::json!({
                    "label": label,
                    "match": resolve(label, &candidate.profile, &candidate.custom_fields),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    for label in &args.labels {
        match resolve(label, &candidate.profile, &candidate.custom_fields) {
            Some(m) => println!(
                "{label:?} -> {} ({:?}: {}, {})",
                m.value, m.source, m.field_name, m.field_type
            ),
            None => println!("{label:?} -> no match"),
        }
    }
    Ok(())
}
