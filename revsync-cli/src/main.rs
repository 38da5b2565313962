//! Revsync CLI - assign a random review to every user who has not yet
//! reviewed the configured target account.
//!
//! Prints exactly one JSON line on stdout and exits non-zero on failure.
//! Logs go to stderr.
//!
//! SUPABASE_URL, SUPABASE_KEY and CSV_URL are read here, through clap, and
//! nowhere else.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use revsync_core::{Config, HttpCorpusSource, Report, ReviewJob, RunSummary, Secrets};
use revsync_supabase::SupabaseClient;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Revsync: seed review rows for users who have not reviewed the target yet
#[derive(Parser, Debug)]
#[command(name = "revsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to ~/.config/revsync/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Supabase project URL (overrides config)
    #[arg(long, env = "SUPABASE_URL")]
    store_url: Option<String>,

    /// Supabase API key (overrides secrets file)
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    store_key: Option<String>,

    /// Review corpus CSV URL (overrides config)
    #[arg(long, env = "CSV_URL")]
    corpus_url: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Must run before clap reads env-backed arguments
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("revsync: failed to initialize logging: {e:#}");
    }

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }

    let result = run(&cli).await;
    if let Err(ref e) = result {
        tracing::error!(error = %e, "Review assignment failed");
    }

    let report = Report::from_result(result);
    println!("{}", report.to_json_line());
    report.exit_code()
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()?;

    Ok(())
}

async fn run(cli: &Cli) -> revsync_core::Result<RunSummary> {
    let config = Config::load_with_overrides(
        cli.config.as_deref(),
        cli.store_url.clone(),
        cli.corpus_url.clone(),
    )?;

    let store_key = match cli.store_key.clone() {
        Some(key) => Some(key),
        None => Secrets::load()?.store_key(),
    };

    let run_config = config.resolve(store_key)?;

    if cli.verbose {
        tracing::info!(
            store = %run_config.store.url,
            corpus = %run_config.corpus_url,
            target = %run_config.target.username,
            "Configuration loaded"
        );
    }

    let corpus = HttpCorpusSource::new(run_config.corpus_url.clone(), run_config.corpus_timeout)?;
    // Bad keys and URLs surface as config errors, transport setup as network
    let store = SupabaseClient::new(&run_config.store)?;

    ReviewJob::new(&run_config.target, &corpus, &store).run().await
}
