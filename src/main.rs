use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gerrit_harvest::{Config, GerritEngine, ShellExecutor};

#[derive(Parser)]
#[command(name = "gerrit-harvest")]
#[command(about = "Gerrit review ingestion engine with a resumable disk cache")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(long, default_value = ".gerrit-harvest/config.yml")]
    config: PathBuf,

    /// Gerrit hostname (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// SSH user for the command channel (overrides config)
    #[arg(long)]
    user: Option<String>,

    /// SSH port (overrides config)
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch reviews from all projects
    Fetch {
        /// Serve projects and reviews from the disk cache when available
        #[arg(long)]
        use_cache: bool,

        /// Restore the previous run's full result set instead of fetching
        #[arg(long, conflicts_with = "use_cache")]
        history: bool,

        /// Reviews requested per query page (overrides config)
        #[arg(long)]
        limit: Option<usize>,

        /// Cap on total in-memory reviews (overrides config)
        #[arg(long)]
        max_reviews: Option<usize>,

        /// Write the result set to this file instead of the cache dump
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List project identifiers
    Projects {
        /// Serve the listing from the disk cache
        #[arg(long)]
        use_cache: bool,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("gerrit_harvest=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(host) = cli.host {
        config.gerrit.host = host;
    }
    if let Some(user) = cli.user {
        config.gerrit.user = user;
    }
    if let Some(port) = cli.port {
        config.gerrit.port = port;
    }

    if config.gerrit.host.is_empty() || config.gerrit.user.is_empty() {
        anyhow::bail!("A gerrit host and user are required (via config file or --host/--user)");
    }

    match cli.command {
        Commands::Fetch {
            use_cache,
            history,
            limit,
            max_reviews,
            output,
        } => {
            if let Some(limit) = limit {
                config.fetch.page_size = limit;
            }
            if let Some(max_reviews) = max_reviews {
                config.fetch.max_reviews = max_reviews;
            }
            run_fetch(&config, use_cache, history, output)?;
        }
        Commands::Projects { use_cache } => {
            list_projects(&config, use_cache)?;
        }
    }

    Ok(())
}

fn run_fetch(config: &Config, use_cache: bool, history: bool, output: Option<PathBuf>) -> Result<()> {
    let mut engine = GerritEngine::new(config, ShellExecutor, use_cache, history)
        .context("Failed to initialize engine")?;
    let id = engine.id();

    let reviews = engine.ingest_all().context("Ingestion failed")?;

    match output {
        Some(path) => {
            let content = serde_json::to_string(&reviews)?;
            fs::write(&path, content)
                .with_context(|| format!("Failed to write result set: {}", path.display()))?;
            info!(path = %path.display(), "Result set written");
        }
        None => {
            engine
                .cache()
                .write_dump(&reviews)
                .context("Failed to dump result set")?;
        }
    }

    println!("Ingested {} reviews from {}", reviews.len(), id);

    Ok(())
}

fn list_projects(config: &Config, use_cache: bool) -> Result<()> {
    let engine = GerritEngine::new(config, ShellExecutor, use_cache, false)
        .context("Failed to initialize engine")?;

    let projects = engine.list_projects().context("Project listing failed")?;

    for project in &projects {
        println!("{}", project);
    }

    info!(count = projects.len(), "Listed projects");

    Ok(())
}
