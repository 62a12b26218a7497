use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{AggregatedResult, DataIndex};
use engine::WorkerEngine;
use protocol::{ExchangeError, MasterClient, RecommendationRequest};
use server::config::split_list;
use server::{
    AvailabilityProber, ClusterConfig, MasterServer, RecommendationFeed,
    RecommendationOrchestrator, RecommendationReport, WorkerServer,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// item-recs - Distributed item-to-item recommendation cluster
#[derive(Parser)]
#[command(name = "item-recs")]
#[command(about = "Co-occurrence recommendations computed by a master/worker cluster", long_about = None)]
struct Cli {
    /// Ratings CSV (overrides RATINGS_PATH)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Comma separated worker addresses (overrides CLUSTER_WORKERS)
    #[arg(short, long, global = true)]
    workers: Option<String>,

    /// Per-exchange deadline in milliseconds, 0 for none (overrides EXCHANGE_TIMEOUT_MS)
    #[arg(long, global = true)]
    exchange_timeout_ms: Option<u64>,

    /// Retries per failed exchange (overrides DISPATCH_MAX_RETRIES)
    #[arg(long, global = true)]
    retries: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a worker that scores partitions sent by the master
    Worker {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:9001")]
        listen: String,

        /// Scaled score used when every similarity is identical (overrides DEGENERATE_SCALE_FALLBACK)
        #[arg(long)]
        degenerate_fallback: Option<f64>,
    },

    /// Run the master request service
    Master {
        /// Address to listen on (overrides MASTER_LISTEN_ADDR)
        #[arg(long)]
        listen: Option<String>,
    },

    /// Compute recommendations in-process against the configured workers
    Recommend {
        /// Comma separated categories; defaults to every known category
        #[arg(long)]
        categories: Option<String>,

        /// Number of results to return (overrides MAX_RESULTS)
        #[arg(long)]
        max_results: Option<usize>,

        /// Show partition and worker coverage
        #[arg(long)]
        explain: bool,
    },

    /// Ask a running master for recommendations
    Query {
        /// Master address
        #[arg(long, default_value = "127.0.0.1:9000")]
        master: String,

        /// Comma separated categories
        #[arg(long)]
        categories: String,

        #[arg(long, default_value = "5")]
        max_results: usize,
    },

    /// Print the result set a running master published last
    Latest {
        /// Master address
        #[arg(long, default_value = "127.0.0.1:9000")]
        master: String,
    },

    /// Follow every result set a running master publishes
    Watch {
        /// Master address
        #[arg(long, default_value = "127.0.0.1:9000")]
        master: String,
    },

    /// Check which configured workers accept connections
    Probe,

    /// List the categories present in the ratings file
    Categories,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Worker {
            listen,
            degenerate_fallback,
        } => {
            let fallback = degenerate_fallback.unwrap_or(config.degenerate_fallback);
            handle_worker(listen, fallback).await?
        }
        Commands::Master { listen } => handle_master(config, listen).await?,
        Commands::Recommend {
            categories,
            max_results,
            explain,
        } => handle_recommend(config, categories, max_results, explain).await?,
        Commands::Query {
            master,
            categories,
            max_results,
        } => handle_query(master, categories, max_results).await?,
        Commands::Latest { master } => handle_latest(master).await?,
        Commands::Watch { master } => handle_watch(master).await?,
        Commands::Probe => handle_probe(config).await,
        Commands::Categories => handle_categories(config)?,
    }

    Ok(())
}

/// Environment first, then command-line overrides
fn load_config(cli: &Cli) -> Result<ClusterConfig> {
    let mut config = ClusterConfig::from_env().context("Invalid cluster configuration")?;

    if let Some(data) = &cli.data {
        config.ratings_path = data.clone();
    }
    if let Some(workers) = &cli.workers {
        config.workers = split_list(workers);
    }
    if let Some(ms) = cli.exchange_timeout_ms {
        config.dispatch.exchange_timeout = (ms > 0).then(|| Duration::from_millis(ms));
    }
    if let Some(retries) = cli.retries {
        config.dispatch.max_retries = retries;
    }
    Ok(config)
}

fn load_index(config: &ClusterConfig) -> Result<Arc<DataIndex>> {
    println!(
        "Loading ratings from {}...",
        config.ratings_path.display()
    );
    let start = Instant::now();
    let data_index = DataIndex::load_from_file(&config.ratings_path)
        .context("Failed to load ratings dataset")?;
    println!("{} Loaded dataset in {:?}", "✓".green(), start.elapsed());
    Ok(Arc::new(data_index))
}

/// Handle the 'worker' command
async fn handle_worker(listen: String, degenerate_fallback: f64) -> Result<()> {
    if !degenerate_fallback.is_finite() {
        bail!("Degenerate scale fallback must be finite");
    }
    let engine = WorkerEngine::new().with_degenerate_fallback(degenerate_fallback);
    let worker = WorkerServer::bind(listen.as_str()).await?.with_engine(engine);
    worker.serve().await
}

/// Handle the 'master' command
async fn handle_master(config: ClusterConfig, listen: Option<String>) -> Result<()> {
    let data_index = load_index(&config)?;
    let listen = listen.unwrap_or_else(|| config.master_listen_addr.clone());

    let orchestrator = RecommendationOrchestrator::new(data_index, &config);
    let master = MasterServer::bind(listen.as_str(), orchestrator, RecommendationFeed::new()).await?;
    master.serve().await
}

/// Handle the 'recommend' command
async fn handle_recommend(
    config: ClusterConfig,
    categories: Option<String>,
    max_results: Option<usize>,
    explain: bool,
) -> Result<()> {
    let data_index = load_index(&config)?;

    let categories = match categories {
        Some(raw) => split_list(&raw),
        None => data_index.known_categories(),
    };
    if categories.is_empty() {
        bail!("No categories selected");
    }

    let request = RecommendationRequest::new(
        categories,
        max_results.unwrap_or(config.max_results),
    );
    let orchestrator = RecommendationOrchestrator::new(data_index, &config);

    let start = Instant::now();
    let report = orchestrator.get_recommendations(&request).await?;
    info!("Recommendations computed in {:?}", start.elapsed());

    print_recommendations(&report.results);
    if explain {
        print_coverage(&report);
    }
    Ok(())
}

/// Handle the 'query' command
async fn handle_query(master: String, categories: String, max_results: usize) -> Result<()> {
    let request = RecommendationRequest::new(split_list(&categories), max_results);
    let results = MasterClient::new(master.as_str())
        .recommend(&request)
        .await
        .with_context(|| format!("Master {} did not answer", master))?;

    print_recommendations(&results);
    Ok(())
}

/// Handle the 'latest' command
async fn handle_latest(master: String) -> Result<()> {
    let results = MasterClient::new(master.as_str())
        .latest()
        .await
        .with_context(|| format!("Master {} did not answer", master))?;

    print_recommendations(&results);
    Ok(())
}

/// Handle the 'watch' command
async fn handle_watch(master: String) -> Result<()> {
    let mut watch = MasterClient::new(master.as_str())
        .watch()
        .await
        .with_context(|| format!("Failed to watch master {}", master))?;
    println!("{} Watching {} for new recommendations", "✓".green(), master);

    loop {
        match watch.next().await {
            Ok(results) => print_recommendations(&results),
            Err(ExchangeError::Closed) => {
                println!("{}", "Master closed the feed".yellow());
                return Ok(());
            }
            Err(e) => return Err(e).context("Feed stream failed"),
        }
    }
}

/// Handle the 'probe' command
async fn handle_probe(config: ClusterConfig) {
    let prober = AvailabilityProber::new(config.probe_timeout);
    let available = prober.probe(&config.workers).await;

    println!("{}", "Worker availability:".bold().blue());
    for worker in &config.workers {
        if available.contains(worker) {
            println!("  {} {}", "✓".green(), worker);
        } else {
            println!("  {} {}", "✗".red(), worker);
        }
    }
    println!("{}/{} workers available", available.len(), config.workers.len());
}

/// Handle the 'categories' command
fn handle_categories(config: ClusterConfig) -> Result<()> {
    let data_index = load_index(&config)?;
    let (records, products) = data_index.counts();

    println!(
        "{}",
        format!("{} ratings, {} products", records, products).bold().blue()
    );
    for category in data_index.known_categories() {
        println!("  - {}", category);
    }
    Ok(())
}

fn print_recommendations(results: &[AggregatedResult]) {
    println!("{}", "Recommendations:".bold().blue());
    if results.is_empty() {
        println!("  {}", "no results".yellow());
        return;
    }
    for (i, result) in results.iter().enumerate() {
        println!(
            "{}. {} [{}] - Score: {:.2}",
            (i + 1).to_string().green(),
            result.product_id,
            result.category,
            result.stars
        );
    }
}

fn print_coverage(report: &RecommendationReport) {
    let status = if report.is_complete() {
        "complete".green()
    } else {
        "partial".yellow()
    };
    println!("\n{} ({})", "Coverage:".bold(), status);
    println!(
        "  workers available: {}/{}",
        report.workers_available, report.workers_configured
    );
    println!(
        "  partitions dispatched: {}/{}",
        report.partitions_dispatched, report.partitions_total
    );
    println!(
        "  partitions succeeded: {}/{}",
        report.partitions_succeeded, report.partitions_total
    );
}
