//! azgraph - Azure resource-identity-access graph builder
//!
//! Walks every subscription visible to the current `az login` session and
//! writes one JSON graph of:
//! - subscriptions, resource groups and tracked resources
//! - role assignments at every scope
//! - managed identities, their principals and federated credentials
//! - Key Vault access policies

use anyhow::{Context, Result};
use azgraph_collector::{AzCliGateway, Collector, CollectorConfig};
use azgraph_core::CommandGateway;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// azgraph CLI
#[derive(Parser)]
#[command(name = "azgraph")]
#[command(about = "Build a resource-identity-access graph of an Azure account")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "AZGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Where to write the graph (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum concurrent subscriptions (overrides config)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Azure CLI binary (overrides config)
    #[arg(long, env = "AZGRAPH_AZ_BINARY")]
    az_binary: Option<String>,

    /// Look principals up one at a time instead of in bulk
    #[arg(long)]
    no_batch: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List the subscriptions a run would cover
    Subscriptions,

    /// Print the effective configuration as TOML
    ShowConfig,

    /// Show version
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},azgraph_collector={}", log_level, log_level).into()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();

    let config = load_config(&cli)?;
    let gateway: Arc<dyn CommandGateway> = Arc::new(AzCliGateway::new(config.az_binary.clone()));

    if let Some(cmd) = cli.command {
        match cmd {
            Command::Subscriptions => {
                let collector = Collector::new(config, gateway);
                for subscription in collector.list_subscriptions() {
                    println!("{}\t{}", subscription.id, subscription.name);
                }
                return Ok(());
            }
            Command::ShowConfig => {
                print!("{}", toml::to_string_pretty(&config).context("Failed to render configuration")?);
                return Ok(());
            }
            Command::Version => {
                println!("azgraph v{}", azgraph_collector::VERSION);
                return Ok(());
            }
        }
    }

    info!("Starting azgraph v{}", azgraph_collector::VERSION);

    let output = config.output.clone();
    let collector = Collector::new(config, gateway);
    let summary = collector.collect().context("Collection failed")?;

    for subscription in &summary.subscriptions {
        info!(
            subscription = %subscription.subscription_id,
            resources = subscription.resources_seen,
            expanded = subscription.resources_expanded,
            skipped = subscription.resources_skipped,
            scopes = subscription.scopes_queried,
            "Subscription summary"
        );
    }
    info!(
        by_label = summary.link.by_label,
        by_id = summary.link.by_id,
        unresolved = summary.link.unresolved,
        hit_rate = summary.resolver.hit_rate(),
        "Linking and name resolution"
    );

    collector
        .export(&output)
        .with_context(|| format!("Failed to write graph to {}", output.display()))?;

    info!("Wrote {} nodes and {} edges to {}", summary.nodes, summary.edges, output.display());
    Ok(())
}

/// Load configuration from file (or defaults) and apply CLI overrides
fn load_config(cli: &Cli) -> Result<CollectorConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let config = CollectorConfig::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => CollectorConfig::default(),
    };

    if let Some(output) = &cli.output {
        config.output = output.clone();
    }
    if let Some(workers) = cli.workers {
        config.max_workers = workers;
    }
    if let Some(binary) = &cli.az_binary {
        config.az_binary = binary.clone();
    }
    if cli.no_batch {
        config.principal_lookup.batch = false;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
