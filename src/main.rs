use anyhow::Result;
use clap::{Parser, Subcommand};
use jormungandr_slot_monitor::commands::{self, ConfigArgs, DateArgs, NodeArgs, ScheduleArgs};
use jormungandr_slot_monitor::config::Config;
use jormungandr_slot_monitor::jormungandr::TimeSettings;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Jormungandr Slot Monitor - slot dates and leader schedules
#[derive(Parser, Debug)]
#[command(name = "jsm", version)]
#[command(about = "Slot-date arithmetic and leader schedule inspection for Jormungandr nodes")]
struct Cli {
    /// Network preset, overrides chain.network ("itn" or "custom")
    #[arg(short, long, global = true)]
    network: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse, convert and compare slot dates
    Date(DateArgs),

    /// Sort and filter a leaders logs dump
    Schedule(ScheduleArgs),

    /// Summarise a node statistics dump
    Node(NodeArgs),

    /// Show, validate or generate configuration
    Config(ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Config(args) => commands::config::run(args, cli.network.as_deref()),
        Commands::Date(args) => {
            let (_, settings) = load_config(cli.network.as_deref())?;
            commands::date::run(args, &settings)
        }
        Commands::Schedule(args) => {
            let (config, settings) = load_config(cli.network.as_deref())?;
            commands::schedule::run(args, &config.schedule, &settings)
        }
        Commands::Node(args) => {
            let (config, settings) = load_config(cli.network.as_deref())?;
            commands::node::run(args, &config.node, &settings)
        }
    }
}

/// Load configuration, apply the CLI network override and resolve time settings
fn load_config(network: Option<&str>) -> Result<(Config, TimeSettings)> {
    let config = Config::load_with_network(network)?;

    let settings = config.chain.time_settings()?;
    debug!(
        "Chain: {} (genesis {}, {} slots/epoch, {:?} slots)",
        config.chain.network,
        settings.genesis_time().to_rfc3339(),
        settings.slots_per_epoch(),
        settings.slot_duration()
    );

    Ok((config, settings))
}

fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}
