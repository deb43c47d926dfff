//! Configuration management command

use crate::config::Config;
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration (after applying all overrides)
    Show,

    /// Validate configuration file
    Validate,

    /// Print example configuration file
    Example,

    /// Show configuration file search paths
    Paths,
}

/// Run the config command; `network` is the global `--network` flag
pub fn run(args: ConfigArgs, network: Option<&str>) -> Result<()> {
    match args.command {
        ConfigCommands::Show => run_show(network),
        ConfigCommands::Validate => run_validate(network),
        ConfigCommands::Example => {
            print!("{}", Config::example_toml());
            Ok(())
        }
        ConfigCommands::Paths => {
            run_paths();
            Ok(())
        }
    }
}

fn run_show(network: Option<&str>) -> Result<()> {
    let config = Config::load_with_network(network)?;
    config.validate()?;

    println!("Current Configuration:");
    println!("=====================\n");

    println!("{}", toml::to_string_pretty(&config)?);

    let settings = config.chain.time_settings()?;
    println!("# Effective time settings");
    println!("#   genesis:         {}", settings.genesis_time().to_rfc3339());
    println!("#   slots per epoch: {}", settings.slots_per_epoch());
    println!("#   slot duration:   {:?}", settings.slot_duration());

    println!("\nPriority: CLI flags > Environment variables > Config file > Defaults");

    Ok(())
}

fn run_validate(network: Option<&str>) -> Result<()> {
    println!("Validating configuration...\n");

    let found = Config::config_file_paths().into_iter().find(|path| path.exists());

    match found {
        Some(path) => {
            println!("Found config file: {}", path.display());
            let config = Config::load_with_network(network).inspect_err(|e| {
                println!("✗ Failed to load configuration: {:#}", e);
            })?;
            config.validate().inspect_err(|e| {
                println!("✗ Configuration validation failed: {:#}", e);
            })?;
            println!("✓ Configuration is valid");
        }
        None => {
            println!("{}", Config::config_not_found_help());
            println!();
            println!("Using defaults...");
            let mut config = Config::default();
            config.apply_network_override(network);
            config.validate()?;
            println!("✓ Default configuration is valid");
        }
    }

    Ok(())
}

fn run_paths() {
    println!("Configuration File Search Paths:");
    println!("================================\n");

    for (i, path) in Config::config_file_paths().iter().enumerate() {
        let exists = if path.exists() { "✓ EXISTS" } else { "  " };
        println!("{}. {} {}", i + 1, path.display(), exists);
    }

    println!("\nConfiguration files are searched in order from top to bottom.");
    println!("The first file found will be used.");
}
