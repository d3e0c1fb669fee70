// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

use velero_client::config::VeleroConfig;
use velero_client::constants::DEFAULT_BASE_NAME;
use velero_client::install::{install, load_resources, DiscoveryResolver, StaticResolver};
use velero_client::kubernetes::{ClusterClientProvider, Factory, FactoryArgs};

#[derive(Parser)]
#[command(name = "velero", about = "Velero client bootstrap", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Maximum queries per second to the Kubernetes API server (0 disables rate limiting)
    #[arg(long, global = true, default_value_t = 0.0)]
    client_qps: f32,

    /// Maximum number of requests sent at once when rate limited
    #[arg(long, global = true, default_value_t = 0)]
    client_burst: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the namespace Velero operates in
    Namespace,
    /// Print the enabled features, one per line
    Features,
    /// Create the resources from a manifest on the cluster
    Install {
        /// Multi-document YAML manifest to install
        #[arg(long, short)]
        file: PathBuf,
        /// Derive resource names from kinds instead of querying API discovery
        #[arg(long)]
        skip_discovery: bool,
    },
    /// Velero client settings
    Client {
        #[command(subcommand)]
        command: ClientCommands,
    },
}

#[derive(Subcommand)]
enum ClientCommands {
    /// Get and set values in the client config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print config values, all of them when no key is given
    Get { keys: Vec<String> },
    /// Set config values, e.g. `namespace=velero features=EnableCSI`
    Set {
        #[arg(required = true)]
        values: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Installed before the factory reads its config file so warnings show up;
    // the level is adjusted once -v has been parsed.
    let (filter, filter_handle) = reload::Layer::new(log_filter(0));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut factory = Factory::new(DEFAULT_BASE_NAME);
    let matches = factory.bind_flags(Cli::command()).get_matches();
    let cli = Cli::from_arg_matches(&matches)?;
    filter_handle.reload(log_filter(cli.verbose))?;
    factory.apply_flags(&FactoryArgs::from_arg_matches(&matches)?);
    factory.set_client_qps(cli.client_qps);
    factory.set_client_burst(cli.client_burst);

    match cli.command {
        Commands::Namespace => println!("{}", factory.namespace()),
        Commands::Features => {
            for feature in factory.features().all() {
                println!("{}", feature);
            }
        }
        Commands::Install {
            file,
            skip_discovery,
        } => {
            let manifest = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read manifest {}", file.display()))?;
            let resources = load_resources(&manifest)?;
            let client = factory.dynamic_client().await?;

            info!("Installing {} resources", resources.len());
            if skip_discovery {
                install(&client, &StaticResolver, &resources).await?;
            } else {
                let resolver = DiscoveryResolver::new(client.inner().clone(), &resources).await?;
                install(&client, &resolver, &resources).await?;
            }
            info!("Installed {} resources", resources.len());
        }
        Commands::Client {
            command: ClientCommands::Config { command },
        } => run_config_command(command)?,
    }

    Ok(())
}

/// Log filter for the -v count; RUST_LOG wins when no -v is given
fn log_filter(verbose: u8) -> EnvFilter {
    let level = match verbose {
        0 => return EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => "debug",
        _ => "trace",
    };
    EnvFilter::new(level)
}

fn run_config_command(command: ConfigCommands) -> Result<()> {
    let path = VeleroConfig::default_path()?;
    let mut config = VeleroConfig::load_from(&path)?;

    match command {
        ConfigCommands::Get { keys } if keys.is_empty() => {
            for (key, value) in config.entries() {
                println!("{}: {}", key, value);
            }
        }
        ConfigCommands::Get { keys } => {
            for key in keys {
                match config.get(&key) {
                    Some(value) => println!("{}: {}", key, value),
                    None => println!("{}: <NOT SET>", key),
                }
            }
        }
        ConfigCommands::Set { values } => {
            for pair in &values {
                let Some((key, value)) = pair.split_once('=') else {
                    bail!("Invalid argument {}, expected KEY=VALUE", pair);
                };
                config.set(key.trim(), value.trim());
            }
            config.save_to(&path)?;
            info!("Saved config to {}", path.display());
        }
    }

    Ok(())
}
