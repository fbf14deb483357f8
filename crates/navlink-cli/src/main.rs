mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "navlink")]
#[command(version, about = "navlink CLI - resolve URLs into navigation state and back", long_about = None)]
struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(short, long, global = true, default_value = "navlink.toml")]
    config: PathBuf,

    /// Deployment base URL, overrides `base_url` from the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log route compilation and matching decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the route table in match order
    Routes,

    /// Resolve a path into navigation state
    Resolve {
        /// Path or full URL
        path: String,
    },

    /// Serialize navigation state into a path
    Serialize {
        /// File with the state as JSON, or `-` for stdin
        #[arg(default_value = "-")]
        state: String,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "navlink=debug,navlink_router=debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project = config::ProjectConfig::from_file(&cli.config)?;
    let base_url = cli.base_url.or(project.base_url);

    match cli.command {
        Commands::Routes => {
            commands::routes::execute(&project.linking)?;
        }
        Commands::Resolve { path } => {
            if !commands::resolve::execute(&path, project.linking, base_url)? {
                std::process::exit(1);
            }
        }
        Commands::Serialize { state } => {
            commands::serialize::execute(&state, project.linking, base_url)?;
        }
    }

    Ok(())
}
