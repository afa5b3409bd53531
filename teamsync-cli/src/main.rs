//! teamsync CLI - Command line interface for teamsync
//!
//! Keeps one local git clone per team in sync with the repositories listed in
//! a realtime database.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use teamsync_core::{credentials, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{ServeArgs, SyncArgs};

/// teamsync: keep team repositories cloned and up to date
#[derive(Parser, Debug)]
#[command(name = "teamsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.config/teamsync/config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to git executable (overrides config and env)
    #[arg(long, global = true, env = "TEAMSYNC_GIT_PATH")]
    git_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Run the HTTP server
    #[command(visible_alias = "s")]
    Serve(ServeArgs),

    /// Run a single synchronization pass and print the results
    Sync(SyncArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let bind = match cli.command {
        Some(Commands::Serve(ref args)) => args.bind.clone(),
        _ => None,
    };

    let config = Config::load_with_overrides(cli.config.as_deref(), bind, cli.git_path.clone())?;

    if cli.verbose {
        tracing::info!(
            bind = %config.server.bind,
            database_url = %config.store.database_url,
            records_path = %config.store.records_path,
            git_path = %config.git.git_path,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("teamsync {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Sync(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Config) => {
            print_config(&config, cli.config.as_deref());
        }
        None => {
            println!("teamsync - keep team repositories cloned and up to date");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config, explicit: Option<&std::path::Path>) {
    println!("teamsync Configuration");
    println!("======================");
    println!();
    println!("Server:");
    println!("  bind: {}", config.server.bind);
    println!();
    println!("Store:");
    println!("  database_url: {}", config.store.database_url);
    println!("  records_path: {}", config.store.records_path);
    println!("  timeout: {:?}", config.store.timeout);
    let token_file = config
        .store
        .token_file
        .clone()
        .or_else(credentials::default_token_path);
    if let Some(path) = token_file {
        println!("  token_file: {}", path.display());
    }
    if std::env::var_os(credentials::STORE_TOKEN_ENV).is_some() {
        println!("  token: from {}", credentials::STORE_TOKEN_ENV);
    }
    println!();
    println!("Git:");
    println!("  git_path: {}", config.git.git_path);
    println!("  remote: {}", config.git.remote);
    println!("  branch: {}", config.git.branch);
    println!();

    let path = explicit
        .map(|p| p.to_path_buf())
        .or_else(Config::default_config_path);
    if let Some(path) = path {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
