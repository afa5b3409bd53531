//! Serve command - Run the HTTP server

use clap::Args;
use teamsync_core::Config;
use teamsync_server::AppState;
use tokio::net::TcpListener;

use super::{build_pass, store_source};

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (overrides config and env)
    #[arg(short, long, env = "TEAMSYNC_BIND")]
    pub bind: Option<String>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let source = store_source(config)?;
        let pass = build_pass(config, source)?;

        let listener = TcpListener::bind(&config.server.bind).await?;
        teamsync_server::serve(listener, AppState::new(pass)).await?;

        Ok(())
    }
}
