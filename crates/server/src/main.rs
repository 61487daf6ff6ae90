//! Binary entry point for the fuel route planner server.

use clap::Parser;
use eyre::Result;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use server::AppState;

#[derive(Parser)]
#[command(name = "server")]
#[command(about = "Fuel route planner REST API")]
struct Cli {
    /// Address to bind to
    #[arg(short, long, env = "BIND_ADDR", default_value = "127.0.0.1:3000")]
    addr: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let state = AppState::from_env()?;
    server::run(cli.addr, state).await
}
