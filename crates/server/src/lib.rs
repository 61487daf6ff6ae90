//! REST API server for the fuel route planner.
//!
//! Provides a route-plan endpoint combining geocoding, routing, station selection, and
//! fuel-purchase optimization.

mod orchestrator;
mod routes;
mod state;

pub use routes::create_router;
pub use state::{AppState, DefaultVehicleParams};

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

/// Run the server on the specified address.
///
/// # Errors
///
/// Returns an error if the server fails to bind or serve.
pub async fn run(addr: SocketAddr, state: AppState) -> eyre::Result<()> {
    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
