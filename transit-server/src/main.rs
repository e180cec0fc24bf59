use std::net::SocketAddr;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use transit_server::planner::{PlannerConfig, TransitPlanner};
use transit_server::routing::RoutingConfig;
use transit_server::web::{AppState, create_router};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("transit_server=info")),
        )
        .init();

    let mut config = PlannerConfig::default();
    if let Ok(dir) = std::env::var("TRANSIT_GTFS_DIR") {
        config.gtfs_dir = dir.into();
    }
    if let Ok(path) = std::env::var("TRANSIT_STATION_TABLE") {
        config.station_table = path.into();
    }
    let mut routing = RoutingConfig::default();
    match std::env::var("ROUTING_BASE_URL") {
        Ok(url) => routing = routing.with_base_url(url),
        Err(_) => warn!(
            base_url = %routing.base_url,
            "ROUTING_BASE_URL not set, using default routing service"
        ),
    }
    let config = config.with_routing(routing);

    let addr: SocketAddr = std::env::var("TRANSIT_BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()?;

    let planner = TransitPlanner::start(config)?;
    let state = AppState::new(planner);
    let app = create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "transit planner listening");
    info!("  GET /health");
    info!("  GET /stations/nearby?lat&lon[&radius_km]");
    info!("  GET /stations/details?lat&lon");
    info!("  GET /routes?from_lat&from_lon&to_lat&to_lon[&time=HH:MM]");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    state.planner.shutdown();
    Ok(())
}
