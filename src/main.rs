//! FloodAlert - report and browse flood alerts tied to geographic locations.
//!
//! # API Endpoints
//!
//! - `GET /alerts` - List alerts (filters: `city`, `nearby`, `recent`)
//! - `GET /alerts/nearby` - Alerts within a radius of a point
//! - `GET /alerts/mine` - The caller's own alerts
//! - `GET /alerts/:id` - A single alert
//! - `POST /alerts` - Report a flood alert
//! - `PUT /alerts/:id` - Edit an alert (owner only)
//! - `DELETE /alerts/:id` - Delete an alert (owner only)
//! - `GET /health` - Health check

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use floodalert::api::{AppState, router};
use floodalert::config::Config;
use floodalert::geocode::ReverseGeocoder;
use floodalert::storage::AlertStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("floodalert=info".parse()?))
        .init();

    let config = Config::from_env();

    info!(
        port = config.port,
        db_url = %config.database_url,
        geocoding = config.geocoder_url.is_some(),
        "Starting FloodAlert server"
    );

    let store = AlertStore::new(&config.database_url).await?;
    info!("Database initialized");

    let geocoder = config
        .geocoder_url
        .as_deref()
        .map(ReverseGeocoder::with_base_url)
        .transpose()?;

    let app = router(AppState { store, geocoder });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "FloodAlert is listening");

    axum::serve(listener, app).await?;

    Ok(())
}
