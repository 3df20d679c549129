//! Site edge functions — binary entrypoint.
//! Boots the Axum app on Shuttle: env, tracing, config, routes.

use shuttle_axum::ShuttleAxum;
use site_edge::config::EdgeConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("site_edge=info,warn"));

    // The runtime may already have installed a subscriber; keep theirs if so.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = EdgeConfig::from_env();
    let router = site_edge::app(&cfg)?;

    Ok(router.into())
}
