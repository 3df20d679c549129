// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod metrics;
pub mod posts;
pub mod source;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::posts::types::{Author, PostSummary, RawRecord};
pub use crate::posts::{normalize, PostNormalizer};

use axum::Router;
use tracing::info;

use crate::config::EdgeConfig;
use crate::posts::fields::FieldMap;

/// Build the full app from process configuration: table source, field map,
/// optional `/metrics`.
pub fn app(cfg: &EdgeConfig) -> anyhow::Result<Router> {
    let fields = FieldMap::load_default()?;
    // Safe diagnostics only: never the key itself.
    info!(
        table = %cfg.airtable.table,
        base_set = cfg.airtable.base_id.is_some(),
        key_len = cfg.airtable.api_key.as_deref().map(str::len).unwrap_or(0),
        "posts source configured"
    );

    let state = AppState::from_config(cfg, fields)?;
    let mut app = router(state);

    if cfg.metrics_route {
        let m = crate::metrics::Metrics::install(&cfg.cache)?;
        app = app.merge(m.router());
    }
    Ok(app)
}
