use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use chrono::Utc;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::config::{CachePolicy, EdgeConfig};
use crate::posts::fields::FieldMap;
use crate::posts::PostNormalizer;
use crate::source::{AirtableSource, RecordSource, SourceError};

pub const POSTS_PATH: &str = "/api/posts";
const ALLOW: &str = "GET, HEAD, OPTIONS";

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("posts_fetch_total", "Listing requests that hit the table.");
        describe_counter!("posts_fetch_errors_total", "Listing requests that failed upstream.");
        describe_histogram!("posts_fetch_ms", "Fetch + normalize time in milliseconds.");
    });
}

#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn RecordSource>,
    normalizer: Arc<PostNormalizer>,
    cache: CachePolicy,
}

impl AppState {
    pub fn new(source: Arc<dyn RecordSource>, normalizer: PostNormalizer, cache: CachePolicy) -> Self {
        Self {
            source,
            normalizer: Arc::new(normalizer),
            cache,
        }
    }

    /// Production wiring: hosted table + configured field map.
    pub fn from_config(cfg: &EdgeConfig, fields: FieldMap) -> anyhow::Result<Self> {
        let source = AirtableSource::new(cfg.airtable.clone())?;
        Ok(Self::new(
            Arc::new(source),
            PostNormalizer::new(fields),
            cfg.cache,
        ))
    }
}

/// Failures surfaced at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("failed to fetch posts: {0}")]
    Upstream(#[from] SourceError),

    #[error("method not allowed")]
    MethodNotAllowed,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Upstream(err) => {
                tracing::error!(error = %err, "posts fetch failed");
                let body = json!({
                    "error": "Failed to fetch posts",
                    "details": err.to_string(),
                });
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CACHE_CONTROL, "no-store")],
                    Json(body),
                )
                    .into_response()
            }
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, ALLOW)],
                Json(json!({ "error": "Method not allowed" })),
            )
                .into_response(),
        }
    }
}

/// Public read-only endpoint: any origin, listing methods only.
/// Every `OPTIONS` request is answered by this layer and never reaches a handler.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers(Any)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(POSTS_PATH, any(posts))
        .layer(cors_layer())
        .with_state(state)
}

async fn posts(State(state): State<AppState>, method: Method) -> Result<Response, ApiError> {
    if method == Method::GET || method == Method::HEAD {
        return list_posts(&state, method == Method::HEAD).await;
    }
    Err(ApiError::MethodNotAllowed)
}

async fn list_posts(state: &AppState, head_only: bool) -> Result<Response, ApiError> {
    ensure_metrics_described();
    counter!("posts_fetch_total").increment(1);
    let t0 = Instant::now();

    let records = state.source.fetch_all().await.inspect_err(|_| {
        counter!("posts_fetch_errors_total").increment(1);
    })?;

    let out = state.normalizer.normalize(Utc::now(), &records);

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("posts_fetch_ms").record(ms);
    tracing::info!(
        source = state.source.name(),
        fetched = records.len(),
        emitted = out.posts.len(),
        dropped = out.dropped.total(),
        ms,
        "posts listed"
    );

    let cache = HeaderValue::from_str(&state.cache.header_value())
        .unwrap_or_else(|_| HeaderValue::from_static("no-store"));

    if head_only {
        return Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
                (header::CACHE_CONTROL, cache),
            ],
        )
            .into_response());
    }

    Ok((
        StatusCode::OK,
        [(header::CACHE_CONTROL, cache)],
        Json(out.posts),
    )
        .into_response())
}
