use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::CachePolicy;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and publish the cache policy as gauges.
    /// Fails if another recorder is already installed in this process.
    pub fn install(cache: &CachePolicy) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_gauge!("posts_cache_max_age_secs", "s-maxage sent with listings.");
        describe_gauge!(
            "posts_cache_swr_secs",
            "stale-while-revalidate sent with listings."
        );
        gauge!("posts_cache_max_age_secs").set(cache.max_age_secs as f64);
        gauge!("posts_cache_swr_secs").set(cache.stale_while_revalidate_secs as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
