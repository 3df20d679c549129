// src/config/mod.rs
//! Process configuration read from the environment (`.env` is loaded by `main`).
//!
//! Nothing here panics: numbers that don't parse fall back to their defaults, and
//! missing table credentials are only reported when a request needs them.

use std::env;

use crate::source::airtable::{AirtableConfig, DEFAULT_API_URL, DEFAULT_MAX_PAGES, DEFAULT_TABLE};

// --- env names ---
pub const ENV_API_KEY: &str = "AIRTABLE_API_KEY";
pub const ENV_API_KEY_ALIAS: &str = "AIRTABLE_TOKEN";
pub const ENV_BASE_ID: &str = "AIRTABLE_BASE_ID";
pub const ENV_TABLE: &str = "AIRTABLE_TABLE";
pub const ENV_VIEW: &str = "AIRTABLE_VIEW";
pub const ENV_API_URL: &str = "AIRTABLE_API_URL";
pub const ENV_MAX_PAGES: &str = "AIRTABLE_MAX_PAGES";
pub const ENV_CACHE_MAX_AGE: &str = "POSTS_CACHE_MAX_AGE";
pub const ENV_CACHE_SWR: &str = "POSTS_CACHE_SWR";
pub const ENV_METRICS_ROUTE: &str = "METRICS_ROUTE";

// --- defaults ---
pub const DEFAULT_CACHE_MAX_AGE: u32 = 300;
pub const DEFAULT_CACHE_SWR: u32 = 600;
const MAX_PAGES_CEILING: usize = 500;

/// Shared-cache hints sent with a successful listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub max_age_secs: u32,
    pub stale_while_revalidate_secs: u32,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            max_age_secs: DEFAULT_CACHE_MAX_AGE,
            stale_while_revalidate_secs: DEFAULT_CACHE_SWR,
        }
    }
}

impl CachePolicy {
    pub fn header_value(&self) -> String {
        format!(
            "public, s-maxage={}, stale-while-revalidate={}",
            self.max_age_secs, self.stale_while_revalidate_secs
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeConfig {
    pub airtable: AirtableConfig,
    pub cache: CachePolicy,
    pub metrics_route: bool,
}

impl EdgeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Same as `from_env`, reading through `get` (tests pass a map).
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let airtable = AirtableConfig {
            api_url: non_blank(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_key: non_blank(ENV_API_KEY).or_else(|| non_blank(ENV_API_KEY_ALIAS)),
            base_id: non_blank(ENV_BASE_ID),
            table: non_blank(ENV_TABLE).unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            view: non_blank(ENV_VIEW),
            max_pages: parse_or(non_blank(ENV_MAX_PAGES), DEFAULT_MAX_PAGES)
                .clamp(1, MAX_PAGES_CEILING),
        };

        let cache = CachePolicy {
            max_age_secs: parse_or(non_blank(ENV_CACHE_MAX_AGE), DEFAULT_CACHE_MAX_AGE),
            stale_while_revalidate_secs: parse_or(non_blank(ENV_CACHE_SWR), DEFAULT_CACHE_SWR),
        };

        let metrics_route = non_blank(ENV_METRICS_ROUTE).as_deref() == Some("1");

        Self {
            airtable,
            cache,
            metrics_route,
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|s| s.parse::<T>().ok()).unwrap_or(default)
}
