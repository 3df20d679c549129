// src/source/airtable.rs
//! Hosted-table list endpoint client.
//!
//! `GET {api_url}/{base_id}/{table}?pageSize=100[&view=..][&offset=..]`, bearer auth,
//! following `offset` until the last page. No retries: the first failure ends the fetch.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::posts::types::RawRecord;
use crate::source::types::{RecordSource, SourceError};

pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";
pub const DEFAULT_TABLE: &str = "Blog";
pub const DEFAULT_MAX_PAGES: usize = 50;
const PAGE_SIZE: &str = "100";
const ERROR_BODY_MAX: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirtableConfig {
    pub api_url: String,
    /// Absent credentials are reported per request, not at boot.
    pub api_key: Option<String>,
    pub base_id: Option<String>,
    pub table: String,
    pub view: Option<String>,
    pub max_pages: usize,
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            base_id: None,
            table: DEFAULT_TABLE.to_string(),
            view: None,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListPage {
    #[serde(default)]
    records: Vec<RawRecord>,
    #[serde(default)]
    offset: Option<String>,
}

pub struct AirtableSource {
    cfg: AirtableConfig,
    http: Client,
}

impl AirtableSource {
    pub fn new(cfg: AirtableConfig) -> Result<Self, SourceError> {
        let http = Client::builder()
            .user_agent(concat!("site-edge/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { cfg, http })
    }

    /// `{api_url}/{base}/{table}` with path segments percent-encoded.
    pub fn table_url(&self, base_id: &str) -> Result<Url, SourceError> {
        let mut url = Url::parse(self.cfg.api_url.trim())
            .map_err(|e| SourceError::InvalidUrl(format!("{}: {e}", self.cfg.api_url)))?;
        {
            let mut segs = url
                .path_segments_mut()
                .map_err(|_| SourceError::InvalidUrl(self.cfg.api_url.clone()))?;
            segs.pop_if_empty().push(base_id).push(&self.cfg.table);
        }
        Ok(url)
    }

    fn credentials(&self) -> Result<(&str, &str), SourceError> {
        let key = non_blank(self.cfg.api_key.as_deref())
            .ok_or(SourceError::MissingCredential("AIRTABLE_API_KEY"))?;
        let base = non_blank(self.cfg.base_id.as_deref())
            .ok_or(SourceError::MissingCredential("AIRTABLE_BASE_ID"))?;
        Ok((key, base))
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn truncate_body(body: &str) -> String {
    body.chars().take(ERROR_BODY_MAX).collect()
}

#[async_trait]
impl RecordSource for AirtableSource {
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, SourceError> {
        let (key, base) = self.credentials()?;
        let url = self.table_url(base)?;

        let mut out = Vec::new();
        let mut offset: Option<String> = None;

        for page in 0..self.cfg.max_pages.max(1) {
            let mut req = self
                .http
                .get(url.clone())
                .bearer_auth(key)
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(view) = non_blank(self.cfg.view.as_deref()) {
                req = req.query(&[("view", view)]);
            }
            if let Some(o) = offset.as_deref() {
                req = req.query(&[("offset", o)]);
            }

            let resp = req.send().await?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(SourceError::Status {
                    status: status.as_u16(),
                    body: truncate_body(&body),
                });
            }

            let body: ListPage = resp
                .json()
                .await
                .map_err(|e| SourceError::Decode(e.to_string()))?;
            tracing::debug!(
                target: "source",
                page,
                records = body.records.len(),
                more = body.offset.is_some(),
                "airtable page"
            );
            out.extend(body.records);

            match body.offset {
                Some(next) if !next.is_empty() => offset = Some(next),
                _ => return Ok(out),
            }
        }

        Err(SourceError::TooManyPages(self.cfg.max_pages.max(1)))
    }

    fn name(&self) -> &'static str {
        "airtable"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(cfg: AirtableConfig) -> AirtableSource {
        AirtableSource::new(cfg).expect("client")
    }

    #[test]
    fn table_url_encodes_segments() {
        let s = source(AirtableConfig {
            table: "Articles de blog".into(),
            ..Default::default()
        });
        let url = s.table_url("appXYZ").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.airtable.com/v0/appXYZ/Articles%20de%20blog"
        );
    }

    #[test]
    fn table_url_tolerates_trailing_slash() {
        let s = source(AirtableConfig {
            api_url: "http://127.0.0.1:9/v0/".into(),
            ..Default::default()
        });
        assert_eq!(
            s.table_url("app1").unwrap().as_str(),
            "http://127.0.0.1:9/v0/app1/Blog"
        );
    }

    #[test]
    fn bad_api_url_is_reported() {
        let s = source(AirtableConfig {
            api_url: "not a url".into(),
            ..Default::default()
        });
        assert!(matches!(s.table_url("app"), Err(SourceError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn missing_key_fails_before_network() {
        let s = source(AirtableConfig {
            base_id: Some("app1".into()),
            api_key: Some("   ".into()),
            ..Default::default()
        });
        let err = s.fetch_all().await.unwrap_err();
        assert!(matches!(err, SourceError::MissingCredential("AIRTABLE_API_KEY")));
    }

    #[tokio::test]
    async fn missing_base_fails_before_network() {
        let s = source(AirtableConfig {
            api_key: Some("key".into()),
            ..Default::default()
        });
        let err = s.fetch_all().await.unwrap_err();
        assert!(matches!(err, SourceError::MissingCredential("AIRTABLE_BASE_ID")));
    }

    #[test]
    fn error_body_is_truncated() {
        let long = "é".repeat(1000);
        assert_eq!(truncate_body(&long).chars().count(), ERROR_BODY_MAX);
    }
}
