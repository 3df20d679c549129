// src/source/fixture.rs
use async_trait::async_trait;

use crate::posts::types::RawRecord;
use crate::source::types::{RecordSource, SourceError};

enum Mode {
    Records(Vec<RawRecord>),
    Fail(String),
}

/// In-memory stand-in for the hosted table (tests and offline runs).
pub struct StaticSource {
    mode: Mode,
}

impl StaticSource {
    pub fn from_records(records: Vec<RawRecord>) -> Self {
        Self {
            mode: Mode::Records(records),
        }
    }

    /// Parse a list-endpoint page (`{"records": [...]}`) or a bare array.
    pub fn from_json_str(s: &str) -> Result<Self, SourceError> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Payload {
            Page { records: Vec<RawRecord> },
            Bare(Vec<RawRecord>),
        }
        let records = match serde_json::from_str::<Payload>(s)
            .map_err(|e| SourceError::Decode(e.to_string()))?
        {
            Payload::Page { records } | Payload::Bare(records) => records,
        };
        Ok(Self::from_records(records))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            mode: Mode::Fail(message.into()),
        }
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, SourceError> {
        match &self.mode {
            Mode::Records(r) => Ok(r.clone()),
            Mode::Fail(msg) => Err(SourceError::Other(msg.clone())),
        }
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
