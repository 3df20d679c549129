// src/posts/types.rs
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// One row from the hosted table, as returned by the list endpoint.
/// Field names are not stable; see `posts::fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "createdTime", default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RawRecord {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            created_time: None,
            fields,
        }
    }

    /// Build from a JSON object of fields (handy in tests and fixtures).
    pub fn from_fields(id: impl Into<String>, fields: Value) -> Self {
        let fields = match fields {
            Value::Object(m) => m,
            _ => Map::new(),
        };
        Self::new(id, fields)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub avatar: String,
    pub role: String,
}

/// Canonical post card exposed to the site.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub category: String,
    #[serde(serialize_with = "serialize_iso_millis")]
    pub date: DateTime<Utc>,
    pub read_time: String,
    pub img: String,
    pub author: Author,
    /// Filled in later by the article page, never here.
    pub content: String,
}

/// `2024-06-01T00:00:00.000Z`, the shape browsers produce for `toISOString`.
pub fn to_iso_millis(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_iso_millis<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&to_iso_millis(dt))
}
