// src/source/mod.rs
pub mod airtable;
pub mod fixture;
pub mod types;

pub use airtable::{AirtableConfig, AirtableSource};
pub use fixture::StaticSource;
pub use types::{RecordSource, SourceError};
