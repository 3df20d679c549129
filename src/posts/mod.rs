// src/posts/mod.rs
//! Post normalizer: raw table rows → deduplicated, newest-first post cards.
//!
//! Bad rows are never errors. A row without a usable slug or title is dropped,
//! counted, and logged at debug level; the rest of the batch carries on.

pub mod fields;
pub mod resolve;
pub mod slug;
pub mod types;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

use crate::posts::fields::{Field, FieldMap};
use crate::posts::resolve::{
    resolve_author_name, resolve_field_ref, resolve_field_string, resolve_image_url,
};
use crate::posts::slug::extract_slug;
use crate::posts::types::{Author, PostSummary, RawRecord};

pub const CATEGORY: &str = "Blog";
pub const READ_TIME: &str = "5 min";
pub const PLACEHOLDER_IMAGE: &str = "/images/blog-placeholder.jpg";
pub const DEFAULT_AUTHOR_NAME: &str = "Équipe éditoriale";
pub const DEFAULT_AUTHOR_AVATAR: &str = "/images/avatar-placeholder.png";
pub const DEFAULT_AUTHOR_ROLE: &str = "Rédaction";

/// Slug produced by an empty CMS template; never a real post.
pub const PLACEHOLDER_SLUG: &str = "untitled";
pub const MIN_SLUG_LEN: usize = 3;
pub const EXCERPT_CHARS: usize = 140;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("posts_records_total", "Raw rows handed to the normalizer.");
        describe_counter!("posts_emitted_total", "Post cards emitted after normalization.");
        describe_counter!(
            "posts_dropped_total",
            "Rows dropped by the normalizer, labelled by reason."
        );
    });
}

/// Why a row did not make it into the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingSlug,
    PlaceholderSlug,
    ShortSlug,
    DuplicateSlug,
    MissingTitle,
}

impl DropReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::MissingSlug => "missing_slug",
            DropReason::PlaceholderSlug => "placeholder_slug",
            DropReason::ShortSlug => "short_slug",
            DropReason::DuplicateSlug => "duplicate_slug",
            DropReason::MissingTitle => "missing_title",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropCounts {
    pub missing_slug: usize,
    pub placeholder_slug: usize,
    pub short_slug: usize,
    pub duplicate_slug: usize,
    pub missing_title: usize,
}

impl DropCounts {
    fn record(&mut self, reason: DropReason) {
        let slot = match reason {
            DropReason::MissingSlug => &mut self.missing_slug,
            DropReason::PlaceholderSlug => &mut self.placeholder_slug,
            DropReason::ShortSlug => &mut self.short_slug,
            DropReason::DuplicateSlug => &mut self.duplicate_slug,
            DropReason::MissingTitle => &mut self.missing_title,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.missing_slug
            + self.placeholder_slug
            + self.short_slug
            + self.duplicate_slug
            + self.missing_title
    }
}

/// Output of one normalizer pass.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub posts: Vec<PostSummary>,
    pub dropped: DropCounts,
}

/// Parse a table date cell; empty or unparsable input yields `now`.
///
/// Accepted: RFC 3339, RFC 2822, `YYYY-MM-DDTHH:MM:SS[.f]` (UTC),
/// `YYYY-MM-DD` (midnight UTC), `MM/DD/YYYY`.
pub fn normalize_date(raw: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    parse_date(raw.trim()).unwrap_or(now)
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc());
        }
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc());
        }
    }
    None
}

/// First `EXCERPT_CHARS` characters of the title plus an ellipsis.
fn excerpt_from_title(title: &str) -> String {
    let head: String = title.chars().take(EXCERPT_CHARS).collect();
    format!("{head}...")
}

/// Turns raw rows into post cards using one field map.
#[derive(Debug, Clone, Default)]
pub struct PostNormalizer {
    fields: FieldMap,
}

impl PostNormalizer {
    pub fn new(fields: FieldMap) -> Self {
        Self { fields }
    }

    /// Build one card, or say why the row is dropped.
    ///
    /// `seen` is the per-pass slug set; a slug is only registered once the
    /// row is actually emitted.
    pub fn build_summary(
        &self,
        record: &RawRecord,
        now: DateTime<Utc>,
        seen: &mut HashSet<String>,
    ) -> Result<PostSummary, DropReason> {
        let f = &record.fields;
        let slug = extract_slug(f, &self.fields);

        if slug.is_empty() {
            return Err(DropReason::MissingSlug);
        }
        if slug == PLACEHOLDER_SLUG {
            return Err(DropReason::PlaceholderSlug);
        }
        if slug.chars().count() < MIN_SLUG_LEN {
            return Err(DropReason::ShortSlug);
        }
        if seen.contains(&slug) {
            return Err(DropReason::DuplicateSlug);
        }

        let title = resolve_field_string(f, self.fields.candidates(Field::Title));
        if title.is_empty() {
            return Err(DropReason::MissingTitle);
        }
        seen.insert(slug.clone());

        let excerpt = [Field::Description, Field::SeoTitle]
            .into_iter()
            .map(|field| resolve_field_string(f, self.fields.candidates(field)))
            .find(|s| !s.is_empty())
            .unwrap_or_else(|| excerpt_from_title(&title));

        let date = normalize_date(
            &resolve_field_string(f, self.fields.candidates(Field::Date)),
            now,
        );

        // Every image column is tried in order; cells that are not a link are skipped.
        let img = [Field::Image, Field::ImageUrl]
            .into_iter()
            .flat_map(|field| self.fields.candidates(field))
            .filter_map(|name| f.get(name.as_str()))
            .find_map(resolve_image_url)
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

        let author_name = resolve_field_ref(f, self.fields.candidates(Field::Author))
            .map(resolve_author_name)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHOR_NAME.to_string());

        Ok(PostSummary {
            id: record.id.clone(),
            slug,
            title,
            excerpt,
            category: CATEGORY.to_string(),
            date,
            read_time: READ_TIME.to_string(),
            img,
            author: Author {
                name: author_name,
                avatar: DEFAULT_AUTHOR_AVATAR.to_string(),
                role: DEFAULT_AUTHOR_ROLE.to_string(),
            },
            content: String::new(),
        })
    }

    /// One pass over a batch: build, drop, then sort newest first.
    /// The slug set lives only for this call.
    pub fn normalize(&self, now: DateTime<Utc>, records: &[RawRecord]) -> Normalized {
        ensure_metrics_described();
        counter!("posts_records_total").increment(records.len() as u64);

        let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
        let mut out = Normalized {
            posts: Vec::with_capacity(records.len()),
            dropped: DropCounts::default(),
        };

        for record in records {
            match self.build_summary(record, now, &mut seen) {
                Ok(post) => out.posts.push(post),
                Err(reason) => {
                    tracing::debug!(
                        target: "posts",
                        id = %record.id,
                        reason = reason.as_str(),
                        "dropped record"
                    );
                    counter!("posts_dropped_total", "reason" => reason.as_str()).increment(1);
                    out.dropped.record(reason);
                }
            }
        }

        // Stable: equal timestamps keep input order.
        out.posts
            .sort_by(|a, b| b.date.timestamp_millis().cmp(&a.date.timestamp_millis()));
        counter!("posts_emitted_total").increment(out.posts.len() as u64);
        out
    }
}

/// Normalize with the built-in field map at the current instant.
pub fn normalize(records: &[RawRecord]) -> Vec<PostSummary> {
    PostNormalizer::default().normalize(Utc::now(), records).posts
}
