// src/posts/slug.rs
use once_cell::sync::OnceCell;
use regex::Regex;
use serde_json::{Map, Value};

use crate::posts::fields::{Field, FieldMap};
use crate::posts::resolve::resolve_field_string;

fn re(cell: &'static OnceCell<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static slug regex"))
}

/// Leading `scheme://host[:port]`, any case.
fn re_origin() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    re(&RE, r"(?i)^[a-z][a-z0-9+.\-]*://[^/?#]*")
}

fn re_not_slug() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    re(&RE, r"[^a-z0-9-]+")
}

fn re_hyphens() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    re(&RE, r"-{2,}")
}

/// Cut everything from the first `?` or `#`.
fn strip_query_and_fragment(s: &str) -> &str {
    match s.find(['?', '#']) {
        Some(i) => &s[..i],
        None => s,
    }
}

/// URL-safe slug: only `[a-z0-9-]`, single hyphens, no edge hyphens.
///
/// Steps, in order:
/// 1) lowercase
/// 2) drop a leading `scheme://host`
/// 3) drop a leading `/blog/`
/// 4) drop query string and fragment
/// 5) drop trailing slashes
/// 6) runs outside `[a-z0-9-]` become one hyphen
/// 7) collapse repeated hyphens
/// 8) trim edge hyphens
pub fn normalize_slug(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    let no_origin = re_origin().replace(&lower, "");
    let no_blog = no_origin.strip_prefix("/blog/").unwrap_or(&no_origin);
    let no_query = strip_query_and_fragment(no_blog);
    let no_trailing = no_query.trim_end_matches('/');
    let hyphened = re_not_slug().replace_all(no_trailing, "-");
    let collapsed = re_hyphens().replace_all(&hyphened, "-");
    collapsed.trim_matches('-').to_string()
}

/// Last non-empty path segment of a URL or path, query/fragment ignored.
pub fn last_path_segment(raw: &str) -> String {
    let trimmed = raw.trim();
    let path = match re_origin().find(trimmed) {
        Some(m) => &trimmed[m.end()..],
        None => trimmed,
    };
    strip_query_and_fragment(path)
        .split('/')
        .filter(|seg| !seg.trim().is_empty())
        .last()
        .unwrap_or_default()
        .to_string()
}

/// Slug for a record, first non-empty wins:
/// 1) dedicated slug column
/// 2) last path segment of the URL column
/// 3) title
pub fn extract_slug(fields: &Map<String, Value>, map: &FieldMap) -> String {
    let explicit = normalize_slug(&resolve_field_string(fields, map.candidates(Field::Slug)));
    if !explicit.is_empty() {
        return explicit;
    }

    let url = resolve_field_string(fields, map.candidates(Field::Url));
    let from_url = normalize_slug(&last_path_segment(&url));
    if !from_url.is_empty() {
        return from_url;
    }

    normalize_slug(&resolve_field_string(fields, map.candidates(Field::Title)))
}
