//! # Field candidate lists
//!
//! The table's column names drifted over time: the same logical column shows up
//! under its native accented spelling and under two historical mis-encodings
//! (UTF-8 bytes read as Latin-1, and the lossy `�` replacement form).
//!
//! Rather than repairing encodings, every observed spelling is listed explicitly,
//! in priority order, per logical field. Lookups try them in order.
//!
//! - Built-in lists come from `FieldMap::builtin()`.
//! - An optional TOML/JSON file can replace the list of any field.
//! - Loading order: `$POSTS_FIELDS_PATH` → `config/post_fields.toml` → `config/post_fields.json`.

use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_FIELDS_PATH: &str = "POSTS_FIELDS_PATH";
pub const DEFAULT_FIELDS_TOML: &str = "config/post_fields.toml";
pub const DEFAULT_FIELDS_JSON: &str = "config/post_fields.json";

/// Logical fields the normalizer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Title,
    Slug,
    Url,
    Date,
    Description,
    SeoTitle,
    Image,
    ImageUrl,
    Author,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Title,
        Field::Slug,
        Field::Url,
        Field::Date,
        Field::Description,
        Field::SeoTitle,
        Field::Image,
        Field::ImageUrl,
        Field::Author,
    ];

    /// Key used in override files.
    pub fn key(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Slug => "slug",
            Field::Url => "url",
            Field::Date => "date",
            Field::Description => "description",
            Field::SeoTitle => "seo_title",
            Field::Image => "image",
            Field::ImageUrl => "image_url",
            Field::Author => "author",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| f.key().eq_ignore_ascii_case(key.trim()))
    }
}

/// Ordered spellings for every logical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    lists: BTreeMap<Field, Vec<String>>,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FieldMap {
    /// Spellings observed in the production table.
    pub fn builtin() -> Self {
        let mut lists = BTreeMap::new();
        for (field, names) in [
            (
                Field::Title,
                &[
                    "Titre",
                    "Title",
                    "Nom",
                    "Titre de l'article",
                    "Titre de l\u{2019}article",
                    "Titre de l\u{e2}\u{20ac}\u{2122}article",
                    "Titre de l\u{fffd}article",
                ][..],
            ),
            (Field::Slug, &["Slug", "slug"][..]),
            (Field::Url, &["URL", "Url", "Lien", "url"][..]),
            (
                Field::Date,
                &[
                    "Date de publication",
                    "Date de parution",
                    "Publication date",
                    "Date",
                ][..],
            ),
            (
                Field::Description,
                &[
                    "Description",
                    "R\u{e9}sum\u{e9}",
                    "R\u{c3}\u{a9}sum\u{c3}\u{a9}",
                    "R\u{fffd}sum\u{fffd}",
                    "Extrait",
                ][..],
            ),
            (Field::SeoTitle, &["Titre SEO", "SEO title", "Meta title"][..]),
            (
                Field::Image,
                &["Image", "Image de couverture", "Couverture", "Cover"][..],
            ),
            (
                Field::ImageUrl,
                &[
                    "Image URL",
                    "URL de l'image",
                    "URL de l\u{2019}image",
                    "URL de l\u{e2}\u{20ac}\u{2122}image",
                ][..],
            ),
            (
                Field::Author,
                &[
                    "Auteur",
                    "Author",
                    "Auteur (nom)",
                    "R\u{e9}dacteur",
                    "R\u{c3}\u{a9}dacteur",
                    "R\u{fffd}dacteur",
                ][..],
            ),
        ] {
            lists.insert(field, names.iter().map(|s| s.to_string()).collect());
        }
        Self { lists }
    }

    /// Candidate list for one logical field.
    pub fn candidates(&self, field: Field) -> &[String] {
        self.lists.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace the list for `field`. Blank spellings are dropped; an empty
    /// result keeps the current list.
    pub fn set(&mut self, field: Field, names: Vec<String>) {
        let cleaned = clean_list(names);
        if !cleaned.is_empty() {
            self.lists.insert(field, cleaned);
        }
    }

    /// Load overrides from an explicit path (TOML or JSON) on top of the built-ins.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading field map from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let overrides = parse_overrides(&content, &ext)?;
        Self::builtin().with_overrides(overrides)
    }

    /// Load using env var + fallbacks:
    /// 1) $POSTS_FIELDS_PATH
    /// 2) config/post_fields.toml
    /// 3) config/post_fields.json
    /// 4) built-ins
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_FIELDS_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_FIELDS_PATH} points to non-existent path"));
        }
        for candidate in [DEFAULT_FIELDS_TOML, DEFAULT_FIELDS_JSON] {
            let pb = PathBuf::from(candidate);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        Ok(Self::builtin())
    }

    fn with_overrides(mut self, overrides: BTreeMap<String, Vec<String>>) -> Result<Self> {
        for (key, names) in overrides {
            let field =
                Field::from_key(&key).ok_or_else(|| anyhow!("unknown field in field map: {key}"))?;
            self.set(field, names);
        }
        Ok(self)
    }
}

fn parse_overrides(s: &str, hint_ext: &str) -> Result<BTreeMap<String, Vec<String>>> {
    if hint_ext == "json" {
        return serde_json::from_str(s).context("parsing field map json");
    }
    if hint_ext == "toml" {
        return toml::from_str(s).context("parsing field map toml");
    }
    // No usable extension: JSON object first, then TOML.
    if let Ok(v) = serde_json::from_str::<BTreeMap<String, Vec<String>>>(s) {
        return Ok(v);
    }
    toml::from_str(s).map_err(|_| anyhow!("unsupported field map format"))
}

/// Trim, drop blanks, keep first occurrence order.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|x| x == t) {
            out.push(t.to_string());
        }
    }
    out
}
