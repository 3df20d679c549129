// src/posts/resolve.rs
//! Total, never-failing readers for loosely typed table values.

use serde_json::{Map, Value};

/// String form of an arbitrary cell value, trimmed.
///
/// `null` and blank strings give `""`. Rich cells shaped `{ "value": .. }`
/// resolve to their inner value. Lists join their elements with `,`.
pub fn resolve_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Object(map) => match map.get("value") {
            Some(inner) => resolve_string(inner),
            None => value.to_string().trim().to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(resolve_string)
            .collect::<Vec<_>>()
            .join(",")
            .trim()
            .to_string(),
    }
}

/// First candidate whose resolved string is non-empty, as the raw value.
/// Returns `Value::String("")` when nothing matches.
pub fn resolve_field<S: AsRef<str>>(fields: &Map<String, Value>, candidates: &[S]) -> Value {
    resolve_field_ref(fields, candidates)
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()))
}

/// Borrowing variant of [`resolve_field`].
pub fn resolve_field_ref<'a, S: AsRef<str>>(
    fields: &'a Map<String, Value>,
    candidates: &[S],
) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|name| fields.get(name.as_ref()))
        .find(|v| !resolve_string(v).is_empty())
}

/// Convenience: resolved string of the first matching candidate.
pub fn resolve_field_string<S: AsRef<str>>(fields: &Map<String, Value>, candidates: &[S]) -> String {
    resolve_field_ref(fields, candidates)
        .map(resolve_string)
        .unwrap_or_default()
}

/// Image cell: attachment list → first `url`, else plain string form.
pub fn resolve_image(value: &Value) -> String {
    if let Value::Array(items) = value {
        if let Some(url) = items
            .first()
            .and_then(|first| first.get("url"))
            .and_then(Value::as_str)
        {
            return url.trim().to_string();
        }
    }
    resolve_string(value)
}

/// Image cell usable as a link: an attachment list whose first element carries
/// a string `url`, a list of strings, or a plain string. Anything else is `None`.
pub fn resolve_image_url(value: &Value) -> Option<String> {
    let usable = match value {
        Value::String(_) => true,
        Value::Array(items) => match items.first() {
            Some(Value::Object(first)) => first.get("url").is_some_and(Value::is_string),
            Some(Value::String(_)) => true,
            _ => false,
        },
        _ => false,
    };
    if !usable {
        return None;
    }
    Some(resolve_image(value)).filter(|s| !s.is_empty())
}

/// Author cell: linked/lookup fields arrive as lists, take the first usable name.
pub fn resolve_author_name(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(resolve_string)
            .find(|s| !s.is_empty())
            .unwrap_or_default(),
        other => resolve_string(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }

    #[test]
    fn resolve_string_empty_cases() {
        assert_eq!(resolve_string(&Value::Null), "");
        assert_eq!(resolve_string(&json!("")), "");
        assert_eq!(resolve_string(&json!("   \n\t")), "");
        assert_eq!(resolve_string(&json!({ "value": null })), "");
        assert_eq!(resolve_string(&json!([])), "");
    }

    #[test]
    fn resolve_string_scalars_and_rich_cells() {
        assert_eq!(resolve_string(&json!("  Bonjour ")), "Bonjour");
        assert_eq!(resolve_string(&json!(42)), "42");
        assert_eq!(resolve_string(&json!(true)), "true");
        assert_eq!(resolve_string(&json!({ "value": "  inner " })), "inner");
        assert_eq!(resolve_string(&json!(["a", "b"])), "a,b");
        assert_eq!(resolve_string(&json!({ "k": 1 })), r#"{"k":1}"#);
    }

    #[test]
    fn resolve_field_takes_first_non_empty_candidate() {
        let f = fields(json!({
            "Résumé": "   ",
            "RÃ©sumÃ©": "from mis-encoded column",
            "Extrait": "later"
        }));
        let got = resolve_field(&f, &["Description", "Résumé", "RÃ©sumÃ©", "Extrait"]);
        assert_eq!(got, json!("from mis-encoded column"));
    }

    #[test]
    fn resolve_field_returns_empty_when_nothing_matches() {
        let f = fields(json!({ "Other": "x", "Titre": null }));
        assert_eq!(resolve_field(&f, &["Titre", "Title"]), json!(""));
        assert_eq!(resolve_field_string(&f, &["Titre"]), "");
    }

    #[test]
    fn resolve_field_keeps_raw_shape() {
        let f = fields(json!({ "Image": [{ "url": "https://x/y.png" }] }));
        let got = resolve_field(&f, &["Image"]);
        assert!(got.is_array());
        assert_eq!(resolve_image(&got), "https://x/y.png");
    }

    #[test]
    fn resolve_image_attachment_and_fallbacks() {
        assert_eq!(resolve_image(&json!([{ "url": "https://x/y.png" }])), "https://x/y.png");
        assert_eq!(resolve_image(&json!("https://cdn/z.jpg ")), "https://cdn/z.jpg");
        assert_eq!(resolve_image(&json!([{ "id": 1 }])), r#"{"id":1}"#);
        assert_eq!(resolve_image(&json!([{ "url": 7 }])), r#"{"url":7}"#);
        assert_eq!(resolve_image(&json!([{}])), "{}");
        assert_eq!(resolve_image(&json!([])), "");
        assert_eq!(resolve_image(&Value::Null), "");
    }

    #[test]
    fn image_url_rejects_attachments_without_url() {
        assert_eq!(
            resolve_image_url(&json!([{ "url": " https://x/y.png " }])).as_deref(),
            Some("https://x/y.png")
        );
        assert_eq!(resolve_image_url(&json!("https://cdn/z.jpg")).as_deref(), Some("https://cdn/z.jpg"));
        assert_eq!(resolve_image_url(&json!([{ "id": "att1" }])), None);
        assert_eq!(resolve_image_url(&json!([{ "url": 7 }])), None);
        assert_eq!(resolve_image_url(&json!({ "value": "x" })), None);
        assert_eq!(resolve_image_url(&json!("  ")), None);
        assert_eq!(resolve_image_url(&json!([])), None);
    }

    #[test]
    fn author_name_from_lookup_list() {
        assert_eq!(resolve_author_name(&json!(["", " Marie Curie "])), "Marie Curie");
        assert_eq!(resolve_author_name(&json!("Jean")), "Jean");
        assert_eq!(resolve_author_name(&json!([])), "");
    }
}
