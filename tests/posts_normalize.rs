// tests/posts_normalize.rs
use chrono::{TimeZone, Utc};
use serde_json::json;

use site_edge::posts::fields::FieldMap;
use site_edge::posts::resolve::{resolve_image, resolve_string};
use site_edge::posts::slug::{extract_slug, normalize_slug};
use site_edge::{normalize, PostNormalizer, RawRecord};

fn rec(id: &str, fields: serde_json::Value) -> RawRecord {
    RawRecord::from_fields(id, fields)
}

#[test]
fn resolve_string_is_empty_only_for_blank_values() {
    for v in [json!(null), json!(""), json!("  \t "), json!({ "value": " " })] {
        assert_eq!(resolve_string(&v), "", "{v}");
    }
    for v in [json!("x"), json!(0), json!(false), json!({ "value": "y" })] {
        assert!(!resolve_string(&v).is_empty(), "{v}");
    }
}

#[test]
fn normalized_slugs_are_clean_and_stable() {
    let inputs = [
        "Hello, World",
        "https://site.example/blog/my-post/?ref=x",
        "/blog/Été--à--la--plage/",
        "***",
        "a_b c\td",
        "MiXeD-Case-123",
    ];
    for raw in inputs {
        let s = normalize_slug(raw);
        assert!(
            s.bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-'),
            "{raw:?} -> {s:?}"
        );
        assert!(!s.starts_with('-') && !s.ends_with('-') && !s.contains("--"));
        assert_eq!(normalize_slug(&s), s);
    }
}

#[test]
fn url_field_yields_last_segment() {
    let f = rec(
        "r",
        json!({ "URL": "https://site.example/blog/my-post/?ref=x", "Titre": "Other" }),
    );
    assert_eq!(extract_slug(&f.fields, &FieldMap::builtin()), "my-post");
}

#[test]
fn image_list_and_non_url_objects() {
    assert_eq!(resolve_image(&json!([{ "url": "https://x/y.png" }])), "https://x/y.png");
    let fallback = resolve_image(&json!([{ "name": null }]));
    assert_eq!(fallback, resolve_string(&json!([{ "name": null }])));
    assert_eq!(resolve_image(&json!([null])), "");
}

#[test]
fn duplicate_slugs_keep_first_record() {
    let out = normalize(&[
        rec("first", json!({ "Titre": "Same Title", "Date": "2024-01-01" })),
        rec("second", json!({ "Title": "same  title!", "Date": "2024-02-01" })),
    ]);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "first");
}

#[test]
fn empty_title_and_short_slug_are_excluded() {
    let out = PostNormalizer::default().normalize(
        Utc::now(),
        &[
            rec("no-title", json!({ "Slug": "valid-slug", "Titre": "  " })),
            rec("short", json!({ "Slug": "un", "Titre": "A valid title" })),
            rec("fine", json!({ "Slug": "fine", "Titre": "Fine" })),
        ],
    );
    let ids: Vec<&str> = out.posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["fine"]);
    assert_eq!(out.dropped.missing_title, 1);
    assert_eq!(out.dropped.short_slug, 1);
    assert_eq!(out.dropped.total(), 2);
}

#[test]
fn attachment_without_url_falls_through_to_image_url_then_placeholder() {
    let out = normalize(&[
        rec(
            "with-link",
            json!({
                "Titre": "Hello there",
                "Image": [{ "id": "att1" }],
                "Image URL": "https://cdn/ok.jpg"
            }),
        ),
        rec(
            "without-link",
            json!({ "Titre": "General Kenobi", "Image": [{ "id": "att1" }] }),
        ),
    ]);
    let img = |id: &str| out.iter().find(|p| p.id == id).map(|p| p.img.clone());
    assert_eq!(img("with-link").as_deref(), Some("https://cdn/ok.jpg"));
    assert_eq!(
        img("without-link").as_deref(),
        Some(site_edge::posts::PLACEHOLDER_IMAGE)
    );
}

#[test]
fn dates_sort_newest_first_with_unparsable_as_now() {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let out = PostNormalizer::default().normalize(
        now,
        &[
            rec("jan", json!({ "Titre": "January", "Date": "2024-01-01" })),
            rec("jun", json!({ "Titre": "June", "Date": "2024-06-01" })),
            rec("bad", json!({ "Titre": "Whenever", "Date": "le 3 mars" })),
        ],
    );
    let ids: Vec<&str> = out.posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["bad", "jun", "jan"]);
    assert_eq!(out.posts[0].date, now);
}

#[test]
fn mis_encoded_columns_resolve_like_native_ones() {
    let native = rec("n", json!({ "Titre": "Native", "Résumé": "Texte" }));
    let latin1 = rec("l", json!({ "Titre": "Latin", "RÃ©sumÃ©": "Texte" }));
    let lossy = rec("r", json!({ "Titre": "Lossy", "R�sum�": "Texte" }));
    let out = normalize(&[native, latin1, lossy]);
    assert_eq!(out.len(), 3);
    assert!(out.iter().all(|p| p.excerpt == "Texte"));
}
