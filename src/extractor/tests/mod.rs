use bytes::Bytes;
use reqwest::StatusCode;
use std::fs;
use url::Url;

use crate::extractor::{extract, extract_document};
use crate::fetcher::{decode, types::RawPage};
use scraper::Html;

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{}", name))
        .expect("Failed to read test fixture")
}

fn extract_html(html: &str, url: &str) -> crate::extractor::Metadata {
    let request_url = Url::parse(url).unwrap();
    extract_document(&Html::parse_document(html), &request_url, url)
}

fn create_test_page(body: impl Into<Bytes>, content_type: Option<&str>, url: &str) -> RawPage {
    RawPage {
        url_final: Url::parse(url).unwrap(),
        status: StatusCode::OK,
        content_type: content_type.map(str::to_string),
        body_raw: body.into(),
    }
}

#[test]
fn test_extract_article() {
    let metadata = extract_html(&fixture("article.html"), "https://news.example.com/a/b");

    assert_eq!(metadata.title.as_deref(), Some("Sample Article"));
    assert_eq!(
        metadata.description.as_deref(),
        Some("A sample article used to exercise the Open Graph rules.")
    );
    // canonical link beats og:url, and resolves against the request URL
    assert_eq!(
        metadata.url.as_deref(),
        Some("https://news.example.com/2024/sample-article")
    );
    assert_eq!(
        metadata.image.as_deref(),
        Some("https://news.example.com/images/sample.jpg")
    );
    assert!(metadata.error.is_none());
}

#[test]
fn test_extract_twitter_card() {
    let metadata = extract_html(&fixture("twitter.html"), "https://blog.example.com/posts/");

    assert_eq!(metadata.title.as_deref(), Some("Twitter Card Title"));
    assert_eq!(metadata.description.as_deref(), Some("Described for Twitter."));
    assert_eq!(
        metadata.url.as_deref(),
        Some("https://blog.example.com/posts/post/42")
    );
    assert_eq!(
        metadata.image.as_deref(),
        Some("https://cdn.example.com/card.png")
    );
}

#[test]
fn test_extract_plain_page() {
    let metadata = extract_html(&fixture("plain.html"), "https://example.com/post?id=7");

    assert_eq!(metadata.title.as_deref(), Some("How to Build Better Software"));
    assert_eq!(
        metadata.description.as_deref(),
        Some("Notes on building better software.")
    );
    // no canonical, no og:url: the request URL comes back verbatim
    assert_eq!(metadata.url.as_deref(), Some("https://example.com/post?id=7"));
    assert!(metadata.image.is_none());
}

#[test]
fn test_empty_page_is_not_an_error() {
    let metadata = extract_html(&fixture("empty.html"), "https://example.com/empty");

    assert!(metadata.title.is_none());
    assert!(metadata.description.is_none());
    assert!(metadata.image.is_none());
    assert!(metadata.error.is_none());
    assert_eq!(metadata.url.as_deref(), Some("https://example.com/empty"));
}

#[test]
fn og_title_wins_over_title_element() {
    let metadata = extract_html(
        r#"<head><title>Y</title><meta property="og:title" content="X"></head>"#,
        "https://ex.com/",
    );
    assert_eq!(metadata.title.as_deref(), Some("X"));
}

#[test]
fn relative_canonical_resolves_against_request_url() {
    let metadata = extract_html(
        r#"<head><link rel="canonical" href="/p"></head>"#,
        "https://ex.com/a/b",
    );
    assert_eq!(metadata.url.as_deref(), Some("https://ex.com/p"));
}

#[test]
fn unresolvable_canonical_falls_back() {
    let metadata = extract_html(
        r#"<head>
            <link rel="canonical" href="http://">
            <meta property="og:url" content="https://ex.com/from-og">
        </head>"#,
        "https://ex.com/a",
    );
    assert_eq!(metadata.url.as_deref(), Some("https://ex.com/from-og"));

    let metadata = extract_html(
        r#"<head><meta property="og:image" content="//[broken/img.png"></head>"#,
        "https://ex.com/a",
    );
    assert!(metadata.image.is_none());
}

#[test]
fn image_is_never_defaulted() {
    let metadata = extract_html(
        r#"<head><title>t</title><link rel="icon" href="/favicon.ico"></head>"#,
        "https://ex.com/",
    );
    assert!(metadata.image.is_none());
}

#[test]
fn test_malformed_html() {
    let metadata = extract_html(
        "<html><head><title>Broken</title><meta property=og:image content=/i.png><body><p>Unclosed tags<div>More",
        "https://example.com/broken",
    );
    assert_eq!(metadata.title.as_deref(), Some("Broken"));
    assert_eq!(metadata.image.as_deref(), Some("https://example.com/i.png"));
}

#[test]
fn shift_jis_page_decodes_before_extraction() {
    let html = r#"<html><head><meta property="og:title" content="東京の天気"><title>天気</title></head></html>"#;
    let (encoded, _, _) = encoding_rs::SHIFT_JIS.encode(html);
    let raw = create_test_page(
        encoded.into_owned(),
        Some("text/html; charset=shift_jis"),
        "https://tenki.example.jp/",
    );

    let page = decode(&raw);
    let request_url = Url::parse("https://tenki.example.jp/").unwrap();
    let metadata = extract(&page, &request_url, "https://tenki.example.jp/");

    assert_eq!(metadata.title.as_deref(), Some("東京の天気"));
    assert_eq!(metadata.charset.as_deref(), Some("shift_jis"));
}

#[test]
fn extraction_is_idempotent() {
    let html = fixture("article.html");
    let raw = create_test_page(html, Some("text/html"), "https://news.example.com/a/b");
    let request_url = Url::parse("https://news.example.com/a/b").unwrap();

    let first = extract(&decode(&raw), &request_url, request_url.as_str());
    let second = extract(&decode(&raw), &request_url, request_url.as_str());

    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
    assert_eq!(first.charset.as_deref(), Some("utf-8"));
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(
            body in proptest::collection::vec(any::<u8>(), 0..2048),
            url in "https://[a-z]+\\.com/[a-z/]*"
        ) {
            let raw = create_test_page(body, None, &url);
            let request_url = Url::parse(&url).unwrap();
            let _ = extract(&decode(&raw), &request_url, &url);
        }

        #[test]
        fn test_url_is_always_absolute(
            href in "[ -~]{0,40}",
        ) {
            let html = format!(r#"<link rel="canonical" href="{}">"#, href.replace('"', ""));
            let metadata = extract_html(&html, "https://example.com/base/");
            let url = metadata.url.unwrap();
            prop_assert!(Url::parse(&url).is_ok());
        }
    }
}
