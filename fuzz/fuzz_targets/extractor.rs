#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use reqwest::StatusCode;
use url::Url;

use unfurl::extractor::extract;
use unfurl::fetcher::{RawPage, decode};

const TARGET: &str = "https://example.com/articles/1";

fuzz_target!(|data: &[u8]| {
    // First byte picks a declared charset so both decode passes get exercised.
    let (content_type, body) = match data.split_first() {
        Some((0, rest)) => (Some("text/html; charset=shift_jis"), rest),
        Some((1, rest)) => (Some("text/html; charset=windows-1252"), rest),
        Some((_, rest)) => (None, rest),
        None => (None, data),
    };

    let request_url = Url::parse(TARGET).unwrap();
    let raw = RawPage {
        url_final: request_url.clone(),
        status: StatusCode::OK,
        content_type: content_type.map(str::to_string),
        body_raw: Bytes::copy_from_slice(body),
    };

    // Decoding and extraction must never panic regardless of input
    let page = decode(&raw);
    let metadata = extract(&page, &request_url, TARGET);
    assert!(metadata.url.is_some());
});
