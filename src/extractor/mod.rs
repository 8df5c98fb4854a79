pub mod model;
pub mod resolve;
pub mod rules;

#[cfg(test)]
mod tests;

pub use model::Metadata;

use scraper::Html;
use url::Url;

use crate::fetcher::types::DecodedPage;
use resolve::resolve_url;

/// Build the preview record for a decoded page.
///
/// `request_url` is the parsed form of `query`, the URL exactly as the
/// caller supplied it. Relative URLs resolve against `request_url` and
/// `query` is reported back unchanged when the page declares no canonical
/// URL.
pub fn extract(page: &DecodedPage, request_url: &Url, query: &str) -> Metadata {
    let mut metadata = extract_document(&page.document, request_url, query);
    metadata.charset = Some(page.charset.label().to_string());
    metadata
}

pub fn extract_document(document: &Html, request_url: &Url, query: &str) -> Metadata {
    // 1. Plain text fields
    let title = rules::first_value(document, &rules::TITLE);
    let description = rules::first_value(document, &rules::DESCRIPTION);

    // 2. URL fields, skipping candidates that do not resolve
    let url = rules::first_match(document, &rules::CANONICAL_URL, |v| {
        resolve_url(request_url, v)
    })
    .unwrap_or_else(|| query.to_string());
    let image = rules::first_match(document, &rules::IMAGE, |v| resolve_url(request_url, v));

    Metadata {
        title,
        description,
        url: Some(url),
        image,
        charset: None,
        error: None,
    }
}
