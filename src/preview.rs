//! The preview pipeline: fetch, decode, extract.

use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

use crate::extractor::{self, Metadata};
use crate::fetcher::{FetchError, PageFetcher, RawPage, decode};

#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),

    /// The target could not be reached at all.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

/// Parse a caller-supplied target. Only absolute http(s) URLs are accepted.
pub fn parse_target(query: &str) -> Result<Url, PreviewError> {
    let url = Url::parse(query)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(PreviewError::UnsupportedScheme(scheme.to_string())),
    }
}

/// Produce the preview record for `query`.
///
/// An upstream error status becomes a record carrying only `error`.
/// Transport failures are returned as `PreviewError::Fetch`.
#[instrument(skip(fetcher))]
pub async fn preview(fetcher: &dyn PageFetcher, query: &str) -> Result<Metadata, PreviewError> {
    let query = query.trim();
    let target = parse_target(query)?;

    let raw = match fetcher.fetch(&target).await {
        Ok(raw) => raw,
        Err(FetchError::Http { status }) => {
            warn!(%status, "upstream returned an error status");
            return Ok(Metadata::upstream_failure(query, status));
        }
        Err(err) => return Err(err.into()),
    };

    let metadata = build(&raw, &target, query);
    info!(
        charset = metadata.charset.as_deref().unwrap_or_default(),
        has_title = metadata.title.is_some(),
        has_image = metadata.image.is_some(),
        "extracted preview"
    );
    Ok(metadata)
}

// Kept out of `preview` so the parsed document never lives across an await.
fn build(raw: &RawPage, target: &Url, query: &str) -> Metadata {
    let page = decode(raw);
    extractor::extract(&page, target, query)
}
