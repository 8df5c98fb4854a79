use crate::{
    config::Config,
    fetcher::{errors::FetchError, types::RawPage},
};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::{Client, ClientBuilder, Response, header};
use tracing::{debug, instrument};
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// One outbound retrieval.
///
/// Implementations return `FetchError::Http` without reading the body when
/// the upstream status is 400 or above.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<RawPage, FetchError>;
}

/// `PageFetcher` backed by a pooled reqwest client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    max_body_bytes: u64,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static(ACCEPT_HTML));

        let client = ClientBuilder::new()
            .connect_timeout(config.connect_timeout())
            .timeout(config.fetch_timeout())
            .user_agent(config.user_agent())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects()))
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Unknown(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes(),
        })
    }

    /// Stream the body, giving up as soon as it grows past `max_body_bytes`.
    /// Content-Length may be missing or wrong for chunked and compressed bodies.
    async fn read_body(&self, mut response: Response) -> Result<Bytes, FetchError> {
        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(FetchError::from_reqwest_error)?
        {
            let size = (body.len() + chunk.len()) as u64;
            if size > self.max_body_bytes {
                return Err(FetchError::BodyTooLarge(size));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body.freeze())
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<RawPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let status = response.status();
        if status.as_u16() >= 400 {
            debug!(%status, "upstream returned an error status");
            return Err(FetchError::Http { status });
        }

        // Check content length before downloading
        if let Some(content_length) = response.content_length()
            && content_length > self.max_body_bytes
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let url_final = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(str::to_string);

        let body_raw = self.read_body(response).await?;

        debug!(
            %status,
            final_url = %url_final,
            bytes = body_raw.len(),
            "fetched page"
        );

        Ok(RawPage {
            url_final,
            status,
            content_type,
            body_raw,
        })
    }
}
