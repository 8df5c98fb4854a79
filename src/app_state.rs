use crate::{
    config::Config,
    fetcher::{FetchError, HttpFetcher, PageFetcher},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn PageFetcher>,
    pub cache_max_age_secs: u64,
    pub avatar_profile_url: Arc<str>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(config)?;
        Ok(Self::with_fetcher(Arc::new(fetcher), config))
    }

    pub fn with_fetcher(fetcher: Arc<dyn PageFetcher>, config: &Config) -> Self {
        Self {
            fetcher,
            cache_max_age_secs: config.cache_max_age_secs(),
            avatar_profile_url: Arc::from(config.avatar_profile_url()),
        }
    }

    /// Cache-Control value for successful responses.
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_max_age_secs)
    }
}
