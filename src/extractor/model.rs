use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Preview record for one page.
///
/// Either the content fields or `error` are populated, never both. Absent
/// fields are left out of the JSON entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Canonical URL, or the requested URL when the page declares none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Absolute preview image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Encoding the document was decoded with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Metadata {
    /// Record for a target that answered with an error status.
    pub fn upstream_failure(target: &str, status: StatusCode) -> Self {
        Self {
            error: Some(format!(
                "Failed to fetch {}: upstream responded with HTTP {}",
                target,
                status.as_u16()
            )),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
