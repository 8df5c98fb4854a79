//! Profile avatars: preview a user's profile page, then fetch its image.

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::USERNAME_PLACEHOLDER;
use crate::fetcher::{FetchError, PageFetcher};
use crate::preview::{PreviewError, preview};

const MAX_USERNAME_LEN: usize = 64;
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum AvatarError {
    #[error("invalid username: {0:?}")]
    InvalidUsername(String),

    #[error("profile url template produced an invalid url: {0}")]
    InvalidTemplate(#[from] url::ParseError),

    #[error("{0}")]
    ProfileUnavailable(String),

    #[error("profile page {0} declares no image")]
    NoImage(String),

    #[error("avatar image responded with HTTP {}", .0.as_u16())]
    ImageUnavailable(reqwest::StatusCode),

    #[error(transparent)]
    Preview(#[from] PreviewError),

    #[error("avatar fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

#[derive(Debug, Clone)]
pub struct Avatar {
    pub source: Url,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Strip an optional leading `@` and check the remaining characters.
pub fn normalize_username(raw: &str) -> Result<&str, AvatarError> {
    let username = raw.trim();
    let username = username.strip_prefix('@').unwrap_or(username);

    let valid = !username.is_empty()
        && username.len() <= MAX_USERNAME_LEN
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if !valid || username == "." || username == ".." {
        return Err(AvatarError::InvalidUsername(raw.to_string()));
    }
    Ok(username)
}

pub fn profile_url(template: &str, username: &str) -> Result<Url, AvatarError> {
    let username = normalize_username(username)?;
    Ok(Url::parse(&template.replace(USERNAME_PLACEHOLDER, username))?)
}

/// Resolve and download the avatar of `username`.
#[instrument(skip(fetcher, template))]
pub async fn fetch_avatar(
    fetcher: &dyn PageFetcher,
    template: &str,
    username: &str,
) -> Result<Avatar, AvatarError> {
    let profile = profile_url(template, username)?;
    let metadata = preview(fetcher, profile.as_str()).await?;

    if let Some(error) = metadata.error {
        return Err(AvatarError::ProfileUnavailable(error));
    }
    let image = metadata
        .image
        .ok_or_else(|| AvatarError::NoImage(profile.to_string()))?;
    let source = Url::parse(&image).map_err(|_| AvatarError::NoImage(profile.to_string()))?;
    debug!(%source, "fetching avatar image");

    let raw = fetcher.fetch(&source).await.map_err(|err| match err {
        FetchError::Http { status } => AvatarError::ImageUnavailable(status),
        other => AvatarError::Fetch(other),
    })?;

    Ok(Avatar {
        source,
        content_type: raw
            .content_type
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string()),
        bytes: raw.body_raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{RawPage, client::MockPageFetcher};
    use reqwest::StatusCode;

    const TEMPLATE: &str = "https://profiles.example.com/{username}";

    fn page(url: &Url, content_type: Option<&str>, body: &'static [u8]) -> RawPage {
        RawPage {
            url_final: url.clone(),
            status: StatusCode::OK,
            content_type: content_type.map(str::to_string),
            body_raw: Bytes::from_static(body),
        }
    }

    #[test]
    fn usernames_are_validated() {
        assert_eq!(normalize_username("octocat").unwrap(), "octocat");
        assert_eq!(normalize_username(" @jane.doe-1 ").unwrap(), "jane.doe-1");

        let too_long = "x".repeat(65);
        for bad in ["", "@", "..", "a/b", "a?b", "name with space", too_long.as_str()] {
            assert!(
                matches!(normalize_username(bad), Err(AvatarError::InvalidUsername(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn profile_url_substitutes_the_username() {
        let url = profile_url(TEMPLATE, "@octocat").unwrap();
        assert_eq!(url.as_str(), "https://profiles.example.com/octocat");
    }

    #[tokio::test]
    async fn test_fetch_avatar_success() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().times(2).returning(|url| match url.path() {
            "/octocat" => Ok(page(
                url,
                Some("text/html"),
                br#"<meta property="og:image" content="/avatars/octocat.png">"#,
            )),
            _ => Ok(page(url, Some("image/png"), b"\x89PNG")),
        });

        let avatar = fetch_avatar(&fetcher, TEMPLATE, "octocat").await.unwrap();
        assert_eq!(
            avatar.source.as_str(),
            "https://profiles.example.com/avatars/octocat.png"
        );
        assert_eq!(avatar.content_type, "image/png");
        assert_eq!(&avatar.bytes[..], b"\x89PNG");
    }

    #[tokio::test]
    async fn test_fetch_avatar_missing_profile() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().times(1).returning(|_| {
            Err(FetchError::Http {
                status: StatusCode::NOT_FOUND,
            })
        });

        let result = fetch_avatar(&fetcher, TEMPLATE, "ghost").await;
        assert!(matches!(result, Err(AvatarError::ProfileUnavailable(msg)) if msg.contains("404")));
    }

    #[tokio::test]
    async fn test_fetch_avatar_without_image() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|url| Ok(page(url, Some("text/html"), b"<title>No picture</title>")));

        let result = fetch_avatar(&fetcher, TEMPLATE, "plain").await;
        assert!(matches!(result, Err(AvatarError::NoImage(_))));
    }

    #[tokio::test]
    async fn test_fetch_avatar_image_error_status() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().times(2).returning(|url| match url.path() {
            "/broken" => Ok(page(
                url,
                Some("text/html"),
                br#"<meta property="og:image" content="https://img.example.com/gone.png">"#,
            )),
            _ => Err(FetchError::Http {
                status: StatusCode::GONE,
            }),
        });

        let result = fetch_avatar(&fetcher, TEMPLATE, "broken").await;
        assert!(matches!(
            result,
            Err(AvatarError::ImageUnavailable(status)) if status == StatusCode::GONE
        ));
    }

    #[tokio::test]
    async fn test_fetch_avatar_rejects_username_before_fetching() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().never();

        let result = fetch_avatar(&fetcher, TEMPLATE, "../admin").await;
        assert!(matches!(result, Err(AvatarError::InvalidUsername(_))));
    }
}
