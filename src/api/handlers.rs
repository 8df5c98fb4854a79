use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::{
    api::{
        dtos::{AvatarQuery, ErrorResponse, PreviewQuery, non_blank},
        help::usage,
    },
    app_state::AppState,
    avatar::{AvatarError, fetch_avatar},
    extractor::Metadata,
    preview::{PreviewError, preview},
};

const NO_STORE: &str = "no-store";

#[utoipa::path(
    get,
    path = "/",
    tag = "preview",
    params(PreviewQuery),
    responses(
        (status = 200, description = "Preview record, or a record carrying only `error` when the page answered with an error status", body = Metadata),
        (status = 400, description = "Missing or malformed `q`; usage text", body = String, content_type = "text/plain"),
        (status = 422, description = "Page could not be reached", body = ErrorResponse)
    )
)]
pub async fn preview_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PreviewQuery>,
) -> Response {
    let Some(page_url) = non_blank(&query.q) else {
        return help_response(&headers);
    };

    match preview(state.fetcher.as_ref(), page_url).await {
        Ok(metadata) => {
            let cache_control = if metadata.is_error() {
                NO_STORE.to_string()
            } else {
                state.cache_control()
            };
            (
                StatusCode::OK,
                [(header::CACHE_CONTROL, cache_control)],
                Json(metadata),
            )
                .into_response()
        }
        Err(PreviewError::Fetch(err)) => {
            warn!(page_url, error = %err, "preview fetch failed");
            error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Failed to fetch {}: {}", page_url, err),
            )
        }
        Err(err) => {
            debug!(page_url, error = %err, "rejected preview target");
            help_response(&headers)
        }
    }
}

#[utoipa::path(
    get,
    path = "/avatar",
    tag = "avatar",
    params(AvatarQuery),
    responses(
        (status = 200, description = "Avatar image bytes with the upstream content type", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 400, description = "Missing or invalid username", body = ErrorResponse),
        (status = 404, description = "Profile missing or has no image", body = ErrorResponse),
        (status = 422, description = "Profile or image could not be reached", body = ErrorResponse),
        (status = 502, description = "Image answered with an error status", body = ErrorResponse)
    )
)]
pub async fn avatar(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AvatarQuery>,
) -> Response {
    let Some(username) = non_blank(&query.u) else {
        return help_response(&headers);
    };

    match fetch_avatar(state.fetcher.as_ref(), &state.avatar_profile_url, username).await {
        Ok(avatar) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, avatar.content_type),
                (header::CACHE_CONTROL, state.cache_control()),
            ],
            Body::from(avatar.bytes),
        )
            .into_response(),
        Err(err) => {
            let status = avatar_error_status(&err);
            if status.is_server_error() {
                warn!(username, error = %err, "avatar lookup failed");
            } else {
                debug!(username, error = %err, "avatar lookup failed");
            }
            error_response(status, err.to_string())
        }
    }
}

fn avatar_error_status(err: &AvatarError) -> StatusCode {
    match err {
        AvatarError::InvalidUsername(_) => StatusCode::BAD_REQUEST,
        AvatarError::ProfileUnavailable(_) | AvatarError::NoImage(_) => StatusCode::NOT_FOUND,
        AvatarError::ImageUnavailable(_) => StatusCode::BAD_GATEWAY,
        AvatarError::Fetch(_) | AvatarError::Preview(PreviewError::Fetch(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        // the profile URL comes from configuration, so these are our fault
        AvatarError::InvalidTemplate(_) | AvatarError::Preview(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(status: StatusCode, error: String) -> Response {
    (
        status,
        [(header::CACHE_CONTROL, NO_STORE)],
        Json(ErrorResponse { error }),
    )
        .into_response()
}

fn help_response(headers: &HeaderMap) -> Response {
    let host = headers.get(header::HOST).and_then(|h| h.to_str().ok());
    (
        StatusCode::BAD_REQUEST,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, NO_STORE),
        ],
        usage(host),
    )
        .into_response()
}
