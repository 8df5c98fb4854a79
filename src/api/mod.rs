pub mod dtos;
pub mod handlers;
pub mod help;

use axum::{
    Router,
    extract::Request,
    http::{HeaderName, Method},
    routing::get,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{app_state::AppState, extractor::Metadata, health};

const REQUEST_ID_HEADER: &str = "x-request-id";
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(OpenApi)]
#[openapi(
    paths(handlers::preview_page, handlers::avatar, health::health_check),
    components(schemas(Metadata, dtos::ErrorResponse, health::HealthResponse)),
    tags(
        (name = "preview", description = "Page preview metadata"),
        (name = "avatar", description = "Profile pictures"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

/// Full application router: routes, OpenAPI docs, CORS, tracing and request ids.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(PREFLIGHT_MAX_AGE);

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/", get(handlers::preview_page))
        .route("/avatar", get(handlers::avatar))
        .route("/healthz", get(health::health_check))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(cors),
        )
}
