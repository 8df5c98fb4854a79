#![allow(dead_code)]

use axum::Router;
use std::time::Duration;
use unfurl::{api, app_state::AppState, config::Config};
use wiremock::MockServer;

pub fn test_config() -> Config {
    Config::default().with_timeouts(Duration::from_secs(2), Duration::from_secs(5))
}

/// Full router wired to a real `HttpFetcher`, with avatar profiles served by `server`.
pub fn test_app(server: &MockServer) -> Router {
    let config = test_config()
        .with_avatar_profile_url(format!("{}/users/{{username}}", server.uri()))
        .expect("valid avatar template");
    let state = AppState::new(&config).expect("Failed to build app state");
    api::router(state)
}
