// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP + WebSocket transport for the hub.

pub mod http;
pub mod ws;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::state::SharedState;

/// Build the axum `Router` with all hub routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(state.config.cors_origin.as_deref());
    Router::new()
        // The well-known realtime endpoint clients upgrade against.
        .route("/api/socketio", get(ws::ws_handler))
        // Health (no auth)
        .route("/api/v1/health", get(http::health))
        // REST view of presence
        .route("/api/v1/online", get(http::online))
        .layer(cors)
        .with_state(state)
}

/// Allow one configured origin, or any origin when none is configured.
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.and_then(|o| o.parse::<HeaderValue>().ok()) {
        Some(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    }
}
