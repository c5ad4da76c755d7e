// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the hub.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub connections: usize,
}

#[derive(Debug, Serialize)]
pub struct OnlineResponse {
    pub users: Vec<String>,
}

/// `GET /api/v1/health`
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let core = state.core.lock().await;
    Json(HealthResponse { status: "ok".to_owned(), connections: core.registry.len() })
}

/// `GET /api/v1/online` — REST view of the same set `update-users` carries.
pub async fn online(State(state): State<SharedState>) -> Json<OnlineResponse> {
    let core = state.core.lock().await;
    Json(OnlineResponse { users: core.registry.online_users() })
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
