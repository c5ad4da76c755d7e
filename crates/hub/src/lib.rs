// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Huddle: real-time presence and call-signaling hub.
//!
//! Tracks which users are online over one WebSocket per client, brokers
//! WebRTC offer/answer/ICE exchange between browser peers, and fans chat
//! messages out to both participants' live connections. Persistence, auth,
//! and media transport are external collaborators — the hub only relays
//! opaque signaling payloads and tracks liveness.

pub mod calls;
pub mod config;
pub mod error;
pub mod events;
pub mod hub;
pub mod registry;
pub mod state;
pub mod transport;

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::HubConfig;
use crate::state::HubState;
use crate::transport::build_router;

/// Run the hub until shutdown (ctrl-c cancels the state's shutdown token).
pub async fn run(config: HubConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("huddle hub listening on {addr}");

    let state = HubState::new(config);
    let shutdown = state.shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            shutdown.cancel();
        }
    });

    serve(listener, state).await
}

/// Serve the hub on an already-bound listener. Split out from [`run`] so
/// tests can bind an ephemeral port and stop the server via the shutdown
/// token.
pub async fn serve(listener: TcpListener, state: HubState) -> anyhow::Result<()> {
    let state = Arc::new(state);
    let shutdown = state.shutdown.clone();
    let router = build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    Ok(())
}
