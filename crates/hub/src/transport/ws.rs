// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket transport: upgrade, identity check, and the per-connection
//! reader/writer tasks.
//!
//! Each connection runs a reader loop (inbound events → hub dispatch) and a
//! writer task (outbox → sink, plus keepalive pings). The two halves share a
//! `CancellationToken`: eviction, pong timeout, or either half exiting tears
//! the whole connection down.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::HubError;
use crate::events::{ClientEvent, ServerEvent};
use crate::hub;
use crate::state::{epoch_ms, PeerHandle, SharedState};

/// Close codes in the application range.
/// 4001 = no user identity supplied at connect time
/// 4002 = superseded by a newer connection for the same identity
pub const CLOSE_IDENTITY_REQUIRED: u16 = 4001;
pub const CLOSE_SUPERSEDED: u16 = 4002;

/// Query parameters for the WebSocket upgrade. The client announces its
/// logical identity here; the socket layer does not authenticate it (the
/// trust boundary sits with the surrounding application).
#[derive(Debug, Clone, Deserialize)]
pub struct WsQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// `GET /api/socketio?userId=<id>` — WebSocket upgrade.
///
/// A connect without an identity is refused: the upgrade completes so the
/// close code reaches the client, then the socket is closed immediately and
/// never registered.
pub async fn ws_handler(
    State(state): State<SharedState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    match query.user_id.filter(|u| !u.is_empty()) {
        Some(user_id) => ws
            .on_upgrade(move |socket| handle_connection(state, user_id, socket))
            .into_response(),
        None => {
            tracing::warn!("rejecting connection, no user identity supplied");
            ws.on_upgrade(|mut socket| async move {
                let _ = socket
                    .send(Message::Close(Some(CloseFrame {
                        code: CLOSE_IDENTITY_REQUIRED,
                        reason: HubError::MissingIdentity.as_str().into(),
                    })))
                    .await;
            })
            .into_response()
        }
    }
}

/// Per-connection lifecycle: register, run the reader loop, clean up.
async fn handle_connection(state: SharedState, user_id: String, socket: WebSocket) {
    let conn_id = Uuid::new_v4();
    let (outbox, outbox_rx) = mpsc::unbounded_channel::<ServerEvent>();
    let cancel = CancellationToken::new();

    hub::connect(
        &state,
        PeerHandle {
            conn_id,
            user_id: user_id.clone(),
            outbox: outbox.clone(),
            cancel: cancel.clone(),
        },
    )
    .await;

    tracing::info!(%conn_id, user_id = %user_id, "client connected");

    let last_pong = Arc::new(AtomicU64::new(epoch_ms()));
    let (ws_tx, mut ws_rx) = socket.split();
    let writer = tokio::spawn(writer_task(
        ws_tx,
        outbox_rx,
        state.config.ping_interval(),
        state.config.pong_timeout(),
        Arc::clone(&last_pong),
        cancel.clone(),
    ));

    // Reader loop: per-connection ordering is this loop's sequencing.
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            msg = ws_rx.next() => match msg {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => hub::handle_event(&state, conn_id, event).await,
                    Err(err) => {
                        tracing::debug!(%conn_id, %err, "unparseable client event");
                        let _ = outbox.send(ServerEvent::Error {
                            code: HubError::BadRequest.as_str().to_owned(),
                            message: "invalid event".to_owned(),
                        });
                    }
                },
                Some(Ok(Message::Pong(_))) => {
                    last_pong.store(epoch_ms(), Ordering::Relaxed);
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(%conn_id, reason = ?frame, "client initiated close");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::debug!(%conn_id, %err, "websocket receive error");
                    break;
                }
                None => break,
            }
        }
    }

    // Abrupt and graceful termination take the same path. Closing the outbox
    // (the registry's clone is gone after `disconnect`) stops the writer; the
    // writer cancels the token itself on the way out, and the hub cancels it
    // directly only on eviction.
    hub::disconnect(&state, conn_id).await;
    drop(outbox);
    let _ = writer.await;

    tracing::info!(%conn_id, user_id = %user_id, "client disconnected");
}

/// Writer task: drains the outbox into the sink and drives keepalive.
///
/// Exits when the outbox closes (ordinary teardown, closes with 1000), the
/// sink errors, the pong deadline passes, or the connection token is
/// cancelled — which only the hub does, on eviction, so only that branch
/// closes with 4002. Always cancels the token on the way out so the reader
/// never outlives it.
async fn writer_task(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbox_rx: mpsc::UnboundedReceiver<ServerEvent>,
    ping_interval: Duration,
    pong_timeout: Duration,
    last_pong: Arc<AtomicU64>,
    cancel: CancellationToken,
) {
    let mut ping = tokio::time::interval(ping_interval);
    // Skip the immediate first tick.
    ping.tick().await;

    loop {
        tokio::select! {
            // Biased so eviction wins over the outbox closing in the same
            // instant: the superseded close code must be deterministic.
            biased;

            _ = cancel.cancelled() => {
                let _ = sink
                    .send(Message::Close(Some(CloseFrame {
                        code: CLOSE_SUPERSEDED,
                        reason: "superseded".into(),
                    })))
                    .await;
                break;
            }

            event = outbox_rx.recv() => match event {
                Some(event) => {
                    let Ok(json) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if sink.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                None => {
                    let _ = sink
                        .send(Message::Close(Some(CloseFrame {
                            code: close_code::NORMAL,
                            reason: "".into(),
                        })))
                        .await;
                    break;
                }
            },

            _ = ping.tick() => {
                let idle = epoch_ms().saturating_sub(last_pong.load(Ordering::Relaxed));
                if idle > pong_timeout.as_millis() as u64 {
                    tracing::debug!("pong timeout, closing connection");
                    let _ = sink
                        .send(Message::Close(Some(CloseFrame {
                            code: 1001,
                            reason: "pong timeout".into(),
                        })))
                        .await;
                    break;
                }
                if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }
        }
    }

    cancel.cancel();
}
