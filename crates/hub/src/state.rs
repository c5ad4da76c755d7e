// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::calls::CallTracker;
use crate::config::HubConfig;
use crate::events::ServerEvent;
use crate::registry::ConnectionRegistry;

/// Handle to one live connection: the identity it announced plus the outbox
/// the rest of the hub pushes events through.
///
/// The outbox is an unbounded sender, so pushing never awaits — a slow client
/// can never stall the handler of another connection. Cancelling `cancel`
/// tears the connection down (used for eviction and keepalive timeouts).
#[derive(Debug, Clone)]
pub struct PeerHandle {
    pub conn_id: Uuid,
    pub user_id: String,
    pub outbox: mpsc::UnboundedSender<ServerEvent>,
    pub cancel: CancellationToken,
}

impl PeerHandle {
    /// Best-effort delivery. A closed outbox means the connection is already
    /// tearing down; the event is dropped, matching the hub's no-retry policy.
    pub fn push(&self, event: ServerEvent) {
        if self.outbox.send(event).is_err() {
            tracing::debug!(conn_id = %self.conn_id, user_id = %self.user_id, "outbox closed, event dropped");
        }
    }
}

/// The hub's only shared mutable state: registry + call tracker, mutated
/// together under one lock so their invariants (eviction clears call state,
/// disconnect notifies the call peer) stay atomic.
#[derive(Default)]
pub struct HubCore {
    pub registry: ConnectionRegistry,
    pub calls: CallTracker,
}

/// Shared hub state. One instance per process, passed by `Arc` into the
/// transport layer's connection tasks.
pub struct HubState {
    pub config: HubConfig,
    pub shutdown: CancellationToken,
    pub core: Mutex<HubCore>,
}

pub type SharedState = Arc<HubState>;

impl HubState {
    pub fn new(config: HubConfig) -> Self {
        Self {
            config,
            shutdown: CancellationToken::new(),
            core: Mutex::new(HubCore::default()),
        }
    }
}

/// Return current epoch millis.
pub fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
