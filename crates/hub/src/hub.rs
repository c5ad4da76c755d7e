// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event dispatch: presence broadcasting, signaling relay, and chat fan-out.
//!
//! Each handler locks the shared core once, queues the outbound deliveries it
//! decided on, drops the lock, then pushes — pushing to an unbounded outbox
//! never awaits, so no connection's handler can stall another's.

use uuid::Uuid;

use crate::events::{ClientEvent, ServerEvent};
use crate::state::{HubCore, PeerHandle, SharedState};

/// Queued outbound deliveries for one handler invocation.
type Deliveries = Vec<(PeerHandle, ServerEvent)>;

/// Register a newly upgraded connection.
///
/// Evicts any prior connection for the same identity (cancelling it so the
/// transport closes it), clears call state the evicted connection held, and
/// rebroadcasts presence.
pub async fn connect(state: &SharedState, peer: PeerHandle) {
    let user_id = peer.user_id.clone();
    let conn_id = peer.conn_id;
    let mut deliveries: Deliveries = Vec::new();

    let evicted = {
        let mut core = state.core.lock().await;
        let evicted = core.registry.register(peer);
        if evicted.is_some() {
            // The replaced connection may have been mid-call; its peer must
            // not be left ringing.
            queue_call_teardown(&mut core, &user_id, &mut deliveries);
        }
        queue_presence(&core, &mut deliveries);
        evicted
    };

    if let Some(old) = evicted {
        tracing::info!(
            user_id = %user_id,
            old_conn = %old.conn_id,
            new_conn = %conn_id,
            "evicting previous connection"
        );
        old.cancel.cancel();
    }

    flush(deliveries);
}

/// Tear down a connection: registry removal, call cleanup with peer
/// notification, presence rebroadcast. Idempotent — a connection that was
/// already evicted (and therefore unregistered) is a no-op, and in
/// particular never touches the identity's replacement connection.
pub async fn disconnect(state: &SharedState, conn_id: Uuid) {
    let mut deliveries: Deliveries = Vec::new();

    {
        let mut core = state.core.lock().await;
        let Some(user_id) = core.registry.unregister(conn_id) else {
            return;
        };
        tracing::info!(%conn_id, user_id = %user_id, "connection unregistered");
        queue_call_teardown(&mut core, &user_id, &mut deliveries);
        queue_presence(&core, &mut deliveries);
    }

    flush(deliveries);
}

/// Dispatch one inbound event from a registered connection.
pub async fn handle_event(state: &SharedState, conn_id: Uuid, event: ClientEvent) {
    let mut deliveries: Deliveries = Vec::new();

    {
        let mut core = state.core.lock().await;
        let Some(sender) = core.registry.user_for(conn_id).map(str::to_owned) else {
            tracing::debug!(%conn_id, "event from unregistered connection dropped");
            return;
        };

        match event {
            ClientEvent::CallOffer { offer, receiver_id } => {
                let Some(receiver) = core.registry.lookup(&receiver_id).cloned() else {
                    // Offline destination: dropped, not surfaced to the
                    // caller. Absence of a response is the signal.
                    tracing::debug!(caller = %sender, callee = %receiver_id, "call offer to offline user dropped");
                    return;
                };
                if core.calls.try_ring(&sender, &receiver_id) {
                    tracing::info!(caller = %sender, callee = %receiver_id, "forwarding call offer");
                    deliveries.push((receiver, ServerEvent::CallOffer { offer, caller_id: sender }));
                } else {
                    tracing::debug!(caller = %sender, callee = %receiver_id, "callee busy, rejecting offer");
                    if let Some(me) = core.registry.lookup(&sender) {
                        deliveries.push((
                            me.clone(),
                            ServerEvent::CallRejected { message: Some("User is busy".to_owned()) },
                        ));
                    }
                }
            }

            ClientEvent::CallAccepted { answer, receiver_id } => {
                core.calls.accept(&sender);
                if let Some(handle) = core.registry.lookup(&receiver_id) {
                    deliveries.push((handle.clone(), ServerEvent::CallAccepted { answer }));
                }
            }

            ClientEvent::CallRejected { receiver_id } => {
                core.calls.reset_pair(&sender);
                if let Some(handle) = core.registry.lookup(&receiver_id) {
                    deliveries.push((handle.clone(), ServerEvent::CallRejected { message: None }));
                }
            }

            ClientEvent::IceCandidate { candidate, receiver_id } => {
                if let Some(handle) = core.registry.lookup(&receiver_id) {
                    deliveries.push((handle.clone(), ServerEvent::IceCandidate { candidate }));
                }
            }

            ClientEvent::CallEnded { receiver_id } => {
                core.calls.reset_pair(&sender);
                if let Some(handle) = core.registry.lookup(&receiver_id) {
                    deliveries.push((handle.clone(), ServerEvent::CallEnded));
                }
            }

            ClientEvent::SendMessage { message } => {
                // Live-UI notification only; persistence already happened via
                // the REST layer. Delivered to each resolved side, no dedup.
                if let Some(handle) = core.registry.lookup(&message.sender_id) {
                    deliveries.push((handle.clone(), ServerEvent::NewMessage { message: message.clone() }));
                }
                if let Some(handle) = core.registry.lookup(&message.receiver_id) {
                    deliveries.push((handle.clone(), ServerEvent::NewMessage { message }));
                }
            }
        }
    }

    flush(deliveries);
}

/// Queue the full current online set (never a delta) to every connection.
fn queue_presence(core: &HubCore, deliveries: &mut Deliveries) {
    let users = core.registry.online_users();
    tracing::debug!(online = users.len(), "broadcasting presence");
    for peer in core.registry.peers() {
        deliveries.push((peer.clone(), ServerEvent::UpdateUsers { users: users.clone() }));
    }
}

/// Remove `user_id`'s call session; if a peer was still paired with them,
/// queue a `call-ended` so the other party's UI does not hang.
fn queue_call_teardown(core: &mut HubCore, user_id: &str, deliveries: &mut Deliveries) {
    if let Some(peer_user) = core.calls.drop_user(user_id) {
        tracing::debug!(user_id = %user_id, peer = %peer_user, "ending call on teardown");
        if let Some(handle) = core.registry.lookup(&peer_user) {
            deliveries.push((handle.clone(), ServerEvent::CallEnded));
        }
    }
}

/// Push queued deliveries. Runs after the core lock is dropped.
fn flush(deliveries: Deliveries) {
    for (handle, event) in deliveries {
        handle.push(event);
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
