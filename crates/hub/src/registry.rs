// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection registry: the bidirectional user ↔ connection mapping.
//!
//! Both directions are kept as inverse maps and mutated only together, so at
//! most one live connection exists per user identity at any time. A second
//! connection for the same identity evicts the first rather than being
//! rejected.

use std::collections::HashMap;

use uuid::Uuid;

use crate::state::PeerHandle;

#[derive(Default)]
pub struct ConnectionRegistry {
    /// connection id → user identity.
    conns: HashMap<Uuid, String>,
    /// user identity → live connection handle.
    users: HashMap<String, PeerHandle>,
}

impl ConnectionRegistry {
    /// Record a new connection for `peer.user_id`.
    ///
    /// If the identity already maps to a live connection, that prior handle is
    /// removed from both maps and returned so the caller can cancel it.
    /// After this call exactly one connection is associated with the identity.
    pub fn register(&mut self, peer: PeerHandle) -> Option<PeerHandle> {
        let evicted = self.users.remove(&peer.user_id);
        if let Some(ref old) = evicted {
            self.conns.remove(&old.conn_id);
        }
        self.conns.insert(peer.conn_id, peer.user_id.clone());
        self.users.insert(peer.user_id.clone(), peer);
        evicted
    }

    /// Remove both directions of the mapping for `conn_id`, returning the
    /// user identity it carried. Idempotent: absent ids are a no-op.
    pub fn unregister(&mut self, conn_id: Uuid) -> Option<String> {
        let user_id = self.conns.remove(&conn_id)?;
        self.users.remove(&user_id);
        Some(user_id)
    }

    /// Current connection for a user identity, if online.
    pub fn lookup(&self, user_id: &str) -> Option<&PeerHandle> {
        self.users.get(user_id)
    }

    /// User identity announced by a connection.
    pub fn user_for(&self, conn_id: Uuid) -> Option<&str> {
        self.conns.get(&conn_id).map(String::as_str)
    }

    /// All currently registered user identities, sorted for deterministic
    /// broadcasts. De-duplicated by construction: the map is user-keyed.
    pub fn online_users(&self) -> Vec<String> {
        let mut users: Vec<String> = self.users.keys().cloned().collect();
        users.sort();
        users
    }

    /// Handles of every live connection.
    pub fn peers(&self) -> impl Iterator<Item = &PeerHandle> {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
