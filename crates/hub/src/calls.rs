// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Call session tracker.
//!
//! Per-user state machine: `Idle → Ringing → InCall → Idle`, where Idle is
//! the absence of an entry. State is pair-keyed — both parties carry entries
//! pointing at each other — so either party's cleanup can find and notify the
//! other. There is no hold state and no ring timeout; a call leaves the
//! tracker only via accept-then-hangup, reject, or disconnect.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Ringing,
    InCall,
}

#[derive(Debug, Clone)]
pub struct CallSession {
    pub phase: CallPhase,
    pub peer: String,
}

#[derive(Default)]
pub struct CallTracker {
    sessions: HashMap<String, CallSession>,
}

impl CallTracker {
    /// A user is busy while ringing or in a call.
    pub fn is_busy(&self, user_id: &str) -> bool {
        self.sessions.contains_key(user_id)
    }

    pub fn phase(&self, user_id: &str) -> Option<CallPhase> {
        self.sessions.get(user_id).map(|s| s.phase)
    }

    /// Start ringing both parties of a new call.
    ///
    /// Returns `false` without any state change when the callee is already
    /// ringing or in a call; the caller's side is not checked, matching the
    /// observed hub behavior.
    pub fn try_ring(&mut self, caller: &str, callee: &str) -> bool {
        if self.is_busy(callee) {
            return false;
        }
        self.sessions.insert(
            caller.to_owned(),
            CallSession { phase: CallPhase::Ringing, peer: callee.to_owned() },
        );
        self.sessions.insert(
            callee.to_owned(),
            CallSession { phase: CallPhase::Ringing, peer: caller.to_owned() },
        );
        true
    }

    /// Move a ringing pair to `InCall`. Pure bookkeeping — the hub performs
    /// no SDP validation. No-op if the user has no session.
    pub fn accept(&mut self, user_id: &str) {
        let Some(peer) = self.sessions.get(user_id).map(|s| s.peer.clone()) else {
            return;
        };
        if let Some(s) = self.sessions.get_mut(user_id) {
            s.phase = CallPhase::InCall;
        }
        if let Some(s) = self.sessions.get_mut(&peer) {
            if s.peer == user_id {
                s.phase = CallPhase::InCall;
            }
        }
    }

    /// Reset a user and their call peer to idle (call ended or rejected).
    /// Both sides always leave together — there are no partial states.
    pub fn reset_pair(&mut self, user_id: &str) {
        let Some(session) = self.sessions.remove(user_id) else {
            return;
        };
        if let Some(peer_session) = self.sessions.get(&session.peer) {
            if peer_session.peer == user_id {
                self.sessions.remove(&session.peer);
            }
        }
    }

    /// Disconnect cleanup. Removes the user's session and the peer's half,
    /// returning the peer identity so the hub can deliver a `call-ended` to
    /// a party left ringing or mid-call.
    pub fn drop_user(&mut self, user_id: &str) -> Option<String> {
        let session = self.sessions.remove(user_id)?;
        match self.sessions.get(&session.peer) {
            Some(peer_session) if peer_session.peer == user_id => {
                self.sessions.remove(&session.peer);
                Some(session.peer)
            }
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
#[path = "calls_tests.rs"]
mod tests;
