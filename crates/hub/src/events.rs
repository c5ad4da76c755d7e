// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire-format event types for the hub's real-time protocol.
//!
//! Messages use internally-tagged JSON enums (`{"event": "call-offer", ...}`)
//! with kebab-case event names and camelCase payload fields. Two top-level
//! enums cover client-to-hub and hub-to-client directions. Signaling payloads
//! (SDP offers/answers, ICE candidates) are opaque `serde_json::Value`s — the
//! hub routes them, it never inspects them.

use serde::{Deserialize, Serialize};

/// A chat message as carried over the live channel.
///
/// The hub treats this as an opaque broadcast unit: persistence happens via
/// the REST layer before this event fires, and fields the hub does not know
/// about are preserved through the flattened `extra` map so clients receive
/// the object unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub conversation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Client -> Hub
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Start a call: relay the SDP offer to `receiver_id` unless busy.
    CallOffer {
        offer: serde_json::Value,
        receiver_id: String,
    },
    /// Answer a ringing call: relay the SDP answer back to the caller.
    CallAccepted {
        answer: serde_json::Value,
        receiver_id: String,
    },
    /// Decline a ringing call.
    CallRejected { receiver_id: String },
    /// Trickle ICE: relay one candidate to the peer.
    IceCandidate {
        candidate: serde_json::Value,
        receiver_id: String,
    },
    /// Hang up an active or ringing call.
    CallEnded { receiver_id: String },
    /// Fan a chat message out to both participants' live connections.
    SendMessage { message: ChatMessage },
}

// ---------------------------------------------------------------------------
// Hub -> Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Full online-user set, pushed to every connection on membership change.
    UpdateUsers { users: Vec<String> },
    /// Incoming call. `caller_id` is resolved from the sending connection,
    /// never taken from the payload.
    CallOffer {
        offer: serde_json::Value,
        caller_id: String,
    },
    CallAccepted { answer: serde_json::Value },
    /// Sent both when a callee declines and when the hub rejects an offer to
    /// a busy callee; only the busy rejection carries a message.
    CallRejected {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    IceCandidate { candidate: serde_json::Value },
    CallEnded,
    NewMessage { message: ChatMessage },
    /// Protocol error, e.g. an unparseable inbound event.
    Error { code: String, message: String },
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
