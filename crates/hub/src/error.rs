// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for the hub protocol.
///
/// Everything the hub cannot act on is handled locally (logged and dropped);
/// these codes only surface on the wire where the client can do something
/// about it — a malformed event, or a connect without an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HubError {
    MissingIdentity,
    BadRequest,
}

impl HubError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingIdentity => "MISSING_IDENTITY",
            Self::BadRequest => "BAD_REQUEST",
        }
    }
}

impl fmt::Display for HubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
