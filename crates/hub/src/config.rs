// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Configuration for the huddle hub.
#[derive(Debug, Clone, clap::Parser)]
pub struct HubConfig {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "HUDDLE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 4600, env = "HUDDLE_PORT")]
    pub port: u16,

    /// Keepalive ping interval in milliseconds.
    #[arg(long, default_value_t = 25000, env = "HUDDLE_PING_INTERVAL_MS")]
    pub ping_interval_ms: u64,

    /// Close a connection if no pong arrives within this many milliseconds.
    #[arg(long, default_value_t = 60000, env = "HUDDLE_PONG_TIMEOUT_MS")]
    pub pong_timeout_ms: u64,

    /// Allowed CORS origin. If unset, any origin is allowed.
    #[arg(long, env = "HUDDLE_CORS_ORIGIN")]
    pub cors_origin: Option<String>,
}

impl HubConfig {
    pub fn ping_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.ping_interval_ms)
    }

    pub fn pong_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.pong_timeout_ms)
    }
}
