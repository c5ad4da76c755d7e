// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end hub tests.
//!
//! Serves the real hub in-process on an ephemeral port and exercises it over
//! HTTP and WebSocket with an actual client stack.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use huddle::config::HubConfig;
use huddle::state::HubState;

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A hub served in-process, shut down on drop.
pub struct HubServer {
    pub addr: SocketAddr,
    shutdown: CancellationToken,
}

impl HubServer {
    pub async fn start() -> anyhow::Result<Self> {
        let config = HubConfig::parse_from(["huddle"]);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = HubState::new(config);
        let shutdown = state.shutdown.clone();
        tokio::spawn(async move {
            let _ = huddle::serve(listener, state).await;
        });
        Ok(Self { addr, shutdown })
    }

    /// WebSocket URL announcing `user_id` at connect time.
    pub fn ws_url(&self, user_id: &str) -> String {
        format!("ws://{}/api/socketio?userId={user_id}", self.addr)
    }

    /// WebSocket URL with no identity supplied.
    pub fn ws_url_anonymous(&self) -> String {
        format!("ws://{}/api/socketio", self.addr)
    }

    /// Open a client connection for `user_id`.
    pub async fn client(&self, user_id: &str) -> anyhow::Result<WsClient> {
        let (ws, _resp) = connect_async(self.ws_url(user_id)).await?;
        Ok(ws)
    }
}

impl Drop for HubServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Make a raw HTTP/1.1 GET request, returning the response body.
pub async fn http_get(addr: SocketAddr, path: &str) -> anyhow::Result<String> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut stream = TcpStream::connect(addr).await?;
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    let response = String::from_utf8(buf)?;

    let body = response.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or("").to_string();
    Ok(body)
}

/// Read frames until the next text message, parsed as JSON.
pub async fn next_json(ws: &mut WsClient) -> anyhow::Result<serde_json::Value> {
    let deadline = tokio::time::Instant::now() + TIMEOUT;
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        let msg = tokio::time::timeout(remaining, ws.next())
            .await
            .map_err(|_| anyhow::anyhow!("timed out waiting for a text frame"))?;
        match msg {
            Some(Ok(Message::Text(text))) => return Ok(serde_json::from_str(&text)?),
            Some(Ok(_)) => continue,
            Some(Err(e)) => anyhow::bail!("websocket error: {e}"),
            None => anyhow::bail!("connection closed while waiting for a text frame"),
        }
    }
}

/// Read frames until an event with the given tag arrives, parsed as JSON.
pub async fn next_event(ws: &mut WsClient, event: &str) -> anyhow::Result<serde_json::Value> {
    let deadline = tokio::time::Instant::now() + TIMEOUT;
    loop {
        if tokio::time::Instant::now() > deadline {
            anyhow::bail!("timed out waiting for `{event}`");
        }
        let value = next_json(ws).await?;
        if value["event"] == event {
            return Ok(value);
        }
    }
}

/// Wait for the close frame, returning its close code.
pub async fn next_close_code(ws: &mut WsClient) -> anyhow::Result<u16> {
    let deadline = tokio::time::Instant::now() + TIMEOUT;
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        let msg = tokio::time::timeout(remaining, ws.next())
            .await
            .map_err(|_| anyhow::anyhow!("timed out waiting for close"))?;
        match msg {
            Some(Ok(Message::Close(Some(frame)))) => return Ok(frame.code.into()),
            Some(Ok(Message::Close(None))) => anyhow::bail!("close frame carried no code"),
            Some(Ok(_)) => continue,
            Some(Err(e)) => anyhow::bail!("websocket error: {e}"),
            None => anyhow::bail!("connection ended without a close frame"),
        }
    }
}
