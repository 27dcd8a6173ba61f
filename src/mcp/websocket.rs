//! Message-framed WebSocket transport and accept loop.
//!
//! Each accepted connection becomes one independent [`Session`], spawned on
//! its own task. Sessions share only the read-only dispatcher, so no locking
//! crosses connection boundaries.
//!
//! Framing rules:
//!
//! - one JSON-RPC envelope per text frame
//! - binary frames are silently ignored
//! - ping/pong are handled by the WebSocket layer and never surface here
//! - a close frame (or a dropped connection) ends the session cleanly

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::WebSocketStream;

use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::session::{Session, Transport};
use crate::shutdown;

/// A WebSocket-based MCP transport over one accepted connection.
pub struct WebSocketTransport {
    inner: WebSocketStream<TcpStream>,
}

impl WebSocketTransport {
    /// Wraps an accepted WebSocket stream.
    #[must_use]
    pub const fn new(inner: WebSocketStream<TcpStream>) -> Self {
        Self { inner }
    }
}

impl Transport for WebSocketTransport {
    /// Returns the next text frame as one message unit.
    ///
    /// Binary frames are skipped without error; control frames stay below
    /// this layer. A close frame or stream end yields `None`.
    async fn next_message(&mut self) -> io::Result<Option<String>> {
        while let Some(frame) = self.inner.next().await {
            match frame {
                Ok(Message::Text(text)) => return Ok(Some(text)),
                Ok(Message::Binary(_)) => {
                    tracing::debug!("Ignoring binary frame");
                }
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Ok(Message::Close(_)) => return Ok(None),
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => return Ok(None),
                Err(e) => return Err(io::Error::other(e)),
            }
        }

        Ok(None)
    }

    /// Sends one message unit as a single text frame.
    async fn send_message(&mut self, unit: &str) -> io::Result<()> {
        self.inner
            .send(Message::Text(unit.to_string()))
            .await
            .map_err(io::Error::other)
    }
}

/// Accepts connections and runs one session per connection until shutdown.
///
/// A shutdown signal stops the accept loop; in-flight sessions drain before
/// this function returns.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the signal handler
/// cannot be installed.
pub async fn serve(addr: &str, dispatcher: Arc<Dispatcher>) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "WebSocket MCP server listening");

    let mut sessions = JoinSet::new();

    let shutdown = shutdown::wait();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result?;
                break;
            }

            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        let dispatcher = Arc::clone(&dispatcher);
                        sessions.spawn(async move {
                            handle_connection(stream, peer, dispatcher).await;
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Error accepting connection");
                    }
                }
            }
        }
    }

    // Stop accepting, let in-flight sessions finish.
    drop(listener);
    if !sessions.is_empty() {
        tracing::info!(active_sessions = sessions.len(), "Draining sessions");
    }
    while sessions.join_next().await.is_some() {}

    Ok(())
}

/// Performs the WebSocket handshake and runs the session to completion.
async fn handle_connection(stream: TcpStream, peer: SocketAddr, dispatcher: Arc<Dispatcher>) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::error!(peer = %peer, error = %e, "WebSocket handshake failed");
            return;
        }
    };

    tracing::info!(peer = %peer, "Client connected");

    let mut session = Session::new(WebSocketTransport::new(ws_stream), dispatcher);
    match session.run().await {
        Ok(()) => tracing::info!(peer = %peer, "Client disconnected"),
        Err(e) => tracing::error!(peer = %peer, error = %e, "Connection error"),
    }
}
