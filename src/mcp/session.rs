//! Server session: one transport plus its read-dispatch-write loop.
//!
//! A session owns exactly one [`Transport`] and drives it until
//! end-of-stream. Protocol-level errors produced by the dispatcher are
//! ordinary outbound messages and never terminate the loop; only transport
//! I/O failures do, and those propagate to the caller for logging.

use std::future::Future;
use std::io;
use std::sync::Arc;

use crate::mcp::dispatcher::Dispatcher;

/// A bidirectional channel of discrete textual message units.
///
/// Implemented by the stdio line transport and the WebSocket frame
/// transport; the session loop is written once against this seam.
pub trait Transport {
    /// Pulls the next message unit.
    ///
    /// Returns `Ok(None)` on end-of-stream (EOF or connection closed),
    /// which ends the owning session cleanly.
    fn next_message(&mut self) -> impl Future<Output = io::Result<Option<String>>> + Send;

    /// Pushes one message unit to the wire.
    fn send_message(&mut self, unit: &str) -> impl Future<Output = io::Result<()>> + Send;
}

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, not yet running.
    Ready,
    /// Inside the read-dispatch-write loop.
    Running,
    /// Loop finished, cleanly or not.
    Terminated,
}

/// One lifetime of a transport and its message loop.
///
/// Sessions share nothing but the read-only dispatcher, so any number of
/// them can run concurrently without locking.
pub struct Session<T> {
    transport: T,
    dispatcher: Arc<Dispatcher>,
    state: SessionState,
}

impl<T: Transport> Session<T> {
    /// Creates a session over a connected transport.
    #[must_use]
    pub fn new(transport: T, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            transport,
            dispatcher,
            state: SessionState::Ready,
        }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the message loop until end-of-stream.
    ///
    /// Messages are processed strictly in arrival order; a slow tool call
    /// blocks later messages on this session only.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails. The session is terminated
    /// either way.
    pub async fn run(&mut self) -> io::Result<()> {
        self.state = SessionState::Running;
        let result = self.serve().await;
        self.state = SessionState::Terminated;
        result
    }

    async fn serve(&mut self) -> io::Result<()> {
        loop {
            let Some(unit) = self.transport.next_message().await? else {
                return Ok(());
            };

            if let Some(reply) = self.dispatcher.dispatch(&unit) {
                self.transport.send_message(&reply).await?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::dispatcher::ServerContext;
    use std::collections::VecDeque;

    /// Replays a scripted sequence of inbound units and records replies.
    struct ScriptedTransport {
        incoming: VecDeque<String>,
        sent: Vec<String>,
        fail_on_send: bool,
    }

    impl ScriptedTransport {
        fn new(units: &[&str]) -> Self {
            Self {
                incoming: units.iter().map(ToString::to_string).collect(),
                sent: Vec::new(),
                fail_on_send: false,
            }
        }
    }

    impl Transport for ScriptedTransport {
        async fn next_message(&mut self) -> io::Result<Option<String>> {
            Ok(self.incoming.pop_front())
        }

        async fn send_message(&mut self, unit: &str) -> io::Result<()> {
            if self.fail_on_send {
                return Err(io::Error::from(io::ErrorKind::BrokenPipe));
            }
            self.sent.push(unit.to_string());
            Ok(())
        }
    }

    fn dispatcher() -> Arc<Dispatcher> {
        Arc::new(Dispatcher::new(ServerContext::new(
            "2025-03-26",
            "mcp-test-server",
        )))
    }

    #[tokio::test]
    async fn session_survives_malformed_input() {
        let transport = ScriptedTransport::new(&[
            "not valid json",
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#,
        ]);
        let mut session = Session::new(transport, dispatcher());

        session.run().await.unwrap();

        assert_eq!(session.state(), SessionState::Terminated);
        assert_eq!(session.transport.sent.len(), 2);

        let parse_error: serde_json::Value =
            serde_json::from_str(&session.transport.sent[0]).unwrap();
        assert_eq!(parse_error["error"]["code"], -32700);
        assert_eq!(parse_error["id"], serde_json::Value::Null);

        let listing: serde_json::Value = serde_json::from_str(&session.transport.sent[1]).unwrap();
        assert_eq!(listing["id"], 1);
        assert!(listing["result"]["tools"].is_array());
    }

    #[tokio::test]
    async fn notifications_produce_no_wire_output() {
        let transport = ScriptedTransport::new(&[
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":"missing_tool"}}"#,
        ]);
        let mut session = Session::new(transport, dispatcher());

        session.run().await.unwrap();

        assert!(session.transport.sent.is_empty());
        assert_eq!(session.state(), SessionState::Terminated);
    }

    #[tokio::test]
    async fn transport_failure_terminates_session() {
        let mut transport =
            ScriptedTransport::new(&[r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#]);
        transport.fail_on_send = true;
        let mut session = Session::new(transport, dispatcher());

        let result = session.run().await;

        assert!(result.is_err());
        assert_eq!(session.state(), SessionState::Terminated);
    }

    #[tokio::test]
    async fn end_of_stream_terminates_cleanly() {
        let mut session = Session::new(ScriptedTransport::new(&[]), dispatcher());
        assert_eq!(session.state(), SessionState::Ready);

        session.run().await.unwrap();

        assert_eq!(session.state(), SessionState::Terminated);
    }
}
