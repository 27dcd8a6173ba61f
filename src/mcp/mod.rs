//! Model Context Protocol (MCP) server implementation.
//!
//! This module implements the protocol/dispatch core: JSON-RPC 2.0 message
//! framing over two transports, request/notification distinction, method
//! routing, tool invocation, and the error taxonomy. The server exists to
//! exercise protocol compliance of MCP clients under test, so the wire
//! contract is the load-bearing part; the tools themselves are deliberately
//! trivial.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        MCP Test Server                       │
//! │                                                              │
//! │   ┌──────────────┐    ┌─────────────┐    ┌──────────────┐   │
//! │   │  Transport   │───▶│  Dispatcher │───▶│   Registry   │   │
//! │   │ (stdio / ws) │    │ (stateless) │    │ (fixed tools)│   │
//! │   └──────────────┘    └─────────────┘    └──────────────┘   │
//! │          │                   │                               │
//! │          ▼                   ▼                               │
//! │   ┌──────────────────────────────────────────────────┐      │
//! │   │           JSON-RPC 2.0 message units             │      │
//! │   └──────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session loop ([`session::Session`]) owns one transport and feeds the
//! shared, immutable dispatcher; any number of sessions run concurrently.

pub mod dispatcher;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod transport;
pub mod websocket;

pub use dispatcher::{Dispatcher, ServerContext};
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use registry::ToolRegistry;
pub use session::{Session, SessionState, Transport};
pub use transport::StdioTransport;
