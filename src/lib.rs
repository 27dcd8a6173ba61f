//! mcp-test-server: minimal MCP server for protocol conformance testing
//!
//! This library implements the protocol/dispatch core of a Model Context
//! Protocol server: JSON-RPC 2.0 framing over stdio and WebSocket
//! transports, method routing, a fixed tool catalog, and the closed error
//! taxonomy. It exists to exercise the protocol compliance of MCP clients,
//! so the wire contract — not the tool logic — is the point.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Ambient error types
//! - [`mcp`] — Protocol core: envelopes, dispatcher, registry, transports
//! - [`shutdown`] — Cooperative shutdown signal handling

pub mod config;
pub mod error;
pub mod mcp;
pub mod shutdown;
