//! Model Context Protocol (MCP) server implementation.
//!
//! JSON-RPC 2.0 over newline-delimited stdio. Tools are published into a
//! [`ToolRegistry`] before the server starts; the server only dispatches.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          MCP Server                          │
//! │                                                              │
//! │   ┌─────────────┐    ┌─────────────┐    ┌──────────────┐     │
//! │   │  Transport  │───▶│   Server    │───▶│ ToolRegistry │     │
//! │   │   (stdio)   │    │ (lifecycle) │    │  (handlers)  │     │
//! │   └─────────────┘    └─────────────┘    └──────────────┘     │
//! │          ▲                                     │             │
//! │          └──────── progress notifications ◀────┘             │
//! │                     (ToolContext)                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod context;
pub mod params;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod transport;

pub use context::ToolContext;
pub use params::{ParamKind, ParamSpec};
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use registry::{ImageData, ToolDefinition, ToolHandler, ToolOutput, ToolRegistry};
pub use server::McpServer;
pub use transport::{StdioTransport, Transport};
