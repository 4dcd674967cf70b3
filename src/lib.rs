//! kicad-pcb-mcp: MCP server exposing step-by-step PCB editing flows
//!
//! This library turns multi-step board editing procedures into chains of MCP
//! tools. Every step answers with a uniform envelope that names the tool to
//! call next, so an AI assistant is guided through a flow one decision at a
//! time.
//!
//! # Architecture
//!
//! - **Flows**: ordered actions, each published as its own tool. Steps share
//!   a per-flow context (the selected item type) that is cleared whenever the
//!   flow's first step runs.
//! - **Board analyzer**: read-only inspection tools answering plain JSON.
//! - **CAD engine**: the [`pcb::CadEngine`] / [`pcb::Board`] traits. The
//!   server binary uses an in-memory board persisted as JSON.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Error types
//! - [`flow`] — Action flow framework: registration, context, envelopes
//! - [`mcp`] — MCP protocol implementation and tool registry
//! - [`pcb`] — Board item model, CAD engine interface, renderer
//! - [`tools`] — The PCB flows and the board analyzer

pub mod config;
pub mod error;
pub mod flow;
pub mod mcp;
pub mod pcb;
pub mod tools;
