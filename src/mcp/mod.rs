//! Model Context Protocol (MCP) server implementation
//!
//! Exposes Trilium's ETAPI as six MCP tools. The server can be run over stdio
//! or mounted as a Streamable HTTP service.
//!
//! - **server**: tool catalog and dispatch, result envelope normalization
//! - **tools**: parameter types and handlers
//!   - NoteTools: search, read, create, update, move
//!   - AttributeTools: create, update, delete attributes
//! - **service**: Streamable HTTP service for an Axum router

pub mod server;
mod service;
pub mod tools;


pub use server::TriliumServer;
pub use service::create_mcp_service;
