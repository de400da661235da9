//! MCP server for the TypeScript / @typescript-eslint compatibility advisor
//!
//! Exposes one resource template (`ts-eslint-compat://{typescriptVersion}`)
//! and one tool (`check-typescript-eslint-compat`) over newline-delimited
//! JSON-RPC. Both call the same [`compat_engine::CompatEngine`].

pub mod resource;
pub mod server;
pub mod transport;
pub mod types;

pub use resource::{CompatResource, ResourceTemplate};
pub use server::McpServer;
pub use transport::{ServerTransport, StdioTransport};
pub use types::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
