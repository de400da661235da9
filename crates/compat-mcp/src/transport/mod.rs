//! Transport layer for serving MCP
//!
//! Messages are whole JSON-RPC payloads; framing belongs to the transport.

use async_trait::async_trait;
use compat_core::Result;

pub mod stdio;

pub use stdio::StdioTransport;

#[async_trait]
pub trait ServerTransport: Send {
    /// Next inbound message, or `None` once the peer has closed the stream.
    async fn read_message(&mut self) -> Result<Option<String>>;

    async fn write_message(&mut self, message: &str) -> Result<()>;

    async fn close(&mut self) -> Result<()>;
}
