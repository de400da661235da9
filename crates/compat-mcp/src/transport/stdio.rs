//! Newline-delimited JSON-RPC over a byte stream, normally the process's stdin/stdout

use async_trait::async_trait;
use compat_core::{CompatError, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use super::ServerTransport;

pub struct StdioTransport<R, W> {
    reader: BufReader<R>,
    writer: W,
    line: String,
}

impl<R, W> std::fmt::Debug for StdioTransport<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdioTransport").finish_non_exhaustive()
    }
}

impl StdioTransport<tokio::io::Stdin, tokio::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
            line: String::new(),
        }
    }
}

#[async_trait]
impl<R, W> ServerTransport for StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn read_message(&mut self) -> Result<Option<String>> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .await
                .map_err(|e| CompatError::McpError(format!("Failed to read from stdin: {}", e)))?;

            if read == 0 {
                info!("Client closed the input stream");
                return Ok(None);
            }

            let trimmed = self.line.trim();
            if !trimmed.is_empty() {
                debug!("Received: {}", trimmed);
                return Ok(Some(trimmed.to_string()));
            }
        }
    }

    async fn write_message(&mut self, message: &str) -> Result<()> {
        debug!("Sending: {}", message);
        self.writer
            .write_all(message.as_bytes())
            .await
            .map_err(|e| CompatError::McpError(format!("Failed to write to stdout: {}", e)))?;
        self.writer
            .write_all(b"\n")
            .await
            .map_err(|e| CompatError::McpError(format!("Failed to write newline: {}", e)))?;
        self.writer
            .flush()
            .await
            .map_err(|e| CompatError::McpError(format!("Failed to flush stdout: {}", e)))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        info!("Closing stdio transport");
        self.writer.shutdown().await?;
        Ok(())
    }
}
