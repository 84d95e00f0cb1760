//! Container log relay.
//!
//! Logs are copied as raw frames into a [`LogSink`], the writer side of an
//! HTTP response or a terminal. The sink learns the content type before the
//! first byte is written and before waiting on an idle container, so a
//! followed relay can commit its headers straight away. A rejection the
//! engine reports immediately leaves the sink untouched.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bollard::query_parameters::{LogsOptions, LogsOptionsBuilder};
use futures_util::StreamExt;
use futures_util::future::poll_immediate;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use super::RuntimeFacade;
use super::exec::frame_bytes;
use crate::engine::client::ContainerClient;
use crate::error::{DockhandError, EngineError};

/// Content type announced to log sinks.
pub const LOG_CONTENT_TYPE: &str = "application/octet-stream";

const LOGS_STREAM: &str = "logs";

/// Destination for relayed container logs.
pub trait LogSink: AsyncWrite + Unpin + Send {
    /// Record the content type of the bytes that follow.
    fn set_content_type(&mut self, content_type: &'static str);
}

impl LogSink for tokio::io::Stdout {
    fn set_content_type(&mut self, _content_type: &'static str) {}
}

/// In-memory sink that keeps the announced content type and every byte.
#[derive(Debug, Default)]
pub struct BufferSink {
    content_type: Option<&'static str>,
    buffer: Vec<u8>,
}

impl BufferSink {
    /// Returns the announced content type, if any.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        self.content_type
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }
}

impl LogSink for BufferSink {
    fn set_content_type(&mut self, content_type: &'static str) {
        self.content_type = Some(content_type);
    }
}

impl AsyncWrite for BufferSink {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().buffer).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().buffer).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().buffer).poll_shutdown(cx)
    }
}

/// Which slice of a container's log to relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogsRequest {
    /// Keep the relay open and forward new output as it is produced.
    pub follow: bool,
    /// Only output produced at or after this Unix timestamp; `0` for all.
    pub since: i32,
    /// Only output produced before this Unix timestamp; `0` for no bound.
    pub until: i32,
    /// Number of trailing lines, or `all`.
    pub tail: String,
}

impl Default for LogsRequest {
    fn default() -> Self {
        Self {
            follow: false,
            since: 0,
            until: 0,
            tail: String::from("all"),
        }
    }
}

impl LogsRequest {
    fn to_options(&self) -> LogsOptions {
        let tail = Some(self.tail.trim())
            .filter(|tail| !tail.is_empty())
            .unwrap_or("all");
        LogsOptionsBuilder::new()
            .follow(self.follow)
            .stdout(true)
            .stderr(true)
            .since(self.since)
            .until(self.until)
            .timestamps(false)
            .tail(tail)
            .build()
    }
}

impl<C: ContainerClient> RuntimeFacade<C> {
    /// Relay container `id`'s combined stdout and stderr into `sink`.
    ///
    /// With `request.follow` this returns only when the container stops
    /// producing output or the call context is cancelled.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Api` when the engine rejects the request and
    /// `EngineError::Relay` when writing fails. No bytes reach the sink
    /// before the engine has produced output.
    pub async fn container_logs<S>(
        &self,
        sink: &mut S,
        id: &str,
        request: &LogsRequest,
    ) -> Result<(), DockhandError>
    where
        S: LogSink + ?Sized,
    {
        debug!(container = id, follow = request.follow, tail = %request.tail, "relaying logs");
        let mut frames = self.guard(self.client.logs(id, Some(request.to_options())));

        let first = poll_immediate(frames.next()).await.flatten().transpose()?;
        sink.set_content_type(LOG_CONTENT_TYPE);

        if let Some(frame) = first {
            sink.write_all(&frame_bytes(frame))
                .await
                .map_err(relay_error)?;
        }
        while let Some(frame) = frames.next().await {
            sink.write_all(&frame_bytes(frame?))
                .await
                .map_err(relay_error)?;
        }
        sink.flush().await.map_err(relay_error)?;
        Ok(())
    }
}

fn relay_error(source: io::Error) -> DockhandError {
    DockhandError::from(EngineError::Relay {
        stream: LOGS_STREAM,
        source,
    })
}
