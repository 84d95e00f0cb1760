//! Runtime control facade.
//!
//! [`RuntimeFacade`] forwards container, image and network operations to an
//! injected engine client with light pre- and post-processing: default
//! substitution, filter construction and linear scans over listings. Engine
//! errors pass through unchanged inside `EngineError::Api`.
//!
//! Every remote call races the facade's call context. Cancelling the context
//! aborts in-flight calls with `EngineError::Cancelled`, and streams handed
//! back to the caller yield that error once and then end.

mod containers;
mod exec;
mod images;
mod logs;
mod networks;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use bollard::errors::Error as BollardError;
use futures_util::{Stream, StreamExt, stream};
use tokio_util::sync::CancellationToken;

pub use self::containers::{ContainerSpec, DEFAULT_STOP_TIMEOUT_SECS};
pub use self::exec::ByteStream;
pub use self::images::{ImageArchive, ImagePresence};
pub use self::logs::{BufferSink, LOG_CONTENT_TYPE, LogSink, LogsRequest};
use super::client::EngineStream;
use crate::error::{DockhandError, EngineError};

/// Facade over a container engine client.
///
/// `C` is the engine client; production code uses `bollard::Docker`, tests
/// substitute `mockall` doubles. All operations take `&self`, so a facade can
/// be shared between tasks.
#[derive(Debug, Clone)]
pub struct RuntimeFacade<C> {
    client: C,
    context: CancellationToken,
}

impl<C> RuntimeFacade<C> {
    /// Wrap `client` with a call context scoped to the facade's lifetime.
    #[must_use]
    pub fn new(client: C) -> Self {
        Self::with_context(client, CancellationToken::new())
    }

    /// Wrap `client` with a caller-owned call context.
    #[must_use]
    pub const fn with_context(client: C, context: CancellationToken) -> Self {
        Self { client, context }
    }

    /// Returns the underlying engine client.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Returns the call context shared by every operation.
    #[must_use]
    pub const fn context(&self) -> &CancellationToken {
        &self.context
    }

    /// Await an engine call unless the context is cancelled first.
    async fn call<T, F>(&self, request: F) -> Result<T, DockhandError>
    where
        F: Future<Output = Result<T, BollardError>>,
    {
        tokio::select! {
            biased;
            () = self.context.cancelled() => Err(DockhandError::from(EngineError::Cancelled)),
            result = request => result.map_err(DockhandError::from),
        }
    }

    /// Tie an engine stream to the call context.
    ///
    /// The returned stream converts engine errors into `EngineError` and,
    /// once the context is cancelled, yields `EngineError::Cancelled` and
    /// ends. It keeps returning `None` if polled after it has ended.
    fn guard<'a, T>(&self, source: EngineStream<'a, T>) -> GuardedStream<'a, T>
    where
        T: Send + 'a,
    {
        let token = self.context.clone();
        Box::pin(stream::unfold(
            (source, token, false),
            |(mut source, token, cancelled)| async move {
                if cancelled {
                    return None;
                }
                let item = tokio::select! {
                    biased;
                    () = token.clone().cancelled_owned() => Some(Err(EngineError::Cancelled)),
                    next = source.next() => next.map(|result| result.map_err(EngineError::from)),
                };
                item.map(|result| {
                    let stop = matches!(result, Err(EngineError::Cancelled));
                    (result, (source, token, stop))
                })
            },
        )
        .fuse())
    }
}

/// Engine stream bound to a call context.
pub type GuardedStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T, EngineError>> + Send + 'a>>;

/// Build a single-key engine filter map.
fn filter(key: &str, value: &str) -> HashMap<String, Vec<String>> {
    HashMap::from([(String::from(key), vec![String::from(value)])])
}
