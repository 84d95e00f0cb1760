//! Maps low-level `bollard` connection failures onto [`EngineError`].
//!
//! Only connection establishment and the liveness ping go through this
//! classification. Errors from regular API calls are passed through
//! unchanged.

use std::io::ErrorKind;
use std::path::Path;

use bollard::errors::Error as BollardError;

use crate::error::EngineError;

/// Strip the `unix://` or `npipe://` scheme to get the filesystem path.
///
/// Bare paths are taken as-is; HTTP endpoints have no filesystem path.
pub(super) fn extract_socket_path(socket_uri: &str) -> Option<&Path> {
    if let Some(path) = socket_uri
        .strip_prefix("unix://")
        .or_else(|| socket_uri.strip_prefix("npipe://"))
    {
        return Some(Path::new(path));
    }

    if socket_uri.contains("://") {
        None
    } else {
        Some(Path::new(socket_uri))
    }
}

fn classify_io_kind(kind: ErrorKind, socket_path: Option<&Path>, message: String) -> EngineError {
    match (kind, socket_path) {
        (ErrorKind::PermissionDenied, Some(path)) => EngineError::PermissionDenied {
            path: path.to_path_buf(),
        },
        (ErrorKind::NotFound, Some(path)) => EngineError::SocketNotFound {
            path: path.to_path_buf(),
        },
        _ => EngineError::ConnectionFailed { message },
    }
}

/// Classify a `bollard` error raised while connecting to `socket_uri`.
pub(super) fn classify_connection_error(error: &BollardError, socket_uri: &str) -> EngineError {
    let socket_path = extract_socket_path(socket_uri);
    let message = error.to_string();

    if let BollardError::SocketNotFoundError(_) = error {
        if let Some(path) = socket_path {
            return EngineError::SocketNotFound {
                path: path.to_path_buf(),
            };
        }
    }

    if let BollardError::IOError { err } = error {
        let kind = io_error_kind_in_chain(err).unwrap_or_else(|| err.kind());
        return classify_io_kind(kind, socket_path, message);
    }

    match io_error_kind_in_chain(error) {
        Some(kind) => classify_io_kind(kind, socket_path, message),
        None => EngineError::ConnectionFailed { message },
    }
}

/// Walk the source chain looking for an `io::Error`.
fn io_error_kind_in_chain(error: &dyn std::error::Error) -> Option<ErrorKind> {
    let mut current = error.source();
    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
            return Some(io_err.kind());
        }
        current = err.source();
    }
    None
}
