//! Semantic error types for dockhand.
//!
//! Conditions a caller may inspect or map to a status code are modelled as
//! `thiserror` enums. Errors reported by the container engine itself are not
//! reclassified: they travel inside [`EngineError::Api`] with their original
//! message. Opaque reporting (`eyre::Report`) is reserved for the binary.

use std::path::PathBuf;
use std::sync::Arc;

use bollard::errors::Error as BollardError;
use thiserror::Error;

/// HTTP status the engine uses for unknown containers, images and networks.
const HTTP_NOT_FOUND: u16 = 404;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A required configuration value is missing.
    #[error("missing required configuration: {field}")]
    MissingRequired {
        /// The name of the missing field.
        field: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error while merging layers.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors raised while talking to the container engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Failed to connect to the container engine socket.
    #[error("failed to connect to container engine: {message}")]
    ConnectionFailed {
        /// A description of the connection failure.
        message: String,
    },

    /// The container engine socket was not found.
    #[error("container engine socket not found: {path}")]
    SocketNotFound {
        /// The path where the socket was expected.
        path: PathBuf,
    },

    /// Permission denied when accessing the container engine socket.
    #[error("permission denied accessing container socket: {path}")]
    PermissionDenied {
        /// The path to the socket.
        path: PathBuf,
    },

    /// The engine did not answer the liveness ping correctly.
    #[error("container engine health check failed: {message}")]
    HealthCheckFailed {
        /// A description of the health check failure.
        message: String,
    },

    /// The liveness ping did not complete in time.
    #[error("container engine health check timed out after {seconds} seconds")]
    HealthCheckTimeout {
        /// The timeout duration in seconds.
        seconds: u64,
    },

    /// Failed to create the Tokio runtime used by blocking helpers.
    #[error("failed to create async runtime: {message}")]
    RuntimeCreationFailed {
        /// A description of the runtime creation failure.
        message: String,
    },

    /// A filtered container lookup returned no matching entry.
    #[error("container not found: {id}")]
    ContainerNotFound {
        /// The identifier that did not match.
        id: String,
    },

    /// The engine rejected the request; its message is kept verbatim.
    #[error(transparent)]
    Api(Box<BollardError>),

    /// The engine started an exec session without attaching its output.
    #[error("exec session in container {container} was started detached")]
    ExecNotAttached {
        /// The container the session was created in.
        container: String,
    },

    /// Writing streamed engine output to the caller's sink failed.
    #[error("failed to relay {stream} output: {source}")]
    Relay {
        /// Which stream was being relayed (logs, pull, import, exec).
        stream: &'static str,
        /// The underlying write error.
        #[source]
        source: std::io::Error,
    },

    /// The call context was cancelled before the engine answered.
    #[error("engine call cancelled")]
    Cancelled,
}

impl From<BollardError> for EngineError {
    fn from(error: BollardError) -> Self {
        Self::Api(Box::new(error))
    }
}

impl EngineError {
    /// Returns whether this error means the addressed object does not exist.
    ///
    /// Covers both lookups that came back empty and engine responses carrying
    /// a 404 status.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::ContainerNotFound { .. } => true,
            Self::Api(error) => matches!(
                error.as_ref(),
                BollardError::DockerResponseServerError { status_code, .. }
                    if *status_code == HTTP_NOT_FOUND
            ),
            _ => false,
        }
    }
}

/// Errors that can occur during local filesystem operations.
#[derive(Debug, Error)]
pub enum FilesystemError {
    /// A file or directory was not found.
    #[error("path not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Permission denied when accessing a path.
    #[error("permission denied: {path}")]
    PermissionDenied {
        /// The path that could not be accessed.
        path: PathBuf,
    },

    /// An I/O error occurred.
    #[error("I/O error at '{path}': {message}")]
    IoError {
        /// The path where the error occurred.
        path: PathBuf,
        /// A description of the I/O error.
        message: String,
    },
}

impl FilesystemError {
    /// Classify an I/O error raised while accessing `path`.
    #[must_use]
    pub fn from_io(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path_buf = path.into();
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path: path_buf },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path: path_buf },
            _ => Self::IoError {
                path: path_buf,
                message: error.to_string(),
            },
        }
    }
}

/// Top-level error type for dockhand.
#[derive(Debug, Error)]
pub enum DockhandError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred while talking to the container engine.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// An error occurred during filesystem operations.
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

impl From<BollardError> for DockhandError {
    fn from(error: BollardError) -> Self {
        Self::Engine(EngineError::from(error))
    }
}

impl DockhandError {
    /// Returns whether this error means the addressed object does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Engine(engine) if engine.is_not_found())
    }
}

/// A specialised `Result` type for dockhand operations.
pub type Result<T> = std::result::Result<T, DockhandError>;
