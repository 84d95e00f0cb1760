//! Socket resolution, API version selection and engine connection.
//!
//! The connector opens a `bollard::Docker` session against the resolved
//! socket with an explicit client API version. Opening a session is lazy in
//! `bollard`, so every public connect path finishes with a liveness ping
//! (see [`health_check`]).

mod error_classification;
mod health_check;

use bollard::{ClientVersion, Docker};
use tracing::debug;

use self::error_classification::classify_connection_error;
use crate::config::{AppConfig, DEFAULT_API_VERSION};
use crate::error::{ConfigError, DockhandError, EngineError};

/// Environment variable names checked in fallback order after configuration.
const FALLBACK_ENV_VARS: &[&str] = &["DOCKER_HOST", "CONTAINER_HOST", "PODMAN_HOST"];

/// Default socket for Unix platforms.
#[cfg(unix)]
const DEFAULT_SOCKET: &str = "unix:///var/run/docker.sock";

/// Default socket for Windows platforms.
#[cfg(windows)]
const DEFAULT_SOCKET: &str = "npipe:////./pipe/docker_engine";

/// Resolves the engine socket from environment variables.
///
/// `E` is any `mockable::Env`, so tests can substitute `MockEnv`.
pub struct SocketResolver<'a, E: mockable::Env> {
    env: &'a E,
}

impl<'a, E: mockable::Env> SocketResolver<'a, E> {
    /// Creates a resolver over the given environment provider.
    #[must_use]
    pub const fn new(env: &'a E) -> Self {
        Self { env }
    }

    /// Returns the first non-empty of `DOCKER_HOST`, `CONTAINER_HOST` and
    /// `PODMAN_HOST`.
    #[must_use]
    pub fn resolve_from_env(&self) -> Option<String> {
        FALLBACK_ENV_VARS
            .iter()
            .filter_map(|var_name| self.env.string(var_name))
            .find(|value| !value.is_empty())
    }

    /// Returns the platform default socket.
    #[must_use]
    pub const fn default_socket() -> &'static str {
        DEFAULT_SOCKET
    }
}

/// How a socket string should be handed to `bollard`.
enum SocketType {
    /// `unix://` or `npipe://` URI.
    Socket,
    /// `tcp://`, `http://` or `https://` endpoint.
    Http,
    /// Path without a scheme.
    BarePath,
}

impl SocketType {
    fn classify(socket: &str) -> Self {
        if socket.starts_with("unix://") || socket.starts_with("npipe://") {
            Self::Socket
        } else if ["tcp://", "http://", "https://"]
            .iter()
            .any(|scheme| socket.starts_with(scheme))
        {
            Self::Http
        } else {
            Self::BarePath
        }
    }
}

/// Parameters for opening an engine session.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    api_version: ClientVersion,
    timeout_secs: u64,
    health_check_timeout_secs: u64,
}

impl ConnectionSettings {
    /// Build settings from the API version string and timeouts.
    ///
    /// A missing or blank version selects the default (`1.39`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when the version is not of the form
    /// `MAJOR.MINOR`.
    pub fn new(
        api_version: Option<&str>,
        timeout_secs: u64,
        health_check_timeout_secs: u64,
    ) -> Result<Self, DockhandError> {
        Ok(Self {
            api_version: parse_api_version(api_version)?,
            timeout_secs,
            health_check_timeout_secs,
        })
    }

    /// Build settings from the merged application configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a malformed `api_version`.
    pub fn from_config(config: &AppConfig) -> Result<Self, DockhandError> {
        Self::new(
            Some(config.effective_api_version()),
            config.engine.connection_timeout_secs,
            config.engine.health_check_timeout_secs,
        )
    }

    /// Returns the client API version requested from the engine.
    #[must_use]
    pub const fn api_version(&self) -> &ClientVersion {
        &self.api_version
    }

    /// Returns the per-request timeout in seconds.
    #[must_use]
    pub const fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Returns the liveness ping timeout in seconds.
    #[must_use]
    pub const fn health_check_timeout_secs(&self) -> u64 {
        self.health_check_timeout_secs
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        let defaults = crate::config::EngineConfig::default();
        Self {
            api_version: ClientVersion {
                major_version: 1,
                minor_version: 39,
            },
            timeout_secs: defaults.connection_timeout_secs,
            health_check_timeout_secs: defaults.health_check_timeout_secs,
        }
    }
}

/// Parse `MAJOR.MINOR`, substituting the default for absent or blank input.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` when either component is missing or
/// not a non-negative integer.
pub fn parse_api_version(version: Option<&str>) -> Result<ClientVersion, DockhandError> {
    let requested = version
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_API_VERSION);
    let raw = requested.strip_prefix('v').unwrap_or(requested);

    let invalid = || {
        DockhandError::from(ConfigError::InvalidValue {
            field: String::from("api_version"),
            reason: format!("expected MAJOR.MINOR, got '{raw}'"),
        })
    };

    let (major, minor) = raw.split_once('.').ok_or_else(invalid)?;
    let major_version = major.parse::<usize>().map_err(|_| invalid())?;
    let minor_version = minor.parse::<usize>().map_err(|_| invalid())?;

    Ok(ClientVersion {
        major_version,
        minor_version,
    })
}

/// Opens sessions against a Docker-compatible engine.
pub struct EngineConnector;

impl EngineConnector {
    /// Open a session at `socket` without contacting the engine.
    ///
    /// Accepted forms: `unix://` and `npipe://` URIs, `tcp://` (rewritten to
    /// `http://`), `http://`, `https://`, and bare paths. Bare paths beginning
    /// with `//` or `\\` are treated as named pipes, anything else as a Unix
    /// socket.
    ///
    /// # Errors
    ///
    /// Returns an `EngineError` connection variant when `bollard` rejects the
    /// endpoint.
    pub fn connect(socket: &str, settings: &ConnectionSettings) -> Result<Docker, DockhandError> {
        let version = settings.api_version();
        let timeout = settings.timeout_secs();
        debug!(
            socket,
            api_version = %format_version(version),
            "opening container engine session"
        );

        let docker = match SocketType::classify(socket) {
            SocketType::Socket => Docker::connect_with_socket(socket, timeout, version),
            SocketType::Http => {
                let endpoint = socket
                    .strip_prefix("tcp://")
                    .map_or_else(|| socket.to_owned(), |rest| format!("http://{rest}"));
                Docker::connect_with_http(&endpoint, timeout, version)
            }
            SocketType::BarePath => {
                Docker::connect_with_socket(&normalize_bare_path(socket), timeout, version)
            }
        }
        .map_err(|error| DockhandError::from(classify_connection_error(&error, socket)))?;

        Ok(docker)
    }

    /// Resolve the socket: configuration first, then environment fallbacks,
    /// then the platform default.
    #[must_use]
    pub fn resolve_socket<E: mockable::Env>(
        config_socket: Option<&str>,
        resolver: &SocketResolver<'_, E>,
    ) -> String {
        config_socket
            .filter(|s| !s.is_empty())
            .map(String::from)
            .or_else(|| resolver.resolve_from_env())
            .unwrap_or_else(|| SocketResolver::<E>::default_socket().to_owned())
    }

    fn create_runtime() -> Result<tokio::runtime::Runtime, DockhandError> {
        tokio::runtime::Runtime::new().map_err(|e| {
            DockhandError::from(EngineError::RuntimeCreationFailed {
                message: e.to_string(),
            })
        })
    }
}

fn normalize_bare_path(path: &str) -> String {
    if path.starts_with("\\\\") || path.starts_with("//") {
        format!("npipe://{path}")
    } else {
        format!("unix://{path}")
    }
}

pub(crate) fn format_version(version: &ClientVersion) -> String {
    format!("{}.{}", version.major_version, version.minor_version)
}
