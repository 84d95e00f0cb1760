//! Liveness ping and connect-and-verify entry points.

use std::time::Duration;

use bollard::Docker;
use tracing::info;

use super::error_classification::classify_connection_error;
use super::{ConnectionSettings, EngineConnector, SocketResolver, format_version};
use crate::config::AppConfig;
use crate::engine::RuntimeFacade;
use crate::error::{DockhandError, EngineError};

impl EngineConnector {
    /// Ping the engine, bounded by the settings' health-check timeout.
    ///
    /// Transport failures (missing socket, permission denied) are classified
    /// against `socket`; any other failure is reported as
    /// `EngineError::HealthCheckFailed`.
    async fn ping_with_timeout(
        docker: &Docker,
        socket: &str,
        settings: &ConnectionSettings,
    ) -> Result<(), DockhandError> {
        let seconds = settings.health_check_timeout_secs();

        let reply = tokio::time::timeout(Duration::from_secs(seconds), docker.ping())
            .await
            .map_err(|_| DockhandError::from(EngineError::HealthCheckTimeout { seconds }))?
            .map_err(|error| {
                let classified = classify_connection_error(&error, socket);
                let engine_error = match classified {
                    EngineError::ConnectionFailed { message } => {
                        EngineError::HealthCheckFailed { message }
                    }
                    other => other,
                };
                DockhandError::from(engine_error)
            })?;

        info!(
            socket,
            api_version = %format_version(settings.api_version()),
            reply = %reply,
            "container engine is responsive"
        );
        Ok(())
    }

    /// Open a session at `socket` and verify it answers a ping.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::connect`], plus
    /// `EngineError::HealthCheckFailed`, `HealthCheckTimeout`,
    /// `SocketNotFound` or `PermissionDenied` when the ping fails.
    pub async fn connect_and_verify_async(
        socket: &str,
        settings: &ConnectionSettings,
    ) -> Result<Docker, DockhandError> {
        let docker = Self::connect(socket, settings)?;
        Self::ping_with_timeout(&docker, socket, settings).await?;
        Ok(docker)
    }

    /// Blocking variant of [`Self::connect_and_verify_async`] that owns a
    /// dedicated Tokio runtime.
    ///
    /// # Errors
    ///
    /// Additionally returns `EngineError::RuntimeCreationFailed` when the
    /// runtime cannot be built.
    pub fn connect_and_verify(
        socket: &str,
        settings: &ConnectionSettings,
    ) -> Result<Docker, DockhandError> {
        let rt = Self::create_runtime()?;
        rt.block_on(Self::connect_and_verify_async(socket, settings))
    }

    /// Build a verified [`RuntimeFacade`] from application configuration.
    ///
    /// The socket is resolved from `config.engine_socket`, then the
    /// environment fallbacks, then the platform default. The API version is
    /// `config.api_version`, or `1.39` when unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a malformed API version and any
    /// connection or liveness error.
    pub async fn connect_facade_async<E: mockable::Env>(
        config: &AppConfig,
        resolver: &SocketResolver<'_, E>,
    ) -> Result<RuntimeFacade<Docker>, DockhandError> {
        let settings = ConnectionSettings::from_config(config)?;
        let socket = Self::resolve_socket(config.engine_socket.as_deref(), resolver);
        let docker = Self::connect_and_verify_async(&socket, &settings).await?;
        Ok(RuntimeFacade::new(docker))
    }

    /// Blocking variant of [`Self::connect_facade_async`].
    ///
    /// # Errors
    ///
    /// Additionally returns `EngineError::RuntimeCreationFailed` when the
    /// runtime cannot be built.
    pub fn connect_facade<E: mockable::Env>(
        config: &AppConfig,
        resolver: &SocketResolver<'_, E>,
    ) -> Result<RuntimeFacade<Docker>, DockhandError> {
        let rt = Self::create_runtime()?;
        rt.block_on(Self::connect_facade_async(config, resolver))
    }
}
