//! Configuration data types for dockhand.

use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};

/// API version requested when the caller does not supply one.
pub const DEFAULT_API_VERSION: &str = "1.39";

/// Engine connection tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds to wait on any single engine request before giving up.
    pub connection_timeout_secs: u64,

    /// Seconds to wait for the liveness ping performed at connect time.
    pub health_check_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            connection_timeout_secs: 120,
            health_check_timeout_secs: 10,
        }
    }
}

/// Root application configuration.
///
/// Loaded with layered precedence (lowest to highest): defaults,
/// configuration file, environment variables, command-line arguments.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via `DOCKHAND_CONFIG_PATH` environment variable
/// 2. `.dockhand.toml` in the current working directory
/// 3. `.dockhand.toml` in the home directory
/// 4. `~/.config/dockhand/config.toml` (XDG default)
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "DOCKHAND",
    post_merge_hook,
    discovery(
        app_name = "dockhand",
        env_var = "DOCKHAND_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".dockhand.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct AppConfig {
    /// The container engine socket path or URL.
    pub engine_socket: Option<String>,

    /// Engine REST API version in `MAJOR.MINOR` form.
    pub api_version: Option<String>,

    /// Engine connection tuning.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Returns the API version to request, substituting the default when the
    /// configured value is absent or blank.
    #[must_use]
    pub fn effective_api_version(&self) -> &str {
        self.api_version
            .as_deref()
            .map(str::trim)
            .filter(|version| !version.is_empty())
            .unwrap_or(DEFAULT_API_VERSION)
    }
}

impl PostMergeHook for AppConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        // Blank strings from env or CLI mean "unset".
        self.engine_socket = self.engine_socket.take().filter(|s| !s.trim().is_empty());
        self.api_version = self.api_version.take().filter(|v| !v.trim().is_empty());
        Ok(())
    }
}
