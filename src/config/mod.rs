//! Configuration system for dockhand.
//!
//! Configuration loading and precedence merging is handled by the
//! `ortho_config` crate. CLI flags override environment variables, which
//! override configuration files, which override defaults.
//!
//! # Example Configuration
//!
//! ```toml
//! engine_socket = "unix:///var/run/docker.sock"
//! api_version = "1.41"
//!
//! [engine]
//! connection_timeout_secs = 120
//! health_check_timeout_secs = 10
//! ```

mod cli;
mod loader;
mod types;


pub use cli::{
    Cli, Commands, ContainerArgs, ContainerCommand, CreateArgs, ExecArgs, ExportArgs,
    ImageArgs, ImageCommand, ImportArgs, LogsArgs, NetworkArgs, NetworkCommand, RemoveArgs,
    RemoveImageArgs, StatsArgs, TimeoutArgs,
};
pub use loader::{env_var_names, load_config};
pub use types::{AppConfig, DEFAULT_API_VERSION, EngineConfig};
