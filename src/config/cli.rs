//! Command-line argument definitions for dockhand.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Command-line interface for dockhand.
#[derive(Debug, Parser)]
#[command(name = "dockhand")]
#[command(
    author,
    version,
    about = "Container, image and network control over a local container engine"
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Container engine socket path or URL.
    #[arg(long, global = true)]
    pub engine_socket: Option<String>,

    /// Engine API version in MAJOR.MINOR form.
    #[arg(long, global = true)]
    pub api_version: Option<String>,
}

/// Available command groups.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Container lifecycle operations.
    Container(ContainerArgs),

    /// Image operations.
    Image(ImageArgs),

    /// Network operations.
    Network(NetworkArgs),
}

/// Arguments for the `container` group.
#[derive(Debug, Args)]
pub struct ContainerArgs {
    /// Container operation to run.
    #[command(subcommand)]
    pub command: ContainerCommand,
}

/// Container operations.
#[derive(Debug, Subcommand)]
pub enum ContainerCommand {
    /// Create a container and print its ID.
    Create(CreateArgs),

    /// Start a container.
    Start {
        /// Container ID or name.
        container: String,
    },

    /// Stop a container.
    Stop(TimeoutArgs),

    /// Restart a container.
    Restart(TimeoutArgs),

    /// Remove a container.
    Rm(RemoveArgs),

    /// Print the full container descriptor.
    Inspect {
        /// Container ID or name.
        container: String,
    },

    /// Print the list entry for a container ID.
    Status {
        /// Container ID.
        container: String,
    },

    /// Print the ID of the container with exactly this name.
    Find {
        /// Container name, with or without the leading `/`.
        name: String,
    },

    /// Print resource usage.
    Stats(StatsArgs),

    /// Run a command inside a running container.
    Exec(ExecArgs),

    /// Write container logs to stdout.
    Logs(LogsArgs),
}

/// Arguments for `container create`.
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Image to create the container from.
    #[arg(long, required = true)]
    pub image: String,

    /// Optional container name.
    #[arg(long)]
    pub name: Option<String>,

    /// Network to attach at create time.
    #[arg(long)]
    pub network: Option<String>,

    /// Environment entries in KEY=value form.
    #[arg(long = "env", short = 'e')]
    pub env: Vec<String>,

    /// Command to run in the container.
    #[arg(trailing_var_arg = true)]
    pub command: Vec<String>,
}

/// Arguments for `container stop` and `container restart`.
#[derive(Debug, Args)]
pub struct TimeoutArgs {
    /// Container ID or name.
    #[arg(required = true)]
    pub container: String,

    /// Seconds to wait before killing; zero or negative selects the default.
    #[arg(long, short = 't', default_value_t = 0, allow_negative_numbers = true)]
    pub timeout: i32,
}

/// Arguments for `container rm`.
#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Container ID or name.
    #[arg(required = true)]
    pub container: String,

    /// Remove anonymous volumes attached to the container.
    #[arg(long, short = 'v')]
    pub volumes: bool,
}

/// Arguments for `container stats`.
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Container ID or name.
    #[arg(required = true)]
    pub container: String,

    /// Keep streaming samples until interrupted.
    #[arg(long)]
    pub stream: bool,
}

/// Arguments for `container exec`.
#[derive(Debug, Args)]
pub struct ExecArgs {
    /// Container ID or name.
    #[arg(required = true)]
    pub container: String,

    /// Command to execute.
    #[arg(required = true, trailing_var_arg = true)]
    pub command: Vec<String>,
}

/// Arguments for `container logs`.
#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Container ID or name.
    #[arg(required = true)]
    pub container: String,

    /// Follow the log stream until the container stops.
    #[arg(long, short = 'f')]
    pub follow: bool,

    /// Only show entries after this UNIX timestamp.
    #[arg(long)]
    pub since: Option<i32>,

    /// Only show entries before this UNIX timestamp.
    #[arg(long)]
    pub until: Option<i32>,

    /// Number of lines from the end of the log, or `all`.
    #[arg(long)]
    pub tail: Option<String>,
}

/// Arguments for the `image` group.
#[derive(Debug, Args)]
pub struct ImageArgs {
    /// Image operation to run.
    #[command(subcommand)]
    pub command: ImageCommand,
}

/// Image operations.
#[derive(Debug, Subcommand)]
pub enum ImageCommand {
    /// Pull an image, streaming progress to stdout.
    Pull {
        /// Image reference.
        reference: String,
    },

    /// Save an image as a tar archive.
    Export(ExportArgs),

    /// Import a tar archive as an image.
    Import(ImportArgs),

    /// Report whether an image is present locally.
    Exists {
        /// Tag reference or `name@digest`.
        reference: String,
    },

    /// Remove an image.
    Rm(RemoveImageArgs),

    /// Print the full image descriptor.
    Inspect {
        /// Image ID or reference.
        image: String,
    },

    /// Report whether any container uses an image.
    InUse {
        /// Full image ID.
        image_id: String,
    },
}

/// Arguments for `image export`.
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Image ID or reference.
    #[arg(required = true)]
    pub image: String,

    /// Destination archive path.
    #[arg(long, short = 'o', required = true)]
    pub output: Utf8PathBuf,
}

/// Arguments for `image import`.
#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Source archive path.
    #[arg(required = true)]
    pub archive: Utf8PathBuf,

    /// Repository name for the imported image.
    #[arg(long, required = true)]
    pub repo: String,

    /// Tag for the imported image.
    #[arg(long, default_value = "latest")]
    pub tag: String,
}

/// Arguments for `image rm`.
#[derive(Debug, Args)]
pub struct RemoveImageArgs {
    /// Image ID or reference.
    #[arg(required = true)]
    pub image: String,

    /// Remove even when tagged in multiple repositories or in use.
    #[arg(long)]
    pub force: bool,

    /// Keep untagged parent layers.
    #[arg(long)]
    pub no_prune: bool,
}

/// Arguments for the `network` group.
#[derive(Debug, Args)]
pub struct NetworkArgs {
    /// Network operation to run.
    #[command(subcommand)]
    pub command: NetworkCommand,
}

/// Network operations.
#[derive(Debug, Subcommand)]
pub enum NetworkCommand {
    /// Create a network and print its ID.
    Create {
        /// Network name.
        name: String,
    },

    /// Attach a container to a network.
    Connect {
        /// Network ID or name.
        network: String,
        /// Container ID or name.
        container: String,
    },

    /// Remove a network.
    Rm {
        /// Network ID or name.
        network: String,
    },

    /// Print the ID of the network with exactly this name.
    Exists {
        /// Network name.
        name: String,
    },
}
