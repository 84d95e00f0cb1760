//! `dockhand` application entry point.
//!
//! This binary drives container, image and network operations against a local
//! container engine. It uses `eyre` for opaque error handling at the
//! application boundary, converting domain-specific errors into
//! human-readable reports.
//!
//! Configuration is loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Configuration file (`~/.config/dockhand/config.toml` or path from `DOCKHAND_CONFIG_PATH`)
//! 3. Environment variables (`DOCKHAND_*`)
//! 4. Command-line arguments
//!
//! Descriptors are printed to stdout as JSON. Diagnostics go to stderr,
//! filtered by `RUST_LOG` (default `dockhand=info`).

use std::collections::HashMap;

use bollard::models::{EndpointSettings, NetworkingConfig};
use bollard::query_parameters::RemoveImageOptionsBuilder;
use clap::Parser;
use dockhand::config::{
    AppConfig, Cli, Commands, ContainerCommand, CreateArgs, ImageCommand, LogsArgs,
    NetworkCommand, load_config,
};
use dockhand::engine::{ContainerSpec, EngineConnector, LogsRequest, RuntimeFacade, SocketResolver};
use dockhand::error::{EngineError, FilesystemError};
use eyre::{Report, Result as EyreResult, WrapErr};
use futures_util::StreamExt;
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

type Facade = RuntimeFacade<bollard::Docker>;

/// Application entry point.
///
/// Loads configuration, installs the log subscriber, connects to the engine
/// and dispatches to the subcommand handler.
fn main() -> EyreResult<()> {
    let cli = Cli::parse();
    let config = load_config(&cli).map_err(Report::from)?;
    init_logging()?;

    let runtime = tokio::runtime::Runtime::new().wrap_err("failed to start async runtime")?;
    runtime.block_on(run(&cli, &config))
}

/// Install the stderr log subscriber.
fn init_logging() -> EyreResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dockhand=info"));
    let layer = fmt::layer().with_target(true).with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .wrap_err("failed to install log subscriber")
}

/// Connect to the engine and execute the CLI command.
async fn run(cli: &Cli, config: &AppConfig) -> EyreResult<()> {
    let env = mockable::DefaultEnv::new();
    let resolver = SocketResolver::new(&env);
    let facade = EngineConnector::connect_facade_async(config, &resolver).await?;

    match &cli.command {
        Commands::Container(args) => run_container(&facade, &args.command).await,
        Commands::Image(args) => run_image(&facade, &args.command).await,
        Commands::Network(args) => run_network(&facade, &args.command).await,
    }
}

async fn run_container(facade: &Facade, command: &ContainerCommand) -> EyreResult<()> {
    match command {
        ContainerCommand::Create(args) => {
            let id = facade.create_container(container_spec(args)?).await?;
            print_json(&id)
        }
        ContainerCommand::Start { container } => {
            facade.start_container(container, None).await?;
            Ok(())
        }
        ContainerCommand::Stop(args) => {
            facade.stop_container(&args.container, args.timeout).await?;
            Ok(())
        }
        ContainerCommand::Restart(args) => {
            facade
                .restart_container(&args.container, args.timeout)
                .await?;
            Ok(())
        }
        ContainerCommand::Rm(args) => {
            facade
                .remove_container(&args.container, args.volumes)
                .await?;
            Ok(())
        }
        ContainerCommand::Inspect { container } => {
            print_json(&facade.inspect_container(container).await?)
        }
        ContainerCommand::Status { container } => {
            print_json(&facade.container_status(container).await?)
        }
        ContainerCommand::Find { name } => print_json(&facade.find_container(name).await?),
        ContainerCommand::Stats(args) => {
            let mut samples = facade.container_stats(&args.container, args.stream);
            while let Some(sample) = samples.next().await {
                print_json(&sample?)?;
            }
            Ok(())
        }
        ContainerCommand::Exec(args) => {
            let mut stdout = tokio::io::stdout();
            facade
                .exec_to_writer(&args.container, args.command.clone(), &mut stdout)
                .await?;
            Ok(())
        }
        ContainerCommand::Logs(args) => {
            let mut stdout = tokio::io::stdout();
            facade
                .container_logs(&mut stdout, &args.container, &logs_request(args))
                .await?;
            Ok(())
        }
    }
}

async fn run_image(facade: &Facade, command: &ImageCommand) -> EyreResult<()> {
    match command {
        ImageCommand::Pull { reference } => {
            facade
                .pull_image(reference, &mut tokio::io::stdout())
                .await?;
            Ok(())
        }
        ImageCommand::Export(args) => {
            let mut file = tokio::fs::File::create(args.output.as_std_path())
                .await
                .map_err(|error| FilesystemError::from_io(args.output.as_std_path(), &error))?;
            let written = facade.export_image(&args.image).write_to(&mut file).await?;
            tracing::info!(image = %args.image, output = %args.output, bytes = written, "image exported");
            Ok(())
        }
        ImageCommand::Import(args) => {
            facade
                .import_image(&args.archive, &args.repo, &args.tag, &mut tokio::io::stdout())
                .await?;
            Ok(())
        }
        ImageCommand::Exists { reference } => {
            let presence = facade.ensure_image_exists(reference).await?;
            print_json(&presence.is_found())
        }
        ImageCommand::Rm(args) => {
            let options = RemoveImageOptionsBuilder::new()
                .force(args.force)
                .noprune(args.no_prune)
                .build();
            print_json(&facade.remove_image(&args.image, Some(options)).await?)
        }
        ImageCommand::Inspect { image } => print_json(&facade.image_info(image).await?),
        ImageCommand::InUse { image_id } => print_json(&facade.is_image_used(image_id).await?),
    }
}

async fn run_network(facade: &Facade, command: &NetworkCommand) -> EyreResult<()> {
    match command {
        NetworkCommand::Create { name } => print_json(&facade.create_network(name).await?),
        NetworkCommand::Connect { network, container } => {
            facade.connect_network(network, container).await?;
            Ok(())
        }
        NetworkCommand::Rm { network } => {
            facade.remove_network(network).await?;
            Ok(())
        }
        NetworkCommand::Exists { name } => print_json(&facade.ensure_network_exists(name).await?),
    }
}

fn container_spec(args: &CreateArgs) -> EyreResult<ContainerSpec> {
    let mut spec = ContainerSpec::new(args.image.as_str())?
        .with_name(args.name.clone())
        .with_env(Some(args.env.clone()))
        .with_cmd(Some(args.command.clone()));

    if let Some(network) = &args.network {
        spec = spec.with_networking_config(NetworkingConfig {
            endpoints_config: Some(HashMap::from([(
                network.clone(),
                EndpointSettings::default(),
            )])),
            ..NetworkingConfig::default()
        });
    }
    Ok(spec)
}

fn logs_request(args: &LogsArgs) -> LogsRequest {
    let defaults = LogsRequest::default();
    LogsRequest {
        follow: args.follow,
        since: args.since.unwrap_or(defaults.since),
        until: args.until.unwrap_or(defaults.until),
        tail: args.tail.clone().unwrap_or(defaults.tail),
    }
}

/// Print a descriptor to stdout as pretty JSON.
#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_json<T: Serialize + ?Sized>(value: &T) -> EyreResult<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(|error| {
        Report::from(EngineError::Relay {
            stream: "stdout",
            source: std::io::Error::other(error),
        })
    })?;
    println!("{rendered}");
    Ok(())
}
