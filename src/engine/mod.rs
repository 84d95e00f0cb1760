//! Container engine connection, client seam and runtime facade.
//!
//! The engine socket is resolved through a priority-based fallback chain:
//!
//! 1. CLI argument (`--engine-socket`)
//! 2. `DOCKHAND_ENGINE_SOCKET` environment variable
//! 3. Config file (`engine_socket` in TOML)
//! 4. `DOCKER_HOST` environment variable
//! 5. `CONTAINER_HOST` environment variable
//! 6. `PODMAN_HOST` environment variable
//! 7. Platform default (`/var/run/docker.sock` on Unix)
//!
//! The session requests API version `1.39` unless configured otherwise.

mod client;
mod connection;
mod facade;

pub use client::{ContainerClient, EngineFuture, EngineStream, ImageClient, NetworkClient};
pub use connection::{ConnectionSettings, EngineConnector, SocketResolver, parse_api_version};
pub use facade::{
    BufferSink, ByteStream, ContainerSpec, DEFAULT_STOP_TIMEOUT_SECS, GuardedStream, ImageArchive,
    ImagePresence, LOG_CONTENT_TYPE, LogSink, LogsRequest, RuntimeFacade,
};
