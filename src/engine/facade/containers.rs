//! Container lifecycle, lookup and statistics operations.

use bollard::models::{
    ContainerCreateBody, ContainerInspectResponse, ContainerStatsResponse, ContainerSummary,
    HostConfig, NetworkingConfig,
};
use bollard::query_parameters::{
    CreateContainerOptions, CreateContainerOptionsBuilder, ListContainersOptions,
    ListContainersOptionsBuilder, RemoveContainerOptionsBuilder, RestartContainerOptionsBuilder,
    StartContainerOptions, StatsOptionsBuilder, StopContainerOptionsBuilder,
};
use futures_util::StreamExt;
use tracing::debug;

use super::{GuardedStream, RuntimeFacade, filter};
use crate::engine::client::ContainerClient;
use crate::error::{ConfigError, DockhandError, EngineError};

/// Grace period sent with stop and restart when the caller passes zero or a
/// negative timeout.
pub const DEFAULT_STOP_TIMEOUT_SECS: i32 = 10;

/// Everything needed to create a container.
///
/// The body carries image, command and environment; host and networking
/// configuration are attached separately and folded into the body at create
/// time.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSpec {
    body: ContainerCreateBody,
    name: Option<String>,
}

impl ContainerSpec {
    /// Start a spec for `image`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` when `image` is empty or
    /// whitespace-only.
    pub fn new(image: impl Into<String>) -> Result<Self, DockhandError> {
        Self::from_body(ContainerCreateBody {
            image: Some(image.into()),
            ..ContainerCreateBody::default()
        })
    }

    /// Wrap a caller-built body.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` when the body names no image.
    pub fn from_body(mut body: ContainerCreateBody) -> Result<Self, DockhandError> {
        let image = body
            .image
            .as_deref()
            .map(str::trim)
            .filter(|image| !image.is_empty())
            .map(String::from)
            .ok_or_else(|| ConfigError::MissingRequired {
                field: String::from("image"),
            })?;
        body.image = Some(image);

        Ok(Self { body, name: None })
    }

    /// Attach an optional container name; blank names are dropped.
    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name.filter(|value| !value.trim().is_empty());
        self
    }

    /// Attach the command vector.
    #[must_use]
    pub fn with_cmd(mut self, cmd: Option<Vec<String>>) -> Self {
        self.body.cmd = cmd.filter(|argv| !argv.is_empty());
        self
    }

    /// Attach environment entries in `KEY=value` form.
    #[must_use]
    pub fn with_env(mut self, env: Option<Vec<String>>) -> Self {
        self.body.env = env.filter(|entries| !entries.is_empty());
        self
    }

    /// Attach host configuration.
    #[must_use]
    pub fn with_host_config(mut self, host_config: HostConfig) -> Self {
        self.body.host_config = Some(host_config);
        self
    }

    /// Attach networking configuration.
    #[must_use]
    pub fn with_networking_config(mut self, networking_config: NetworkingConfig) -> Self {
        self.body.networking_config = Some(networking_config);
        self
    }

    /// Returns the image to create from.
    #[must_use]
    pub fn image(&self) -> &str {
        self.body.image.as_deref().unwrap_or_default()
    }

    /// Returns the optional container name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the create body as it will be sent.
    #[must_use]
    pub const fn body(&self) -> &ContainerCreateBody {
        &self.body
    }

    fn into_request(self) -> (Option<CreateContainerOptions>, ContainerCreateBody) {
        let options = self
            .name
            .as_deref()
            .map(|name| CreateContainerOptionsBuilder::new().name(name).build());
        (options, self.body)
    }
}

/// Replace a non-positive timeout with [`DEFAULT_STOP_TIMEOUT_SECS`].
const fn effective_timeout(timeout: i32) -> i32 {
    if timeout <= 0 {
        DEFAULT_STOP_TIMEOUT_SECS
    } else {
        timeout
    }
}

fn list_all_filtered(key: &str, value: &str) -> ListContainersOptions {
    ListContainersOptionsBuilder::new()
        .all(true)
        .filters(&filter(key, value))
        .build()
}

/// First listed name without the engine's leading `/`.
fn primary_name(summary: &ContainerSummary) -> Option<&str> {
    summary
        .names
        .as_ref()
        .and_then(|names| names.first())
        .map(|name| name.trim_start_matches('/'))
}

impl<C: ContainerClient> RuntimeFacade<C> {
    /// Create a container and return its ID.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Api` when the engine rejects the request.
    pub async fn create_container(&self, spec: ContainerSpec) -> Result<String, DockhandError> {
        debug!(image = spec.image(), name = ?spec.name(), "creating container");
        let (options, body) = spec.into_request();
        let response = self
            .call(self.client.create_container(options, body))
            .await?;
        Ok(response.id)
    }

    /// Start a created container.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Api` when the engine rejects the request.
    pub async fn start_container(
        &self,
        id: &str,
        options: Option<StartContainerOptions>,
    ) -> Result<(), DockhandError> {
        debug!(container = id, "starting container");
        self.call(self.client.start_container(id, options)).await
    }

    /// Stop a container, giving it `timeout` seconds before it is killed.
    ///
    /// A timeout of zero or less is sent as [`DEFAULT_STOP_TIMEOUT_SECS`].
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Api` when the engine rejects the request.
    pub async fn stop_container(&self, id: &str, timeout: i32) -> Result<(), DockhandError> {
        let grace = effective_timeout(timeout);
        debug!(container = id, timeout = grace, "stopping container");
        let options = StopContainerOptionsBuilder::new().t(grace).build();
        self.call(self.client.stop_container(id, Some(options))).await
    }

    /// Restart a container, with the same timeout substitution as
    /// [`Self::stop_container`].
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Api` when the engine rejects the request.
    pub async fn restart_container(&self, id: &str, timeout: i32) -> Result<(), DockhandError> {
        let grace = effective_timeout(timeout);
        debug!(container = id, timeout = grace, "restarting container");
        let options = RestartContainerOptionsBuilder::new().t(grace).build();
        self.call(self.client.restart_container(id, Some(options)))
            .await
    }

    /// Remove a container, optionally with its anonymous volumes.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Api` when the engine rejects the request.
    pub async fn remove_container(
        &self,
        id: &str,
        remove_volumes: bool,
    ) -> Result<(), DockhandError> {
        debug!(container = id, remove_volumes, "removing container");
        let options = RemoveContainerOptionsBuilder::new().v(remove_volumes).build();
        self.call(self.client.remove_container(id, Some(options)))
            .await
    }

    /// Fetch the full container descriptor.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Api`; an unknown container satisfies
    /// [`DockhandError::is_not_found`].
    pub async fn inspect_container(
        &self,
        id: &str,
    ) -> Result<ContainerInspectResponse, DockhandError> {
        self.call(self.client.inspect_container(id)).await
    }

    /// Return the listing entry of the container with ID `id`, stopped
    /// containers included.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::ContainerNotFound` when the listing is empty.
    pub async fn container_status(&self, id: &str) -> Result<ContainerSummary, DockhandError> {
        let options = list_all_filtered("id", id);
        let containers = self
            .call(self.client.list_containers(Some(options)))
            .await?;

        containers.into_iter().next().ok_or_else(|| {
            DockhandError::from(EngineError::ContainerNotFound {
                id: String::from(id),
            })
        })
    }

    /// Look up a container ID by exact name.
    ///
    /// The engine's name filter matches substrings, so each candidate's first
    /// name (without its leading `/`) is compared for equality. Returns
    /// `None` when nothing matches exactly.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Api` when the listing fails.
    pub async fn find_container(&self, name: &str) -> Result<Option<String>, DockhandError> {
        let options = list_all_filtered("name", name);
        let containers = self
            .call(self.client.list_containers(Some(options)))
            .await?;

        let found = containers
            .into_iter()
            .find(|summary| primary_name(summary) == Some(name))
            .and_then(|summary| summary.id);
        debug!(name, found = ?found, "container lookup by name");
        Ok(found)
    }

    /// Stream resource-usage samples.
    ///
    /// With `stream == false` the engine sends a single sample and the
    /// stream ends.
    #[must_use]
    pub fn container_stats<'a>(
        &'a self,
        id: &str,
        stream: bool,
    ) -> GuardedStream<'a, ContainerStatsResponse> {
        let options = StatsOptionsBuilder::new().stream(stream).build();
        self.guard(self.client.stats(id, Some(options)))
    }

    /// Fetch a single resource-usage sample.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Api` from the engine, or
    /// `EngineError::ContainerNotFound` when the engine closes the stream
    /// without a sample.
    pub async fn stats_snapshot(&self, id: &str) -> Result<ContainerStatsResponse, DockhandError> {
        let mut samples = self.container_stats(id, false);
        samples.next().await.map_or_else(
            || {
                Err(DockhandError::from(EngineError::ContainerNotFound {
                    id: String::from(id),
                }))
            },
            |sample| sample.map_err(DockhandError::from),
        )
    }
}
