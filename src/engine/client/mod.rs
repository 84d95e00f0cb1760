//! Engine client seam.
//!
//! The facade talks to the engine only through these traits so its pre- and
//! post-processing can be unit-tested without a live daemon. Each method
//! mirrors one `bollard::Docker` call; [`bollard::Docker`] implements all of
//! them in [`docker`].

mod docker;

use std::future::Future;
use std::pin::Pin;

use bollard::container::LogOutput;
use bollard::errors::Error as BollardError;
use bollard::exec::{CreateExecOptions, CreateExecResults, StartExecOptions, StartExecResults};
use bollard::models::{
    ContainerCreateBody, ContainerCreateResponse, ContainerInspectResponse,
    ContainerStatsResponse, ContainerSummary, CreateImageInfo, ImageDeleteResponseItem,
    ImageInspect, ImageSummary, Network, NetworkConnectRequest, NetworkCreateRequest,
    NetworkCreateResponse,
};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, ListContainersOptions, ListImagesOptions,
    ListNetworksOptions, LogsOptions, RemoveContainerOptions, RemoveImageOptions,
    RestartContainerOptions, StartContainerOptions, StatsOptions, StopContainerOptions,
};
use bytes::Bytes;
use futures_util::Stream;

/// Boxed future returned by every unary engine call.
pub type EngineFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BollardError>> + Send + 'a>>;

/// Boxed stream returned by every streaming engine call.
pub type EngineStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T, BollardError>> + Send + 'a>>;

/// Container lifecycle, inspection and exec calls.
pub trait ContainerClient {
    /// Create a container from a body payload.
    fn create_container(
        &self,
        options: Option<CreateContainerOptions>,
        config: ContainerCreateBody,
    ) -> EngineFuture<'_, ContainerCreateResponse>;

    /// Start a created container.
    fn start_container(
        &self,
        id: &str,
        options: Option<StartContainerOptions>,
    ) -> EngineFuture<'_, ()>;

    /// Stop a running container.
    fn stop_container(
        &self,
        id: &str,
        options: Option<StopContainerOptions>,
    ) -> EngineFuture<'_, ()>;

    /// Restart a container.
    fn restart_container(
        &self,
        id: &str,
        options: Option<RestartContainerOptions>,
    ) -> EngineFuture<'_, ()>;

    /// Remove a container.
    fn remove_container(
        &self,
        id: &str,
        options: Option<RemoveContainerOptions>,
    ) -> EngineFuture<'_, ()>;

    /// Fetch the full container descriptor.
    fn inspect_container(&self, id: &str) -> EngineFuture<'_, ContainerInspectResponse>;

    /// List containers matching the options' filters.
    fn list_containers(
        &self,
        options: Option<ListContainersOptions>,
    ) -> EngineFuture<'_, Vec<ContainerSummary>>;

    /// Stream resource-usage samples.
    fn stats(
        &self,
        id: &str,
        options: Option<StatsOptions>,
    ) -> EngineStream<'_, ContainerStatsResponse>;

    /// Stream multiplexed log frames.
    fn logs(&self, id: &str, options: Option<LogsOptions>) -> EngineStream<'_, LogOutput>;

    /// Create an exec session in a running container.
    fn create_exec(
        &self,
        id: &str,
        options: CreateExecOptions<String>,
    ) -> EngineFuture<'_, CreateExecResults>;

    /// Start a previously created exec session.
    fn start_exec(
        &self,
        exec_id: &str,
        options: Option<StartExecOptions>,
    ) -> EngineFuture<'_, StartExecResults>;
}

/// Image transfer and inspection calls.
pub trait ImageClient {
    /// Pull an image, or import one when `root_fs` carries an archive.
    fn create_image(
        &self,
        options: Option<CreateImageOptions>,
        root_fs: Option<Bytes>,
    ) -> EngineStream<'_, CreateImageInfo>;

    /// Stream a tar archive of the image.
    fn export_image(&self, image: &str) -> EngineStream<'_, Bytes>;

    /// List images matching the options' filters.
    fn list_images(&self, options: Option<ListImagesOptions>) -> EngineFuture<'_, Vec<ImageSummary>>;

    /// Fetch the full image descriptor.
    fn inspect_image(&self, image: &str) -> EngineFuture<'_, ImageInspect>;

    /// Remove an image.
    fn remove_image(
        &self,
        image: &str,
        options: Option<RemoveImageOptions>,
    ) -> EngineFuture<'_, Vec<ImageDeleteResponseItem>>;
}

/// Network management calls.
pub trait NetworkClient {
    /// Create a network.
    fn create_network(&self, config: NetworkCreateRequest) -> EngineFuture<'_, NetworkCreateResponse>;

    /// Attach a container to a network.
    fn connect_network(&self, network: &str, config: NetworkConnectRequest) -> EngineFuture<'_, ()>;

    /// Remove a network.
    fn remove_network(&self, network: &str) -> EngineFuture<'_, ()>;

    /// List networks matching the options' filters.
    fn list_networks(&self, options: Option<ListNetworksOptions>) -> EngineFuture<'_, Vec<Network>>;
}
