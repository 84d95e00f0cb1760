//! Engine client traits implemented over a live `bollard` session.
//!
//! Identifiers are copied into the returned futures so callers may pass
//! borrowed strings with shorter lifetimes than the session.

use bollard::container::LogOutput;
use bollard::exec::{CreateExecOptions, CreateExecResults, StartExecOptions, StartExecResults};
use bollard::models::{
    ContainerCreateBody, ContainerCreateResponse, ContainerInspectResponse,
    ContainerStatsResponse, ContainerSummary, CreateImageInfo, ImageDeleteResponseItem,
    ImageInspect, ImageSummary, Network, NetworkConnectRequest, NetworkCreateRequest,
    NetworkCreateResponse,
};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, InspectContainerOptions, ListContainersOptions,
    ListImagesOptions, ListNetworksOptions, LogsOptions, RemoveContainerOptions,
    RemoveImageOptions, RestartContainerOptions, StartContainerOptions, StatsOptions,
    StopContainerOptions,
};
use bollard::{Docker, body_full};
use bytes::Bytes;

use super::{ContainerClient, EngineFuture, EngineStream, ImageClient, NetworkClient};

impl ContainerClient for Docker {
    fn create_container(
        &self,
        options: Option<CreateContainerOptions>,
        config: ContainerCreateBody,
    ) -> EngineFuture<'_, ContainerCreateResponse> {
        Box::pin(async move { Self::create_container(self, options, config).await })
    }

    fn start_container(
        &self,
        id: &str,
        options: Option<StartContainerOptions>,
    ) -> EngineFuture<'_, ()> {
        let id_owned = String::from(id);
        Box::pin(async move { Self::start_container(self, &id_owned, options).await })
    }

    fn stop_container(
        &self,
        id: &str,
        options: Option<StopContainerOptions>,
    ) -> EngineFuture<'_, ()> {
        let id_owned = String::from(id);
        Box::pin(async move { Self::stop_container(self, &id_owned, options).await })
    }

    fn restart_container(
        &self,
        id: &str,
        options: Option<RestartContainerOptions>,
    ) -> EngineFuture<'_, ()> {
        let id_owned = String::from(id);
        Box::pin(async move { Self::restart_container(self, &id_owned, options).await })
    }

    fn remove_container(
        &self,
        id: &str,
        options: Option<RemoveContainerOptions>,
    ) -> EngineFuture<'_, ()> {
        let id_owned = String::from(id);
        Box::pin(async move { Self::remove_container(self, &id_owned, options).await })
    }

    fn inspect_container(&self, id: &str) -> EngineFuture<'_, ContainerInspectResponse> {
        let id_owned = String::from(id);
        Box::pin(async move {
            Self::inspect_container(self, &id_owned, None::<InspectContainerOptions>).await
        })
    }

    fn list_containers(
        &self,
        options: Option<ListContainersOptions>,
    ) -> EngineFuture<'_, Vec<ContainerSummary>> {
        Box::pin(async move { Self::list_containers(self, options).await })
    }

    fn stats(
        &self,
        id: &str,
        options: Option<StatsOptions>,
    ) -> EngineStream<'_, ContainerStatsResponse> {
        Box::pin(Self::stats(self, id, options))
    }

    fn logs(&self, id: &str, options: Option<LogsOptions>) -> EngineStream<'_, LogOutput> {
        Box::pin(Self::logs(self, id, options))
    }

    fn create_exec(
        &self,
        id: &str,
        options: CreateExecOptions<String>,
    ) -> EngineFuture<'_, CreateExecResults> {
        let id_owned = String::from(id);
        Box::pin(async move { Self::create_exec(self, &id_owned, options).await })
    }

    fn start_exec(
        &self,
        exec_id: &str,
        options: Option<StartExecOptions>,
    ) -> EngineFuture<'_, StartExecResults> {
        let exec_id_owned = String::from(exec_id);
        Box::pin(async move { Self::start_exec(self, &exec_id_owned, options).await })
    }
}

impl ImageClient for Docker {
    fn create_image(
        &self,
        options: Option<CreateImageOptions>,
        root_fs: Option<Bytes>,
    ) -> EngineStream<'_, CreateImageInfo> {
        Box::pin(Self::create_image(
            self,
            options,
            root_fs.map(body_full),
            None,
        ))
    }

    fn export_image(&self, image: &str) -> EngineStream<'_, Bytes> {
        Box::pin(Self::export_image(self, image))
    }

    fn list_images(&self, options: Option<ListImagesOptions>) -> EngineFuture<'_, Vec<ImageSummary>> {
        Box::pin(async move { Self::list_images(self, options).await })
    }

    fn inspect_image(&self, image: &str) -> EngineFuture<'_, ImageInspect> {
        let image_owned = String::from(image);
        Box::pin(async move { Self::inspect_image(self, &image_owned).await })
    }

    fn remove_image(
        &self,
        image: &str,
        options: Option<RemoveImageOptions>,
    ) -> EngineFuture<'_, Vec<ImageDeleteResponseItem>> {
        let image_owned = String::from(image);
        Box::pin(async move { Self::remove_image(self, &image_owned, options, None).await })
    }
}

impl NetworkClient for Docker {
    fn create_network(&self, config: NetworkCreateRequest) -> EngineFuture<'_, NetworkCreateResponse> {
        Box::pin(async move { Self::create_network(self, config).await })
    }

    fn connect_network(&self, network: &str, config: NetworkConnectRequest) -> EngineFuture<'_, ()> {
        let network_owned = String::from(network);
        Box::pin(async move { Self::connect_network(self, &network_owned, config).await })
    }

    fn remove_network(&self, network: &str) -> EngineFuture<'_, ()> {
        let network_owned = String::from(network);
        Box::pin(async move { Self::remove_network(self, &network_owned).await })
    }

    fn list_networks(&self, options: Option<ListNetworksOptions>) -> EngineFuture<'_, Vec<Network>> {
        Box::pin(async move { Self::list_networks(self, options).await })
    }
}
