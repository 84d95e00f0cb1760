//! Scripted engine double backing the facade lookup scenarios.

use std::sync::{Arc, Mutex};

use bollard::container::LogOutput;
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
use dockhand::engine::{
    ContainerClient, EngineFuture, EngineStream, ImageClient, NetworkClient, RuntimeFacade,
};
use mockall::mock;

use super::state::LookupState;

mock! {
    #[derive(Debug)]
    pub LookupEngine {}

    impl ContainerClient for LookupEngine {
        fn create_container(&self, options: Option<CreateContainerOptions>, config: ContainerCreateBody) -> EngineFuture<'_, ContainerCreateResponse>;
        fn start_container(&self, id: &str, options: Option<StartContainerOptions>) -> EngineFuture<'_, ()>;
        fn stop_container(&self, id: &str, options: Option<StopContainerOptions>) -> EngineFuture<'_, ()>;
        fn restart_container(&self, id: &str, options: Option<RestartContainerOptions>) -> EngineFuture<'_, ()>;
        fn remove_container(&self, id: &str, options: Option<RemoveContainerOptions>) -> EngineFuture<'_, ()>;
        fn inspect_container(&self, id: &str) -> EngineFuture<'_, ContainerInspectResponse>;
        fn list_containers(&self, options: Option<ListContainersOptions>) -> EngineFuture<'_, Vec<ContainerSummary>>;
        fn stats(&self, id: &str, options: Option<StatsOptions>) -> EngineStream<'_, ContainerStatsResponse>;
        fn logs(&self, id: &str, options: Option<LogsOptions>) -> EngineStream<'_, LogOutput>;
        fn create_exec(&self, id: &str, options: CreateExecOptions<String>) -> EngineFuture<'_, CreateExecResults>;
        fn start_exec(&self, exec_id: &str, options: Option<StartExecOptions>) -> EngineFuture<'_, StartExecResults>;
    }

    impl ImageClient for LookupEngine {
        fn create_image(&self, options: Option<CreateImageOptions>, root_fs: Option<Bytes>) -> EngineStream<'_, CreateImageInfo>;
        fn export_image(&self, image: &str) -> EngineStream<'_, Bytes>;
        fn list_images(&self, options: Option<ListImagesOptions>) -> EngineFuture<'_, Vec<ImageSummary>>;
        fn inspect_image(&self, image: &str) -> EngineFuture<'_, ImageInspect>;
        fn remove_image(&self, image: &str, options: Option<RemoveImageOptions>) -> EngineFuture<'_, Vec<ImageDeleteResponseItem>>;
    }

    impl NetworkClient for LookupEngine {
        fn create_network(&self, config: NetworkCreateRequest) -> EngineFuture<'_, NetworkCreateResponse>;
        fn connect_network(&self, network: &str, config: NetworkConnectRequest) -> EngineFuture<'_, ()>;
        fn remove_network(&self, network: &str) -> EngineFuture<'_, ()>;
        fn list_networks(&self, options: Option<ListNetworksOptions>) -> EngineFuture<'_, Vec<Network>>;
    }
}

/// Grace period recorded from the last stop request.
pub(crate) type GraceRecorder = Arc<Mutex<Option<i32>>>;

fn container_summary(name: &str) -> ContainerSummary {
    ContainerSummary {
        id: Some(format!("id-{name}")),
        names: Some(vec![format!("/{name}")]),
        image_id: Some(format!("sha256:image-{name}")),
        ..ContainerSummary::default()
    }
}

fn network_summary(name: &str) -> Network {
    Network {
        id: Some(format!("id-{name}")),
        name: Some(String::from(name)),
        ..Network::default()
    }
}

fn image_summaries(tags: &[String], digests: &[String]) -> Vec<ImageSummary> {
    let tagged = tags.iter().map(|tag| ImageSummary {
        repo_tags: vec![tag.clone()],
        ..ImageSummary::default()
    });
    let digested = digests.iter().map(|digest| ImageSummary {
        repo_digests: vec![digest.clone()],
        ..ImageSummary::default()
    });
    tagged.chain(digested).collect()
}

/// Build a facade over an engine that answers listings from scenario state.
///
/// The engine ignores filters, returning every scripted entry, so the
/// facade's own exact-match scans are what the scenarios observe.
pub(crate) fn scripted_facade(
    state: &LookupState,
) -> (RuntimeFacade<MockLookupEngine>, GraceRecorder) {
    let containers: Vec<ContainerSummary> = state
        .container_names
        .get()
        .unwrap_or_default()
        .iter()
        .map(|name| container_summary(name))
        .collect();
    let networks: Vec<Network> = state
        .network_names
        .get()
        .unwrap_or_default()
        .iter()
        .map(|name| network_summary(name))
        .collect();
    let images = image_summaries(
        &state.image_tags.get().unwrap_or_default(),
        &state.image_digests.get().unwrap_or_default(),
    );

    let mut client = MockLookupEngine::new();
    client.expect_list_containers().returning(move |_| {
        let listed = containers.clone();
        Box::pin(async move { Ok(listed) })
    });
    client.expect_list_networks().returning(move |_| {
        let listed = networks.clone();
        Box::pin(async move { Ok(listed) })
    });
    client.expect_list_images().returning(move |_| {
        let listed = images.clone();
        Box::pin(async move { Ok(listed) })
    });

    let recorder = GraceRecorder::default();
    let sink = Arc::clone(&recorder);
    client.expect_stop_container().returning(move |_, options| {
        if let Ok(mut sent) = sink.lock() {
            *sent = options.and_then(|o| o.t);
        }
        Box::pin(async { Ok(()) })
    });

    (RuntimeFacade::new(client), recorder)
}
