//! Network operations.

use bollard::models::{EndpointSettings, NetworkConnectRequest, NetworkCreateRequest};
use bollard::query_parameters::ListNetworksOptionsBuilder;
use tracing::debug;

use super::{RuntimeFacade, filter};
use crate::engine::client::NetworkClient;
use crate::error::DockhandError;

impl<C: NetworkClient> RuntimeFacade<C> {
    /// Create a network with engine defaults and return its ID.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Api` when the engine rejects the request.
    pub async fn create_network(&self, name: &str) -> Result<String, DockhandError> {
        debug!(network = name, "creating network");
        let request = NetworkCreateRequest {
            name: String::from(name),
            ..NetworkCreateRequest::default()
        };
        let response = self.call(self.client.create_network(request)).await?;
        Ok(response.id)
    }

    /// Attach `container` to `network` with default endpoint settings.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Api` when the engine rejects the request.
    pub async fn connect_network(&self, network: &str, container: &str) -> Result<(), DockhandError> {
        debug!(network, container, "connecting container to network");
        let request = NetworkConnectRequest {
            container: String::from(container),
            endpoint_config: Some(EndpointSettings::default()),
            ..NetworkConnectRequest::default()
        };
        self.call(self.client.connect_network(network, request))
            .await
    }

    /// Remove a network.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Api` when the engine rejects the request.
    pub async fn remove_network(&self, network: &str) -> Result<(), DockhandError> {
        debug!(network, "removing network");
        self.call(self.client.remove_network(network)).await
    }

    /// Look up a network ID by exact name.
    ///
    /// The engine's name filter matches substrings, so candidates are
    /// compared for equality. Returns `None` when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Api` when the listing fails.
    pub async fn ensure_network_exists(&self, name: &str) -> Result<Option<String>, DockhandError> {
        let options = ListNetworksOptionsBuilder::new()
            .filters(&filter("name", name))
            .build();
        let networks = self
            .call(self.client.list_networks(Some(options)))
            .await?;

        let found = networks
            .into_iter()
            .find(|network| network.name.as_deref() == Some(name))
            .and_then(|network| network.id);
        debug!(network = name, found = ?found, "network lookup by name");
        Ok(found)
    }
}
