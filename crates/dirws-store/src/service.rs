// Service facade: one handle, all top-level stores.

use std::sync::Arc;

use url::Url;

use dirws_api::{TransportConfig, WsClient};

use crate::error::StoreError;
use crate::model::{Directory, Host, HostGroup, Switch, User, UserGroup};
use crate::store::Store;

/// Entry point for UI code: wraps the transport client and hands out
/// stores over the top-level collections. Entities constructed by those
/// stores share this handle's client.
#[derive(Clone)]
pub struct DirectoryService {
    service: Arc<WsClient>,
}

impl DirectoryService {
    /// Connect to a service root (e.g. `https://controller`).
    pub fn connect(base_url: Url, transport: &TransportConfig) -> Result<Self, StoreError> {
        let client = WsClient::new(base_url, transport)
            .map_err(|e| StoreError::Configuration {
                message: e.to_string(),
            })?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: WsClient) -> Self {
        Self {
            service: Arc::new(client),
        }
    }

    /// The shared transport handle, for constructing entities directly.
    pub fn handle(&self) -> &Arc<WsClient> {
        &self.service
    }

    pub fn directories(&self) -> Store<Directory> {
        Store::directories(&self.service)
    }

    pub fn users(&self) -> Store<User> {
        Store::users(&self.service)
    }

    pub fn hosts(&self) -> Store<Host> {
        Store::hosts(&self.service)
    }

    pub fn host_groups(&self) -> Store<HostGroup> {
        Store::host_groups(&self.service)
    }

    pub fn user_groups(&self) -> Store<UserGroup> {
        Store::user_groups(&self.service)
    }

    pub fn switches(&self) -> Store<Switch> {
        Store::switches(&self.service)
    }
}
