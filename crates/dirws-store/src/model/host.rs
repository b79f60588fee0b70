// Host principals and their interface sub-collections.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use dirws_api::{WsClient, WsPath};

use crate::entity::{Entity, EntityBase, EntityExt, JsonMap};
use crate::error::StoreError;
use crate::model::interface::HostInterface;
use crate::model::monitor_query;
use crate::registry::{Registry, UpdateSpec, apply_object};
use crate::store::Store;

/// Wire record for a host principal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostRecord {
    pub name: Option<String>,
    pub directory_name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// A host: a leaf principal addressed by directory and name, owning
/// zero or more interfaces.
pub struct Host {
    base: EntityBase<HostRecord>,
}

impl Host {
    pub fn new(service: Arc<WsClient>, initial: JsonMap) -> Result<Arc<Self>, StoreError> {
        Ok(Arc::new(Self {
            base: EntityBase::new(service, initial)?,
        }))
    }

    pub fn name(&self) -> Option<String> {
        self.with_record(|r| r.name.clone())
    }

    pub fn directory_name(&self) -> Option<String> {
        self.with_record(|r| r.directory_name.clone())
    }

    /// UI monitor page for this host.
    pub fn monitor_path(&self) -> Option<String> {
        let name = self.name()?;
        Some(monitor_query("/Monitors/Hosts/HostInfo", &[("name", &name)]))
    }

    /// Scoped sub-store over this host's interfaces, or `None` for a
    /// placeholder host. Each row is constructed with this host as its
    /// mandatory owning association.
    pub fn interface_store(this: &Arc<Self>) -> Option<Store<HostInterface>> {
        let url = this.canonical_path()?.join("interface");
        let service = Arc::clone(this.base.service());
        let owner = Arc::clone(this);
        Some(Store::bind(
            Arc::clone(this.base.service()),
            url,
            move |record| HostInterface::new(Arc::clone(&service), Arc::clone(&owner), record),
        ))
    }
}

static HOST_REGISTRY: Registry<Host> = Registry {
    update_types: &[(
        "info",
        UpdateSpec {
            path: info_path,
            apply: apply_object,
        },
    )],
    derived: &[("monitor_path", derived_monitor_path)],
};

fn info_path(host: &Host) -> Option<WsPath> {
    host.canonical_path()
}

fn derived_monitor_path(host: &Host) -> Option<Value> {
    host.monitor_path().map(Value::String)
}

impl Entity for Host {
    type Record = HostRecord;

    fn base(&self) -> &EntityBase<HostRecord> {
        &self.base
    }

    fn registry() -> &'static Registry<Self> {
        &HOST_REGISTRY
    }

    fn canonical_path(&self) -> Option<WsPath> {
        let (directory, name) =
            self.with_record(|r| (r.directory_name.clone(), r.name.clone()));
        Some(WsPath::new(["host"]).join(directory?).join(name?))
    }
}

impl Store<Host> {
    /// Store over the top-level host collection.
    pub fn hosts(service: &Arc<WsClient>) -> Self {
        Self::hosts_at(service, WsPath::new(["host"]))
    }

    /// Host store scoped at an arbitrary listing URL.
    pub fn hosts_at(service: &Arc<WsClient>, url: WsPath) -> Self {
        let make_service = Arc::clone(service);
        Store::bind(Arc::clone(service), url, move |record| {
            Host::new(Arc::clone(&make_service), record)
        })
    }
}
