// Switches and their ports.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use dirws_api::{WsClient, WsPath};

use crate::entity::{Entity, EntityBase, EntityExt, JsonMap};
use crate::error::StoreError;
use crate::model::monitor_query;
use crate::registry::{Registry, UpdateSpec, apply_object};
use crate::store::Store;

/// Wire record for a switch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SwitchRecord {
    pub name: Option<String>,
    pub dpid: Option<String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

pub struct Switch {
    base: EntityBase<SwitchRecord>,
}

impl Switch {
    pub fn new(service: Arc<WsClient>, initial: JsonMap) -> Result<Arc<Self>, StoreError> {
        Ok(Arc::new(Self {
            base: EntityBase::new(service, initial)?,
        }))
    }

    pub fn name(&self) -> Option<String> {
        self.with_record(|r| r.name.clone())
    }

    /// UI monitor page for this switch.
    pub fn monitor_path(&self) -> Option<String> {
        let name = self.name()?;
        Some(monitor_query(
            "/Monitors/Switches/SwitchInfo",
            &[("name", &name)],
        ))
    }

    /// Scoped sub-store over this switch's ports, or `None` for a
    /// placeholder switch. Ports are constructed owned by this switch.
    pub fn port_store(this: &Arc<Self>) -> Option<Store<SwitchPort>> {
        let url = this.canonical_path()?.join("port");
        let service = Arc::clone(this.base.service());
        let owner = Arc::clone(this);
        Some(Store::bind(
            Arc::clone(this.base.service()),
            url,
            move |record| SwitchPort::new(Arc::clone(&service), Arc::clone(&owner), record),
        ))
    }
}

static SWITCH_REGISTRY: Registry<Switch> = Registry {
    update_types: &[(
        "info",
        UpdateSpec {
            path: switch_info_path,
            apply: apply_object,
        },
    )],
    derived: &[("monitor_path", switch_monitor_path)],
};

fn switch_info_path(switch: &Switch) -> Option<WsPath> {
    switch.canonical_path()
}

fn switch_monitor_path(switch: &Switch) -> Option<Value> {
    switch.monitor_path().map(Value::String)
}

impl Entity for Switch {
    type Record = SwitchRecord;

    fn base(&self) -> &EntityBase<SwitchRecord> {
        &self.base
    }

    fn registry() -> &'static Registry<Self> {
        &SWITCH_REGISTRY
    }

    fn canonical_path(&self) -> Option<WsPath> {
        Some(WsPath::new(["switch"]).join(self.name()?))
    }
}

impl Store<Switch> {
    /// Store over the top-level switch collection.
    pub fn switches(service: &Arc<WsClient>) -> Self {
        let make_service = Arc::clone(service);
        Store::bind(
            Arc::clone(service),
            WsPath::new(["switch"]),
            move |record| Switch::new(Arc::clone(&make_service), record),
        )
    }
}

/// Wire record for a switch port.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SwitchPortRecord {
    pub name: Option<String>,
    pub port_no: Option<u32>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// A port on a switch. The owning switch is a mandatory association:
/// a port is only addressable through its switch's path.
pub struct SwitchPort {
    base: EntityBase<SwitchPortRecord>,
    switch: Arc<Switch>,
}

impl SwitchPort {
    pub fn new(
        service: Arc<WsClient>,
        switch: Arc<Switch>,
        initial: JsonMap,
    ) -> Result<Arc<Self>, StoreError> {
        Ok(Arc::new(Self {
            base: EntityBase::new(service, initial)?,
            switch,
        }))
    }

    pub fn name(&self) -> Option<String> {
        self.with_record(|r| r.name.clone())
    }

    pub fn switch(&self) -> &Arc<Switch> {
        &self.switch
    }

    /// UI monitor page for this port.
    pub fn monitor_path(&self) -> Option<String> {
        let switch_name = self.switch.name()?;
        let name = self.name()?;
        Some(monitor_query(
            "/Monitors/Switches/SwitchPortInfo",
            &[("switch", &switch_name), ("port", &name)],
        ))
    }
}

static SWITCH_PORT_REGISTRY: Registry<SwitchPort> = Registry {
    update_types: &[(
        "info",
        UpdateSpec {
            path: port_info_path,
            apply: apply_object,
        },
    )],
    derived: &[("monitor_path", port_monitor_path)],
};

fn port_info_path(port: &SwitchPort) -> Option<WsPath> {
    port.canonical_path()
}

fn port_monitor_path(port: &SwitchPort) -> Option<Value> {
    port.monitor_path().map(Value::String)
}

impl Entity for SwitchPort {
    type Record = SwitchPortRecord;

    fn base(&self) -> &EntityBase<SwitchPortRecord> {
        &self.base
    }

    fn registry() -> &'static Registry<Self> {
        &SWITCH_PORT_REGISTRY
    }

    fn canonical_path(&self) -> Option<WsPath> {
        Some(self.switch.canonical_path()?.join("port").join(self.name()?))
    }
}
