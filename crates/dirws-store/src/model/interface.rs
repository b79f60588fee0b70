// Host interfaces.
//
// An interface is addressed through its owning host and, once its
// `info` group is loaded, may reference the switch, switch port, and
// location it attaches to. Those references follow a strict dependency
// order reflecting the remote model: location implies port implies
// switch.

use std::sync::{Arc, RwLock};

use serde::Deserialize;
use serde_json::Value;

use dirws_api::{WsClient, WsPath};

use crate::entity::{Entity, EntityBase, EntityExt, JsonMap};
use crate::error::StoreError;
use crate::model::host::Host;
use crate::model::location::Location;
use crate::model::switch::{Switch, SwitchPort};
use crate::model::{monitor_query, named_record};
use crate::registry::{Registry, UpdateSpec, into_object};

/// Wire record for a host interface.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterfaceRecord {
    pub name: Option<String>,
    pub dladdr: Option<String>,
    pub gateway: Option<bool>,
    pub router: Option<bool>,
    /// Synthesized classification: `Gateway`, `Router`, or `End-Host`.
    pub intftype: Option<String>,
    pub switch_name: Option<String>,
    pub port_name: Option<String>,
    pub location_name: Option<String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Default)]
struct InterfaceRelations {
    switch: Option<Arc<Switch>>,
    switch_port: Option<Arc<SwitchPort>>,
    location: Option<Arc<Location>>,
}

/// An interface on a host. The owning host is a mandatory association:
/// an interface is only addressable through its host's path.
pub struct HostInterface {
    base: EntityBase<InterfaceRecord>,
    host: Arc<Host>,
    relations: RwLock<InterfaceRelations>,
}

impl HostInterface {
    pub fn new(
        service: Arc<WsClient>,
        host: Arc<Host>,
        initial: JsonMap,
    ) -> Result<Arc<Self>, StoreError> {
        Ok(Arc::new(Self {
            base: EntityBase::new(service, initial)?,
            host,
            relations: RwLock::new(InterfaceRelations::default()),
        }))
    }

    pub fn name(&self) -> Option<String> {
        self.with_record(|r| r.name.clone())
    }

    pub fn host(&self) -> &Arc<Host> {
        &self.host
    }

    /// The switch this interface attaches to, if reported.
    pub fn switch_obj(&self) -> Option<Arc<Switch>> {
        self.relations().switch.clone()
    }

    /// The switch port this interface attaches to. Only ever set when a
    /// switch reference was set.
    pub fn switch_port_obj(&self) -> Option<Arc<SwitchPort>> {
        self.relations().switch_port.clone()
    }

    /// The location of the attachment point. Only ever set when a port
    /// reference was set.
    pub fn location(&self) -> Option<Arc<Location>> {
        self.relations().location.clone()
    }

    /// UI monitor page for this interface, on its host's page.
    pub fn monitor_path(&self) -> Option<String> {
        let host_name = self.host.name()?;
        let name = self.name()?;
        Some(monitor_query(
            "/Monitors/Hosts/HostInfo",
            &[("name", &host_name), ("interface", &name)],
        ))
    }

    fn relations(&self) -> std::sync::RwLockReadGuard<'_, InterfaceRelations> {
        self.relations.read().expect("relations lock poisoned")
    }
}

static INTERFACE_REGISTRY: Registry<HostInterface> = Registry {
    update_types: &[(
        "info",
        UpdateSpec {
            path: info_path,
            apply: apply_info,
        },
    )],
    derived: &[
        ("monitor_path", derived_monitor_path),
        ("switch_monitor_path", derived_switch_monitor_path),
        ("switch_port_monitor_path", derived_port_monitor_path),
        ("location_monitor_path", derived_location_monitor_path),
    ],
};

fn info_path(interface: &HostInterface) -> Option<WsPath> {
    interface.canonical_path()
}

/// Post-process an `info` response: construct related entities in
/// dependency order, then synthesize the interface classification.
fn apply_info(interface: &HostInterface, response: Value) -> Result<JsonMap, StoreError> {
    let mut record = into_object(response)?;
    let service = interface.base().service();

    if let Some(switch_name) = record.get("switch_name").and_then(Value::as_str) {
        let switch = Switch::new(Arc::clone(service), named_record(switch_name))?;
        let mut relations = interface
            .relations
            .write()
            .expect("relations lock poisoned");
        relations.switch = Some(Arc::clone(&switch));

        if let Some(port_name) = record.get("port_name").and_then(Value::as_str) {
            let port = SwitchPort::new(
                Arc::clone(service),
                Arc::clone(&switch),
                named_record(port_name),
            )?;
            relations.switch_port = Some(Arc::clone(&port));

            if let Some(location_name) = record.get("location_name").and_then(Value::as_str) {
                let location = Location::with_attachment(
                    Arc::clone(service),
                    named_record(location_name),
                    switch,
                    port,
                )?;
                relations.location = Some(location);
            }
        }
    }

    // Gateway takes precedence over router, router over the default.
    let intftype = if record.get("gateway").and_then(Value::as_bool).unwrap_or(false) {
        "Gateway"
    } else if record.get("router").and_then(Value::as_bool).unwrap_or(false) {
        "Router"
    } else {
        "End-Host"
    };
    record.insert("intftype".to_owned(), Value::String(intftype.to_owned()));

    Ok(record)
}

fn derived_monitor_path(interface: &HostInterface) -> Option<Value> {
    interface.monitor_path().map(Value::String)
}

fn derived_switch_monitor_path(interface: &HostInterface) -> Option<Value> {
    interface
        .switch_obj()
        .and_then(|s| s.monitor_path())
        .map(Value::String)
}

fn derived_port_monitor_path(interface: &HostInterface) -> Option<Value> {
    interface
        .switch_port_obj()
        .and_then(|p| p.monitor_path())
        .map(Value::String)
}

fn derived_location_monitor_path(interface: &HostInterface) -> Option<Value> {
    interface
        .location()
        .and_then(|l| l.monitor_path())
        .map(Value::String)
}

impl Entity for HostInterface {
    type Record = InterfaceRecord;

    fn base(&self) -> &EntityBase<InterfaceRecord> {
        &self.base
    }

    fn registry() -> &'static Registry<Self> {
        &INTERFACE_REGISTRY
    }

    fn canonical_path(&self) -> Option<WsPath> {
        Some(
            self.host
                .canonical_path()?
                .join("interface")
                .join(self.name()?),
        )
    }
}
