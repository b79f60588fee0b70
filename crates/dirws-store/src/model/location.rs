// Named locations, optionally attached to a switch port.
//
// The remote model guarantees location implies port implies switch, so
// an attached location always carries both references.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use dirws_api::{WsClient, WsPath};

use crate::entity::{Entity, EntityBase, EntityExt, JsonMap};
use crate::error::StoreError;
use crate::model::monitor_query;
use crate::model::switch::{Switch, SwitchPort};
use crate::registry::{Registry, UpdateSpec, apply_object};

/// Wire record for a location.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationRecord {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

pub struct Location {
    base: EntityBase<LocationRecord>,
    switch: Option<Arc<Switch>>,
    switch_port: Option<Arc<SwitchPort>>,
}

impl Location {
    /// A location with no switch attachment.
    pub fn new(service: Arc<WsClient>, initial: JsonMap) -> Result<Arc<Self>, StoreError> {
        Ok(Arc::new(Self {
            base: EntityBase::new(service, initial)?,
            switch: None,
            switch_port: None,
        }))
    }

    /// A location attached to a switch port, as reported by an
    /// interface load.
    pub fn with_attachment(
        service: Arc<WsClient>,
        initial: JsonMap,
        switch: Arc<Switch>,
        switch_port: Arc<SwitchPort>,
    ) -> Result<Arc<Self>, StoreError> {
        Ok(Arc::new(Self {
            base: EntityBase::new(service, initial)?,
            switch: Some(switch),
            switch_port: Some(switch_port),
        }))
    }

    pub fn name(&self) -> Option<String> {
        self.with_record(|r| r.name.clone())
    }

    pub fn switch(&self) -> Option<Arc<Switch>> {
        self.switch.clone()
    }

    pub fn switch_port(&self) -> Option<Arc<SwitchPort>> {
        self.switch_port.clone()
    }

    /// UI monitor page for this location.
    pub fn monitor_path(&self) -> Option<String> {
        let name = self.name()?;
        Some(monitor_query(
            "/Monitors/Locations/LocationInfo",
            &[("name", &name)],
        ))
    }
}

static LOCATION_REGISTRY: Registry<Location> = Registry {
    update_types: &[(
        "config",
        UpdateSpec {
            path: config_path,
            apply: apply_object,
        },
    )],
    derived: &[("monitor_path", derived_monitor_path)],
};

fn config_path(location: &Location) -> Option<WsPath> {
    Some(location.canonical_path()?.join("config"))
}

fn derived_monitor_path(location: &Location) -> Option<Value> {
    location.monitor_path().map(Value::String)
}

impl Entity for Location {
    type Record = LocationRecord;

    fn base(&self) -> &EntityBase<LocationRecord> {
        &self.base
    }

    fn registry() -> &'static Registry<Self> {
        &LOCATION_REGISTRY
    }

    fn canonical_path(&self) -> Option<WsPath> {
        Some(WsPath::new(["location"]).join(self.name()?))
    }
}
