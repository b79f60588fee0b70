// Per-entity-type attribute registry.
//
// Each entity type declares a static `Registry`: which attribute groups
// (update types) exist and how each is loaded, plus the derived
// attributes computed from already-loaded data. Tables are plain fn
// pointers, so registration is free and evaluation happens only on use.

use dirws_api::WsPath;
use serde_json::Value;

use crate::entity::JsonMap;
use crate::error::StoreError;

/// How one attribute group is loaded.
///
/// `path` resolves the request path for a given instance (`None` for a
/// placeholder entity). `apply` post-processes the response into the
/// record merged into the entity's raw data; it may synthesize
/// classification fields and construct related entities, but must not
/// itself issue loads.
pub struct UpdateSpec<E> {
    pub path: fn(&E) -> Option<WsPath>,
    pub apply: fn(&E, Value) -> Result<JsonMap, StoreError>,
}

impl<E> Clone for UpdateSpec<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for UpdateSpec<E> {}

/// A derived attribute: a pure function over the entity's current state
/// and related entities. Never triggers a network load.
pub type DerivedFn<E> = fn(&E) -> Option<Value>;

/// Static attribute declarations for one entity type.
pub struct Registry<E: 'static> {
    pub update_types: &'static [(&'static str, UpdateSpec<E>)],
    pub derived: &'static [(&'static str, DerivedFn<E>)],
}

impl<E> Registry<E> {
    /// Look up the loader for an update type.
    ///
    /// An unregistered update type is a programming error and fails with
    /// `Configuration`.
    pub fn loader(&self, update_type: &str) -> Result<UpdateSpec<E>, StoreError> {
        self.update_types
            .iter()
            .find(|(name, _)| *name == update_type)
            .map(|(_, spec)| *spec)
            .ok_or_else(|| {
                StoreError::configuration(format!(
                    "no loader registered for update type `{update_type}`"
                ))
            })
    }

    /// Look up a derived-attribute getter by name.
    pub fn derived_fn(&self, name: &str) -> Result<DerivedFn<E>, StoreError> {
        self.derived
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, f)| *f)
            .ok_or_else(|| {
                StoreError::configuration(format!("no derived attribute registered as `{name}`"))
            })
    }

    /// Names of all registered derived attributes.
    pub fn derived_names(&self) -> impl Iterator<Item = &'static str> {
        self.derived.iter().map(|(name, _)| *name)
    }
}

/// Default `apply` step: the response must be a JSON object, merged as-is.
pub fn apply_object<E>(_entity: &E, response: Value) -> Result<JsonMap, StoreError> {
    into_object(response)
}

/// Require a JSON object, surfacing anything else as a service error.
pub fn into_object(response: Value) -> Result<JsonMap, StoreError> {
    match response {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::service(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}
