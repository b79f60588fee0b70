// Entity core: cached attribute state and lazy, grouped loading.
//
// An entity wraps the raw field map as last fetched, a typed record view
// over it, and the set of update types already loaded. Loads go through
// the type's `Registry` and are coalesced per update type per instance,
// so concurrent requests for the same group share one round trip.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use dirws_api::{WsClient, WsPath};

use crate::error::StoreError;
use crate::registry::{Registry, UpdateSpec};

/// Raw field map, as received from the service.
pub type JsonMap = serde_json::Map<String, Value>;

/// Bound on typed record views: deserializable from the raw field map,
/// with unknown fields preserved in the record's flattened extra map.
pub trait Record: DeserializeOwned + Default + Send + Sync + 'static {}

impl<T: DeserializeOwned + Default + Send + Sync + 'static> Record for T {}

/// Cached attribute state for one entity instance.
///
/// `raw` is canonical; `record` is a typed view refreshed after every
/// merge. A field read from a group not yet in `loaded` is simply not
/// there: reads never silently return stale data for unfetched groups.
pub struct Attributes<R> {
    raw: JsonMap,
    record: R,
    loaded: HashSet<&'static str>,
}

impl<R: Record> Attributes<R> {
    /// Build from an initial partial data set. No network load.
    pub fn new(initial: JsonMap) -> Result<Self, StoreError> {
        let record = decode(&initial).map_err(|e| {
            StoreError::invalid_argument(format!("initial data does not match record: {e}"))
        })?;
        Ok(Self {
            raw: initial,
            record,
            loaded: HashSet::new(),
        })
    }

    pub fn raw(&self) -> &JsonMap {
        &self.raw
    }

    pub fn record(&self) -> &R {
        &self.record
    }

    pub fn is_loaded(&self, update_type: &str) -> bool {
        self.loaded.contains(update_type)
    }

    /// Merge a fetched record over the current raw data and refresh the
    /// typed view. Fields absent from `patch` keep their last value.
    fn merge(&mut self, patch: JsonMap) -> Result<(), StoreError> {
        for (key, value) in patch {
            self.raw.insert(key, value);
        }
        self.record = decode(&self.raw)
            .map_err(|e| StoreError::service(format!("response does not match record: {e}")))?;
        Ok(())
    }
}

fn decode<R: Record>(map: &JsonMap) -> Result<R, serde_json::Error> {
    serde_json::from_value(Value::Object(map.clone()))
}

type SharedLoad = Shared<BoxFuture<'static, Result<(), StoreError>>>;

/// Per-instance plumbing shared by every entity type: the service
/// handle, the attribute state, and the in-flight load table.
pub struct EntityBase<R> {
    service: Arc<WsClient>,
    state: RwLock<Attributes<R>>,
    inflight: Mutex<HashMap<&'static str, SharedLoad>>,
}

impl<R: Record> EntityBase<R> {
    pub fn new(service: Arc<WsClient>, initial: JsonMap) -> Result<Self, StoreError> {
        Ok(Self {
            service,
            state: RwLock::new(Attributes::new(initial)?),
            inflight: Mutex::new(HashMap::new()),
        })
    }

    pub fn service(&self) -> &Arc<WsClient> {
        &self.service
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Attributes<R>> {
        self.state.read().expect("attribute state lock poisoned")
    }
}

impl<R: Record + std::fmt::Debug> std::fmt::Debug for EntityBase<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityBase")
            .field("record", self.read().record())
            .finish_non_exhaustive()
    }
}

/// An addressable object mirrored from the directory service.
pub trait Entity: Send + Sync + Sized + 'static {
    type Record: Record;

    fn base(&self) -> &EntityBase<Self::Record>;

    /// The static attribute declarations for this type.
    fn registry() -> &'static Registry<Self>;

    /// The entity's unique service path, or `None` for a placeholder
    /// entity whose identity fields are missing. Callers performing
    /// existence checks branch on `None` instead of handling an error.
    fn canonical_path(&self) -> Option<WsPath>;
}

/// Read-side operations shared by all entity types.
pub trait EntityExt: Entity {
    /// Best-known value of a raw field. Never triggers a load.
    fn get_value(&self, field: &str) -> Option<Value> {
        self.base().read().raw().get(field).cloned()
    }

    /// Whether an update type has been fetched on this instance.
    fn is_loaded(&self, update_type: &str) -> bool {
        self.base().read().is_loaded(update_type)
    }

    /// Evaluate a registered derived attribute against current state.
    ///
    /// Fails with `Configuration` if the name is unregistered; returns
    /// `Ok(None)` when the attribute's inputs are not yet known.
    fn derived_value(&self, name: &str) -> Result<Option<Value>, StoreError> {
        let getter = Self::registry().derived_fn(name)?;
        Ok(getter(self))
    }

    /// Borrow the typed record view under the state lock.
    fn with_record<T>(&self, f: impl FnOnce(&Self::Record) -> T) -> T {
        f(self.base().read().record())
    }
}

impl<E: Entity> EntityExt for E {}

/// Load one attribute group, coalescing with any in-flight load of the
/// same update type on the same instance.
///
/// On success the response record is merged into the raw data and the
/// group is marked loaded; derived attributes observe the new state on
/// their next read. Loads of different update types may run concurrently
/// and complete in any order. There is no cancellation: once issued, a
/// load runs to completion or failure.
pub async fn load<E: Entity>(entity: &Arc<E>, update_type: &'static str) -> Result<(), StoreError> {
    let shared = {
        let spec = E::registry().loader(update_type)?;
        let mut inflight = entity
            .base()
            .inflight
            .lock()
            .expect("in-flight table lock poisoned");
        if let Some(active) = inflight.get(update_type) {
            debug!(update_type, "joining in-flight load");
            active.clone()
        } else {
            let target = Arc::clone(entity);
            let fut: BoxFuture<'static, Result<(), StoreError>> = async move {
                let result = run_load(&target, update_type, spec).await;
                target
                    .base()
                    .inflight
                    .lock()
                    .expect("in-flight table lock poisoned")
                    .remove(update_type);
                result
            }
            .boxed();
            let shared = fut.shared();
            inflight.insert(update_type, shared.clone());
            shared
        }
    };
    shared.await
}

async fn run_load<E: Entity>(
    entity: &Arc<E>,
    update_type: &'static str,
    spec: UpdateSpec<E>,
) -> Result<(), StoreError> {
    let Some(path) = (spec.path)(entity) else {
        return Err(StoreError::invalid_state(format!(
            "cannot load `{update_type}` on a placeholder entity"
        )));
    };

    debug!(%path, update_type, "loading attribute group");
    let response = entity.base().service.get_json(&path).await?;
    let record = (spec.apply)(entity, response)?;

    let mut state = entity
        .base()
        .state
        .write()
        .expect("attribute state lock poisoned");
    state.merge(record)?;
    state.loaded.insert(update_type);
    Ok(())
}
