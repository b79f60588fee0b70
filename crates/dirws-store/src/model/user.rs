// User principals.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use dirws_api::{WsClient, WsPath};

use crate::entity::{Entity, EntityBase, EntityExt, JsonMap};
use crate::error::StoreError;
use crate::model::monitor_query;
use crate::registry::{Registry, UpdateSpec, apply_object};
use crate::store::Store;

/// Wire record for a user principal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRecord {
    pub name: Option<String>,
    pub directory_name: Option<String>,
    pub user_id: Option<i64>,
    pub user_real_name: Option<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// A user: a leaf principal addressed by directory and name.
#[derive(Debug)]
pub struct User {
    base: EntityBase<UserRecord>,
}

impl User {
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

    /// UI monitor page for this user.
    pub fn monitor_path(&self) -> Option<String> {
        let name = self.name()?;
        Some(monitor_query("/Monitors/Users/UserInfo", &[("name", &name)]))
    }
}

static USER_REGISTRY: Registry<User> = Registry {
    update_types: &[(
        "info",
        UpdateSpec {
            path: info_path,
            apply: apply_object,
        },
    )],
    derived: &[("monitor_path", derived_monitor_path)],
};

fn info_path(user: &User) -> Option<WsPath> {
    user.canonical_path()
}

fn derived_monitor_path(user: &User) -> Option<Value> {
    user.monitor_path().map(Value::String)
}

impl Entity for User {
    type Record = UserRecord;

    fn base(&self) -> &EntityBase<UserRecord> {
        &self.base
    }

    fn registry() -> &'static Registry<Self> {
        &USER_REGISTRY
    }

    fn canonical_path(&self) -> Option<WsPath> {
        let (directory, name) =
            self.with_record(|r| (r.directory_name.clone(), r.name.clone()));
        Some(WsPath::new(["user"]).join(directory?).join(name?))
    }
}

impl Store<User> {
    /// Store over the top-level user collection.
    pub fn users(service: &Arc<WsClient>) -> Self {
        Self::users_at(service, WsPath::new(["user"]))
    }

    /// User store scoped at an arbitrary listing URL (e.g. a group's
    /// member collection).
    pub fn users_at(service: &Arc<WsClient>, url: WsPath) -> Self {
        let make_service = Arc::clone(service);
        Store::bind(Arc::clone(service), url, move |record| {
            User::new(Arc::clone(&make_service), record)
        })
    }
}
