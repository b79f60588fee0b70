// Principal groups.
//
// A group references parent groups, subgroups, and member principals,
// each exposed as its own scoped sub-store. Membership forms a DAG (a
// group or principal may have multiple parents); traversal and cycle
// detection are the caller's responsibility.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use dirws_api::{WsClient, WsPath};

use crate::entity::{Entity, EntityBase, EntityExt, JsonMap};
use crate::error::StoreError;
use crate::model::host::Host;
use crate::model::monitor_query;
use crate::model::user::User;
use crate::registry::{Registry, UpdateSpec, apply_object};
use crate::store::Store;

/// Wire record shared by host and user groups.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupRecord {
    pub directory_name: Option<String>,
    pub group_name: Option<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

fn group_path(kind: &str, record: &GroupRecord) -> Option<WsPath> {
    Some(
        WsPath::new(["group", kind])
            .join(record.directory_name.clone()?)
            .join(record.group_name.clone()?),
    )
}

// ── Host groups ─────────────────────────────────────────────────────

pub struct HostGroup {
    base: EntityBase<GroupRecord>,
}

impl HostGroup {
    pub fn new(service: Arc<WsClient>, initial: JsonMap) -> Result<Arc<Self>, StoreError> {
        Ok(Arc::new(Self {
            base: EntityBase::new(service, initial)?,
        }))
    }

    pub fn group_name(&self) -> Option<String> {
        self.with_record(|r| r.group_name.clone())
    }

    pub fn directory_name(&self) -> Option<String> {
        self.with_record(|r| r.directory_name.clone())
    }

    /// UI monitor page for this group.
    pub fn monitor_path(&self) -> Option<String> {
        let name = self.group_name()?;
        Some(monitor_query(
            "/Monitors/Groups/HostGroupInfo",
            &[("name", &name)],
        ))
    }

    /// Store over this group's parent groups, or `None` for a
    /// placeholder group (no request is issued).
    pub fn parent_group_store(&self) -> Option<Store<HostGroup>> {
        let url = self.canonical_path()?.join("parent");
        Some(Store::host_groups_at(self.base.service(), url))
    }

    /// Store over this group's subgroups.
    pub fn subgroup_store(&self) -> Option<Store<HostGroup>> {
        let url = self.canonical_path()?.join("subgroup");
        Some(Store::host_groups_at(self.base.service(), url))
    }

    /// Store over this group's directly-member hosts.
    pub fn principal_member_store(&self) -> Option<Store<Host>> {
        let url = self.canonical_path()?.join("principal");
        Some(Store::hosts_at(self.base.service(), url))
    }
}

static HOST_GROUP_REGISTRY: Registry<HostGroup> = Registry {
    update_types: &[(
        "info",
        UpdateSpec {
            path: host_group_info_path,
            apply: apply_object,
        },
    )],
    derived: &[("monitor_path", host_group_monitor_path)],
};

fn host_group_info_path(group: &HostGroup) -> Option<WsPath> {
    group.canonical_path()
}

fn host_group_monitor_path(group: &HostGroup) -> Option<Value> {
    group.monitor_path().map(Value::String)
}

impl Entity for HostGroup {
    type Record = GroupRecord;

    fn base(&self) -> &EntityBase<GroupRecord> {
        &self.base
    }

    fn registry() -> &'static Registry<Self> {
        &HOST_GROUP_REGISTRY
    }

    fn canonical_path(&self) -> Option<WsPath> {
        self.with_record(|r| group_path("host", r))
    }
}

impl Store<HostGroup> {
    /// Store over the top-level host group collection.
    pub fn host_groups(service: &Arc<WsClient>) -> Self {
        Self::host_groups_at(service, WsPath::new(["group", "host"]))
    }

    /// Host group store scoped at an arbitrary listing URL (e.g. a
    /// group's parent or subgroup collection).
    pub fn host_groups_at(service: &Arc<WsClient>, url: WsPath) -> Self {
        let make_service = Arc::clone(service);
        Store::bind(Arc::clone(service), url, move |record| {
            HostGroup::new(Arc::clone(&make_service), record)
        })
    }
}

// ── User groups ─────────────────────────────────────────────────────

pub struct UserGroup {
    base: EntityBase<GroupRecord>,
}

impl UserGroup {
    pub fn new(service: Arc<WsClient>, initial: JsonMap) -> Result<Arc<Self>, StoreError> {
        Ok(Arc::new(Self {
            base: EntityBase::new(service, initial)?,
        }))
    }

    pub fn group_name(&self) -> Option<String> {
        self.with_record(|r| r.group_name.clone())
    }

    pub fn directory_name(&self) -> Option<String> {
        self.with_record(|r| r.directory_name.clone())
    }

    /// UI monitor page for this group.
    pub fn monitor_path(&self) -> Option<String> {
        let name = self.group_name()?;
        Some(monitor_query(
            "/Monitors/Groups/UserGroupInfo",
            &[("name", &name)],
        ))
    }

    pub fn parent_group_store(&self) -> Option<Store<UserGroup>> {
        let url = self.canonical_path()?.join("parent");
        Some(Store::user_groups_at(self.base.service(), url))
    }

    pub fn subgroup_store(&self) -> Option<Store<UserGroup>> {
        let url = self.canonical_path()?.join("subgroup");
        Some(Store::user_groups_at(self.base.service(), url))
    }

    /// Store over this group's directly-member users.
    pub fn principal_member_store(&self) -> Option<Store<User>> {
        let url = self.canonical_path()?.join("principal");
        Some(Store::users_at(self.base.service(), url))
    }
}

static USER_GROUP_REGISTRY: Registry<UserGroup> = Registry {
    update_types: &[(
        "info",
        UpdateSpec {
            path: user_group_info_path,
            apply: apply_object,
        },
    )],
    derived: &[("monitor_path", user_group_monitor_path)],
};

fn user_group_info_path(group: &UserGroup) -> Option<WsPath> {
    group.canonical_path()
}

fn user_group_monitor_path(group: &UserGroup) -> Option<Value> {
    group.monitor_path().map(Value::String)
}

impl Entity for UserGroup {
    type Record = GroupRecord;

    fn base(&self) -> &EntityBase<GroupRecord> {
        &self.base
    }

    fn registry() -> &'static Registry<Self> {
        &USER_GROUP_REGISTRY
    }

    fn canonical_path(&self) -> Option<WsPath> {
        self.with_record(|r| group_path("user", r))
    }
}

impl Store<UserGroup> {
    /// Store over the top-level user group collection.
    pub fn user_groups(service: &Arc<WsClient>) -> Self {
        Self::user_groups_at(service, WsPath::new(["group", "user"]))
    }

    /// User group store scoped at an arbitrary listing URL.
    pub fn user_groups_at(service: &Arc<WsClient>, url: WsPath) -> Self {
        let make_service = Arc::clone(service);
        Store::bind(Arc::clone(service), url, move |record| {
            UserGroup::new(Arc::clone(&make_service), record)
        })
    }
}
