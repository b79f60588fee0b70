// Directory instances: the configured backing directories principals
// live in (built-in, LDAP, ...).

use std::sync::Arc;

use serde::Deserialize;

use dirws_api::{WsClient, WsPath};

use crate::entity::{Entity, EntityBase, EntityExt, JsonMap};
use crate::error::StoreError;
use crate::registry::{Registry, UpdateSpec, apply_object};
use crate::store::{Store, unpack_with_search_order};

/// Wire record for a directory instance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryRecord {
    pub name: Option<String>,
    /// Original listing position, stamped by the store's unpack step.
    /// Reserved for stable tie-break ordering.
    pub search_order: Option<u64>,
    pub read_only: Option<bool>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

pub struct Directory {
    base: EntityBase<DirectoryRecord>,
}

impl Directory {
    pub fn new(service: Arc<WsClient>, initial: JsonMap) -> Result<Arc<Self>, StoreError> {
        Ok(Arc::new(Self {
            base: EntityBase::new(service, initial)?,
        }))
    }

    pub fn name(&self) -> Option<String> {
        self.with_record(|r| r.name.clone())
    }
}

static DIRECTORY_REGISTRY: Registry<Directory> = Registry {
    update_types: &[(
        "info",
        UpdateSpec {
            path: info_path,
            apply: apply_object,
        },
    )],
    derived: &[],
};

fn info_path(directory: &Directory) -> Option<WsPath> {
    directory.canonical_path()
}

impl Entity for Directory {
    type Record = DirectoryRecord;

    fn base(&self) -> &EntityBase<DirectoryRecord> {
        &self.base
    }

    fn registry() -> &'static Registry<Self> {
        &DIRECTORY_REGISTRY
    }

    fn canonical_path(&self) -> Option<WsPath> {
        Some(WsPath::new(["directory", "instance"]).join(self.name()?))
    }
}

impl Store<Directory> {
    /// Store over the configured directory instances.
    ///
    /// Each listed record is stamped with `search_order` before any
    /// sort or filter is applied.
    pub fn directories(service: &Arc<WsClient>) -> Self {
        let make_service = Arc::clone(service);
        Store::bind(
            Arc::clone(service),
            WsPath::new(["directory", "instance"]),
            move |record| Directory::new(Arc::clone(&make_service), record),
        )
        .with_unpack(unpack_with_search_order)
    }
}
