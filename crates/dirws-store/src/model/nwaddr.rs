// Network addresses.
//
// Address sub-collections come off the wire as bare arrays of IP
// strings; the store's unpack step normalizes each into an
// `{"ip_str": ...}` record before construction.

use std::sync::Arc;

use serde::Deserialize;

use dirws_api::{WsClient, WsPath};

use crate::entity::{Entity, EntityBase, EntityExt, JsonMap};
use crate::error::StoreError;
use crate::registry::{Registry, UpdateSpec, apply_object};
use crate::store::{Store, unpack_scalars};

/// Wire record for a network address.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NwAddrRecord {
    pub ip_str: Option<String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

pub struct NwAddr {
    base: EntityBase<NwAddrRecord>,
}

impl NwAddr {
    pub fn new(service: Arc<WsClient>, initial: JsonMap) -> Result<Arc<Self>, StoreError> {
        Ok(Arc::new(Self {
            base: EntityBase::new(service, initial)?,
        }))
    }

    pub fn ip_str(&self) -> Option<String> {
        self.with_record(|r| r.ip_str.clone())
    }
}

static NWADDR_REGISTRY: Registry<NwAddr> = Registry {
    update_types: &[(
        "info",
        UpdateSpec {
            path: info_path,
            apply: apply_object,
        },
    )],
    derived: &[],
};

fn info_path(addr: &NwAddr) -> Option<WsPath> {
    addr.canonical_path()
}

impl Entity for NwAddr {
    type Record = NwAddrRecord;

    fn base(&self) -> &EntityBase<NwAddrRecord> {
        &self.base
    }

    fn registry() -> &'static Registry<Self> {
        &NWADDR_REGISTRY
    }

    fn canonical_path(&self) -> Option<WsPath> {
        Some(WsPath::new(["nwaddr"]).join(self.ip_str()?))
    }
}

impl Store<NwAddr> {
    /// Address store scoped at a caller-supplied listing URL. There is
    /// no top-level address collection; the URL is mandatory.
    pub fn nw_addrs_at(service: &Arc<WsClient>, url: WsPath) -> Self {
        let make_service = Arc::clone(service);
        Store::bind(Arc::clone(service), url, move |record| {
            NwAddr::new(Arc::clone(&make_service), record)
        })
        .with_unpack(unpack_scalars)
    }
}
