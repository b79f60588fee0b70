// dirws-store: lazily-populated object/store layer over the directory
// web service.
//
// Entities wrap cached attribute groups fetched on demand through each
// type's static registry; stores list collections and wrap rows into
// entities. Read-mostly and demand-driven: no write path, no
// persistence, no cross-instance cache.

pub mod entity;
pub mod error;
pub mod model;
pub mod registry;
pub mod service;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use entity::{Attributes, Entity, EntityBase, EntityExt, JsonMap, load};
pub use error::StoreError;
pub use registry::{Registry, UpdateSpec};
pub use service::DirectoryService;
pub use store::{FetchQuery, SortKey, Store};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Directory, DirectoryRecord, GroupRecord, Host, HostGroup, HostInterface, HostRecord,
    InterfaceRecord, Location, LocationRecord, NwAddr, NwAddrRecord, Switch, SwitchPort,
    SwitchPortRecord, SwitchRecord, User, UserGroup, UserRecord,
};
