// Entity types mirrored from the directory service.
//
// Each module declares the wire record, the entity type, its static
// attribute registry, and the store constructors bound to its listing
// endpoints.

pub mod directory;
pub mod group;
pub mod host;
pub mod interface;
pub mod location;
pub mod nwaddr;
pub mod switch;
pub mod user;

pub use directory::{Directory, DirectoryRecord};
pub use group::{GroupRecord, HostGroup, UserGroup};
pub use host::{Host, HostRecord};
pub use interface::{HostInterface, InterfaceRecord};
pub use location::{Location, LocationRecord};
pub use nwaddr::{NwAddr, NwAddrRecord};
pub use switch::{Switch, SwitchPort, SwitchPortRecord, SwitchRecord};
pub use user::{User, UserRecord};

use serde_json::Value;

use crate::entity::JsonMap;

/// A UI monitor page path with percent-encoded query parameters.
pub(crate) fn monitor_query(page: &str, pairs: &[(&str, &str)]) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        query.append_pair(key, value);
    }
    format!("{page}?{}", query.finish())
}

/// An initial record carrying just a `name` field.
pub(crate) fn named_record(name: &str) -> JsonMap {
    let mut record = JsonMap::new();
    record.insert("name".to_owned(), Value::String(name.to_owned()));
    record
}
