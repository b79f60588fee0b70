// dirws-api: transport layer for the directory service's /ws.v1 web service.
//
// Wraps `reqwest` with directory-specific URL construction and response
// classification. The object/store layer (`dirws-store`) sits on top and
// never touches HTTP mechanics directly.

pub mod client;
pub mod error;
pub mod path;
pub mod transport;

pub use client::WsClient;
pub use error::Error;
pub use path::WsPath;
pub use transport::{TlsMode, TransportConfig};
