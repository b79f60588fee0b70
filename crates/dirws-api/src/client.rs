// Web service HTTP client.
//
// Wraps `reqwest::Client` with /ws.v1 URL construction and response
// classification. Every request is a stateless GET returning loosely
// typed JSON; the store layer owns unpacking and caching.

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::path::WsPath;
use crate::transport::TransportConfig;

/// Raw HTTP client for the directory service's `/ws.v1` endpoints.
///
/// Resolves [`WsPath`]s against the service base URL and returns the
/// response body as `serde_json::Value`. Non-success statuses become
/// [`Error::Status`] with the body text as the message.
pub struct WsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl WsClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the service root, e.g. `https://controller`; the
    /// `/ws.v1` prefix is supplied per request by [`WsPath`].
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Use this when a shared client (with a session cookie already in
    /// its jar) should be reused.
    pub fn from_reqwest(base_url: Url, http: reqwest::Client) -> Self {
        Self { http, base_url }
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Send a GET for the given path and parse the body as JSON.
    pub async fn get_json(&self, path: &WsPath) -> Result<Value, Error> {
        let url = path.resolve(&self.base_url)?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
