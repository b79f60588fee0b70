// Store-facing error taxonomy.
//
// UI code sees kind + message, never raw transport errors. The
// `From<dirws_api::Error>` impl classifies transport failures into
// `ServiceUnavailable` (the service or an intermediary is down) vs
// `ServiceError` (the service rejected or mangled the request).
//
// Clonable on purpose: coalesced loads hand the same failure to every
// waiter.

use thiserror::Error;

/// Unified error type for the object/store layer.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Missing loader or derived-attribute registration. A programming
    /// defect, never recoverable at runtime.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Required construction parameter missing or malformed.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Operation attempted on a null/placeholder entity.
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    /// The service is unreachable or temporarily down.
    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    /// The service answered but the request failed.
    #[error("Service error: {message}")]
    ServiceError {
        /// HTTP status, when the failure carried one.
        status: Option<u16>,
        message: String,
    },
}

impl StoreError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    pub(crate) fn service(message: impl Into<String>) -> Self {
        Self::ServiceError {
            status: None,
            message: message.into(),
        }
    }

    /// The HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServiceError { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<dirws_api::Error> for StoreError {
    fn from(err: dirws_api::Error) -> Self {
        if err.is_unavailable() {
            return Self::ServiceUnavailable {
                message: err.to_string(),
            };
        }
        Self::ServiceError {
            status: err.status(),
            message: err.to_string(),
        }
    }
}
