//! Error types for the data-cloud client.
//!
//! # Design
//! `parse_*` methods on `DataCloudClient` only ever report what the HTTP
//! response said: `NotFound` for 404, `HttpError` for any other non-2xx, or a
//! decode failure. The `Session` lifts those into the caller-facing kinds:
//! `Connection` for the connection test and `Fetch` for the remote client
//! operations. `Unauthorized` is raised before any request is built.

use std::fmt;

use thiserror::Error;

/// Remote client operation that produced a `Fetch` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetClient,
    ListClients,
    CreateClient,
    UpdateClient,
    DeleteClient,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::GetClient => "get client",
            Operation::ListClients => "list clients",
            Operation::CreateClient => "create client",
            Operation::UpdateClient => "update client",
            Operation::DeleteClient => "delete client",
        };
        f.write_str(name)
    }
}

/// Errors returned by `DataCloudClient` and `Session`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A remote operation was attempted before a successful connection test.
    #[error("data-cloud access not authorized: check the db_key and initialize the session")]
    Unauthorized,

    /// The connection test itself got a non-2xx response.
    #[error("connection failed: {status} {reason}")]
    Connection { status: u16, reason: String },

    /// A remote client operation got a non-2xx response.
    #[error("{operation} failed: {status} {reason}")]
    Fetch {
        operation: Operation,
        status: u16,
        reason: String,
    },

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The transport could not complete the round-trip at all.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// True when the remote service answered with a non-success status.
    ///
    /// Callers that prefer absent-result semantics for raising operations can
    /// use this to fold a failed list/update/delete into a miss.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            ApiError::Connection { .. }
                | ApiError::Fetch { .. }
                | ApiError::NotFound
                | ApiError::HttpError { .. }
        )
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Connection { status, .. }
            | ApiError::Fetch { status, .. }
            | ApiError::HttpError { status, .. } => Some(*status),
            ApiError::NotFound => Some(404),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_message_names_operation() {
        let err = ApiError::Fetch {
            operation: Operation::DeleteClient,
            status: 500,
            reason: "Internal Server Error".to_string(),
        };
        assert_eq!(err.to_string(), "delete client failed: 500 Internal Server Error");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn unauthorized_is_not_a_remote_failure() {
        assert!(!ApiError::Unauthorized.is_remote_failure());
        assert!(!ApiError::Transport("refused".to_string()).is_remote_failure());
        assert!(ApiError::NotFound.is_remote_failure());
        assert!(ApiError::Connection {
            status: 503,
            reason: String::new()
        }
        .is_remote_failure());
    }
}
