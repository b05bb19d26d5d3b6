//! Authenticated session over the data-cloud API with a local mirror of the
//! client collection.
//!
//! # Design
//! `Session` owns three things: the stateless `DataCloudClient`, a
//! `Transport`, and the mutable state (authorization flag, `LocalMirror`,
//! diagnostic options). Every remote operation takes `&mut self`, so a single
//! session can only run one operation at a time and the mirror is updated
//! right after the awaited response, with no other await in between. Callers
//! that share a session across tasks wrap it in their own lock.
//!
//! Failure policy per operation:
//! - `fetch_client` / `create_client`: a non-2xx answer is a soft miss
//!   (`Ok(None)`); `fetch_client_strict` / `create_client_strict` raise
//!   `ApiError::Fetch` instead.
//! - `fetch_all_clients` / `update_client` / `delete_client`: a non-2xx answer
//!   raises `ApiError::Fetch` and leaves the mirror untouched.
//! - Every operation raises `ApiError::Unauthorized` before building a request
//!   when the connection test has not passed.

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::client::DataCloudClient;
use crate::error::{ApiError, Operation};
use crate::http::{HttpRequest, HttpResponse};
use crate::mirror::LocalMirror;
use crate::transport::Transport;
use crate::types::{Client, ClientUpdates, ConnectionStatus};

/// Remote endpoint descriptor. Fixed for the lifetime of a `Session`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    pub host: String,
    pub db_key: String,
}

impl SessionConfig {
    pub fn new(host: impl Into<String>, db_key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            db_key: db_key.into(),
        }
    }

    /// Read `DATACLOUD_HOST` and `DATACLOUD_DB_KEY`.
    pub fn from_env() -> Result<Self, std::env::VarError> {
        Ok(Self {
            host: std::env::var("DATACLOUD_HOST")?,
            db_key: std::env::var("DATACLOUD_DB_KEY")?,
        })
    }
}

/// Diagnostic toggles applied by `Session::init`. They never change data flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitOptions {
    /// Log the init outcome, soft misses and mirror changes.
    pub debug: bool,
    /// Echo every raw response body.
    pub show_request: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            debug: true,
            show_request: false,
        }
    }
}

pub struct Session<T: Transport> {
    client: DataCloudClient,
    transport: T,
    authorized: bool,
    mirror: LocalMirror,
    options: InitOptions,
}

impl<T: Transport> Session<T> {
    /// Build an unauthorized session with an empty mirror. Nothing is sent
    /// until `init` or `test_connection`.
    pub fn new(config: &SessionConfig, transport: T) -> Self {
        Self {
            client: DataCloudClient::new(&config.host, &config.db_key),
            transport,
            authorized: false,
            mirror: LocalMirror::new(),
            options: InitOptions {
                debug: false,
                show_request: false,
            },
        }
    }

    /// Apply `options`, run the connection test and, when it reports a
    /// connection, load the full mirror.
    pub async fn init(&mut self, options: InitOptions) -> Result<ConnectionStatus, ApiError> {
        self.options = options;
        let status = self.test_connection().await?;
        if self.options.debug {
            warn!(
                was_connected = status.was_connected,
                message = %status.message,
                "data-cloud session initialized"
            );
        }
        if status.was_connected {
            self.fetch_all_clients().await?;
        }
        Ok(status)
    }

    /// Check the `db_key` against the service and store the outcome as the
    /// authorization flag. On a transport or status failure the flag keeps its
    /// previous value.
    pub async fn test_connection(&mut self) -> Result<ConnectionStatus, ApiError> {
        let response = self.round_trip(self.client.build_test_connection()).await?;
        if !response.is_success() {
            return Err(ApiError::Connection {
                status: response.status,
                reason: response.reason().to_string(),
            });
        }
        let status = self.client.parse_test_connection(response)?;
        self.authorized = status.was_connected;
        Ok(status)
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    pub fn options(&self) -> InitOptions {
        self.options
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Current mirror contents. The borrow ends before the next mutation.
    pub fn all_clients(&self) -> &[Client] {
        self.mirror.as_slice()
    }

    /// Owned copy of the mirror for callers that need to keep it.
    pub fn snapshot(&self) -> Vec<Client> {
        self.mirror.snapshot()
    }

    /// Look a record up in the mirror without touching the network.
    pub fn get_client(&self, jid: &str) -> Option<&Client> {
        self.mirror.get(jid)
    }

    /// Fetch one record from the service. A non-2xx answer yields `Ok(None)`.
    /// The mirror is not touched.
    pub async fn fetch_client(&mut self, jid: &str) -> Result<Option<Client>, ApiError> {
        let result = self.fetch_client_strict(jid).await;
        self.soften(result)
    }

    /// Like `fetch_client`, but a non-2xx answer raises `ApiError::Fetch`.
    pub async fn fetch_client_strict(&mut self, jid: &str) -> Result<Client, ApiError> {
        self.ensure_authorized()?;
        let response = self.round_trip(self.client.build_get_client(jid)).await?;
        expect_success(Operation::GetClient, &response)?;
        self.client.parse_get_client(response)
    }

    /// Replace the mirror with the full remote collection.
    pub async fn fetch_all_clients(&mut self) -> Result<&[Client], ApiError> {
        self.ensure_authorized()?;
        let response = self.round_trip(self.client.build_list_clients()).await?;
        expect_success(Operation::ListClients, &response)?;
        let clients = self.client.parse_list_clients(response)?;
        self.mirror.replace_all(clients);
        if self.options.debug {
            debug!(count = self.mirror.len(), "mirror reloaded");
        }
        Ok(self.mirror.as_slice())
    }

    /// Reload the mirror from the service. External writes made since the last
    /// load only show up after calling this.
    pub async fn refresh(&mut self) -> Result<&[Client], ApiError> {
        self.fetch_all_clients().await
    }

    /// Create a record and add the server's copy to the mirror. A non-2xx
    /// answer yields `Ok(None)` and leaves the mirror untouched.
    pub async fn create_client(&mut self, jid: &str, username: Option<&str>) -> Result<Option<Client>, ApiError> {
        let result = self.create_client_strict(jid, username).await;
        self.soften(result)
    }

    /// Like `create_client`, but a non-2xx answer raises `ApiError::Fetch`.
    ///
    /// If the mirror already holds the jid, the returned record replaces that
    /// entry in place rather than being appended a second time.
    pub async fn create_client_strict(&mut self, jid: &str, username: Option<&str>) -> Result<Client, ApiError> {
        self.ensure_authorized()?;
        let request = self.client.build_create_client(jid, username)?;
        let response = self.round_trip(request).await?;
        expect_success(Operation::CreateClient, &response)?;
        let created = self.client.parse_create_client(response)?;
        let replaced = self.mirror.upsert(created.clone());
        if replaced && self.options.debug {
            warn!(jid = %created.jid, "created client was already mirrored, entry replaced");
        }
        Ok(created)
    }

    /// Send a partial update and store the server-confirmed record in the
    /// mirror slot of the requested jid, inserting it if that jid was not
    /// mirrored yet.
    pub async fn update_client(&mut self, jid: &str, updates: &ClientUpdates) -> Result<Client, ApiError> {
        self.ensure_authorized()?;
        let request = self.client.build_update_client(jid, updates)?;
        let response = self.round_trip(request).await?;
        expect_success(Operation::UpdateClient, &response)?;
        let updated = self.client.parse_update_client(response)?;
        let replaced = self.mirror.replace_or_insert(jid, updated.clone());
        if self.options.debug {
            debug!(jid, replaced, "mirror updated");
        }
        Ok(updated)
    }

    /// Delete a record remotely, then drop every mirrored record with its jid.
    pub async fn delete_client(&mut self, jid: &str) -> Result<(), ApiError> {
        self.ensure_authorized()?;
        let response = self.round_trip(self.client.build_delete_client(jid)).await?;
        expect_success(Operation::DeleteClient, &response)?;
        self.client.parse_delete_client(response)?;
        let removed = self.mirror.remove(jid);
        if self.options.debug {
            debug!(jid, removed, "mirror entries removed");
        }
        Ok(())
    }

    fn ensure_authorized(&self) -> Result<(), ApiError> {
        if self.authorized {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method.as_str();
        let response = self.transport.execute(request).await?;
        if self.options.show_request {
            info!(method, status = response.status, body = %response.body, "data-cloud response");
        }
        Ok(response)
    }

    fn soften<V>(&self, result: Result<V, ApiError>) -> Result<Option<V>, ApiError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(ApiError::Fetch {
                operation,
                status,
                reason,
            }) => {
                if self.options.debug {
                    debug!(%operation, status, %reason, "remote call failed, returning none");
                }
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

fn expect_success(operation: Operation, response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Fetch {
        operation,
        status: response.status,
        reason: response.reason().to_string(),
    })
}
