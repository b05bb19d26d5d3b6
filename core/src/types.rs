//! Domain DTOs for the data-cloud API.
//!
//! # Design
//! These types mirror the remote service's JSON schema but are defined
//! independently from the mock-server crate; integration tests catch schema
//! drift between the two. Field names follow the service's camelCase keys,
//! including its `isWoner` / `isBaned` spellings, which are exposed in Rust
//! under their intended names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single client record held by the remote service and the local mirror.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    /// External lookup key, unique within a mirror.
    pub jid: String,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(rename = "isWoner", default)]
    pub is_owner: bool,
    #[serde(rename = "isBaned", default)]
    pub is_banned: bool,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub xp: Option<i64>,
    #[serde(default)]
    pub money: Option<f64>,
}

/// Partial record for updates. Only the fields present are sent; omitted
/// fields remain unchanged on the server.
///
/// The nullable fields are tri-state: `None` leaves the value alone,
/// `Some(None)` sends `null` and clears it, `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
    #[serde(rename = "isWoner", skip_serializing_if = "Option::is_none")]
    pub is_owner: Option<bool>,
    #[serde(rename = "isBaned", skip_serializing_if = "Option::is_none")]
    pub is_banned: Option<bool>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub level: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub xp: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub money: Option<Option<f64>>,
}

/// A present key (even `null`) becomes `Some(..)`; an absent key falls back
/// to the field default of `None`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request payload for creating a new client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClient {
    pub jid: String,
    pub db_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Request payload for updating an existing client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateClient {
    pub jid: String,
    pub db_key: String,
    pub updates: ClientUpdates,
}

/// Envelope returned by the update endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub client: Client,
}

/// Outcome of the connection test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub was_connected: bool,
    /// Advisory text from the server; never interpreted.
    #[serde(default)]
    pub message: String,
}
