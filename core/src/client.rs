//! Stateless HTTP request builder and response parser for the data-cloud API.
//!
//! # Design
//! `DataCloudClient` holds only the endpoint descriptor (base URL and
//! `db_key`) and carries no mutable state between calls. Each remote call is
//! split into a `build_*` method that produces an `HttpRequest` and a
//! `parse_*` method that consumes an `HttpResponse`. The `Session` drives the
//! round-trip through a `Transport` and owns all mutable state.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Client, ClientUpdates, ConnectionStatus, CreateClient, UpdateClient, UpdateResponse};

/// Path prefix the data-cloud service mounts its API under.
pub const API_PREFIX: &str = "/api/data-cloud";

/// Synchronous, stateless client for the data-cloud API.
#[derive(Debug, Clone)]
pub struct DataCloudClient {
    base_url: String,
    db_key: String,
}

impl DataCloudClient {
    pub fn new(host: &str, db_key: &str) -> Self {
        Self {
            base_url: format!("{}{API_PREFIX}", host.trim_end_matches('/')),
            db_key: db_key.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_test_connection(&self) -> HttpRequest {
        get(format!(
            "{}/connection?db_key={}",
            self.base_url,
            urlencoding::encode(&self.db_key)
        ))
    }

    pub fn build_list_clients(&self) -> HttpRequest {
        get(format!(
            "{}/clients?db_key={}",
            self.base_url,
            urlencoding::encode(&self.db_key)
        ))
    }

    pub fn build_get_client(&self, jid: &str) -> HttpRequest {
        get(self.jid_query(jid))
    }

    pub fn build_create_client(&self, jid: &str, username: Option<&str>) -> Result<HttpRequest, ApiError> {
        let input = CreateClient {
            jid: jid.to_string(),
            db_key: self.db_key.clone(),
            username: username.map(str::to_string),
        };
        json_request(HttpMethod::Post, format!("{}/clients", self.base_url), &input)
    }

    pub fn build_update_client(&self, jid: &str, updates: &ClientUpdates) -> Result<HttpRequest, ApiError> {
        let input = UpdateClient {
            jid: jid.to_string(),
            db_key: self.db_key.clone(),
            updates: updates.clone(),
        };
        json_request(HttpMethod::Put, format!("{}/clients", self.base_url), &input)
    }

    pub fn build_delete_client(&self, jid: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.jid_query(jid),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_test_connection(&self, response: HttpResponse) -> Result<ConnectionStatus, ApiError> {
        check_status(&response)?;
        decode(&response)
    }

    pub fn parse_list_clients(&self, response: HttpResponse) -> Result<Vec<Client>, ApiError> {
        check_status(&response)?;
        decode(&response)
    }

    pub fn parse_get_client(&self, response: HttpResponse) -> Result<Client, ApiError> {
        check_status(&response)?;
        decode(&response)
    }

    pub fn parse_create_client(&self, response: HttpResponse) -> Result<Client, ApiError> {
        check_status(&response)?;
        decode(&response)
    }

    /// The update endpoint wraps the record in `{ "client": ... }`.
    pub fn parse_update_client(&self, response: HttpResponse) -> Result<Client, ApiError> {
        check_status(&response)?;
        decode::<UpdateResponse>(&response).map(|envelope| envelope.client)
    }

    /// Delete carries no payload worth decoding; only the status matters.
    pub fn parse_delete_client(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn jid_query(&self, jid: &str) -> String {
        format!(
            "{}/clients?db_key={}&jid={}",
            self.base_url,
            urlencoding::encode(&self.db_key),
            urlencoding::encode(jid)
        )
    }
}

fn get(path: String) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        path,
        headers: Vec::new(),
        body: None,
    }
}

fn json_request<T: Serialize>(method: HttpMethod, path: String, input: &T) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    Ok(HttpRequest {
        method,
        path,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
