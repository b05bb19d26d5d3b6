use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub jid: String,
    pub is_premium: bool,
    #[serde(rename = "isWoner")]
    pub is_owner: bool,
    #[serde(rename = "isBaned")]
    pub is_banned: bool,
    pub level: Option<String>,
    pub xp: Option<i64>,
    pub money: Option<f64>,
}

#[derive(Deserialize)]
pub struct KeyQuery {
    pub db_key: String,
    pub jid: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateClient {
    pub jid: String,
    pub db_key: String,
    pub username: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClientUpdates {
    pub name: Option<String>,
    pub is_premium: Option<bool>,
    #[serde(rename = "isWoner")]
    pub is_owner: Option<bool>,
    #[serde(rename = "isBaned")]
    pub is_banned: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub level: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub xp: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub money: Option<Option<f64>>,
}

/// Keeps an explicit `null` apart from an absent key.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
pub struct UpdateClient {
    pub jid: String,
    pub db_key: String,
    #[serde(default)]
    pub updates: ClientUpdates,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub was_connected: bool,
    pub message: String,
}

#[derive(Default)]
pub struct Store {
    clients: Vec<Client>,
    next_id: i64,
}

#[derive(Clone)]
pub struct AppState {
    db_key: Arc<str>,
    store: Arc<RwLock<Store>>,
}

/// Router mounted under `/api/data-cloud` that accepts only `db_key`.
pub fn app(db_key: &str) -> Router {
    let state = AppState {
        db_key: Arc::from(db_key),
        store: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route("/api/data-cloud/connection", get(test_connection))
        .route(
            "/api/data-cloud/clients",
            get(get_clients)
                .post(create_client)
                .put(update_client)
                .delete(delete_client),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener, db_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(db_key)).await
}

fn authorize(state: &AppState, key: &str) -> Result<(), StatusCode> {
    if *state.db_key == *key {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

async fn test_connection(State(state): State<AppState>, Query(query): Query<KeyQuery>) -> Json<ConnectionStatus> {
    let was_connected = authorize(&state, &query.db_key).is_ok();
    let message = if was_connected {
        "connected"
    } else {
        "invalid db_key"
    };
    Json(ConnectionStatus {
        was_connected,
        message: message.to_string(),
    })
}

async fn get_clients(State(state): State<AppState>, Query(query): Query<KeyQuery>) -> Result<Response, StatusCode> {
    authorize(&state, &query.db_key)?;
    let store = state.store.read().await;
    match query.jid {
        Some(jid) => store
            .clients
            .iter()
            .find(|c| c.jid == jid)
            .cloned()
            .map(|c| Json(c).into_response())
            .ok_or(StatusCode::NOT_FOUND),
        None => Ok(Json(store.clients.clone()).into_response()),
    }
}

async fn create_client(
    State(state): State<AppState>,
    Json(input): Json<CreateClient>,
) -> Result<(StatusCode, Json<Client>), StatusCode> {
    authorize(&state, &input.db_key)?;
    let mut store = state.store.write().await;
    if store.clients.iter().any(|c| c.jid == input.jid) {
        return Err(StatusCode::CONFLICT);
    }
    store.next_id += 1;
    let client = Client {
        id: store.next_id,
        created_at: Utc::now(),
        name: input.username.unwrap_or_else(|| input.jid.clone()),
        jid: input.jid,
        is_premium: false,
        is_owner: false,
        is_banned: false,
        level: None,
        xp: None,
        money: None,
    };
    debug!(jid = %client.jid, id = client.id, "client created");
    store.clients.push(client.clone());
    Ok((StatusCode::CREATED, Json(client)))
}

async fn update_client(
    State(state): State<AppState>,
    Json(input): Json<UpdateClient>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    authorize(&state, &input.db_key)?;
    let mut store = state.store.write().await;
    let client = store
        .clients
        .iter_mut()
        .find(|c| c.jid == input.jid)
        .ok_or(StatusCode::NOT_FOUND)?;
    let updates = input.updates;
    if let Some(name) = updates.name {
        client.name = name;
    }
    if let Some(is_premium) = updates.is_premium {
        client.is_premium = is_premium;
    }
    if let Some(is_owner) = updates.is_owner {
        client.is_owner = is_owner;
    }
    if let Some(is_banned) = updates.is_banned {
        client.is_banned = is_banned;
    }
    if let Some(level) = updates.level {
        client.level = level;
    }
    if let Some(xp) = updates.xp {
        client.xp = xp;
    }
    if let Some(money) = updates.money {
        client.money = money;
    }
    Ok(Json(serde_json::json!({ "client": client })))
}

async fn delete_client(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    authorize(&state, &query.db_key)?;
    let jid = query.jid.ok_or(StatusCode::BAD_REQUEST)?;
    let mut store = state.store.write().await;
    let before = store.clients.len();
    store.clients.retain(|c| c.jid != jid);
    if store.clients.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    debug!(jid = %jid, "client deleted");
    Ok(Json(serde_json::json!({ "deleted": true })))
}
