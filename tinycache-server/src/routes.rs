use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tinycache_core::{truncate_key_for_log, Store, Value};

use crate::params::{decode, ApiError, DelParams, GetParams, KeysParams, SetParams};

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

/// Builds the HTTP API over `store`
pub fn router(store: Store) -> Router {
    Router::new()
        .route("/set", post(handle_set).fallback(method_not_allowed))
        .route("/get", post(handle_get).fallback(method_not_allowed))
        .route("/del", post(handle_del).fallback(method_not_allowed))
        .route("/keys", post(handle_keys).fallback(method_not_allowed))
        .with_state(store)
}

async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "Use POST method to access api")
}

/// POST /set {key, value, ttl}
async fn handle_set(State(store): State<Store>, body: Bytes) -> Result<Json<&'static str>, ApiError> {
    let cmd = decode::<SetParams>("SET", &body)?;
    tracing::debug!("SET {} (ttl: {:?})", truncate_key_for_log(&cmd.key), cmd.ttl);

    store.set(cmd.key, cmd.value, cmd.ttl);
    Ok(Json("OK"))
}

/// POST /get {key}; answers `null` for a missing or expired key
async fn handle_get(State(store): State<Store>, body: Bytes) -> Result<Json<Option<Value>>, ApiError> {
    let key = decode::<GetParams>("GET", &body)?;
    tracing::debug!("GET {}", truncate_key_for_log(&key));

    Ok(Json(store.get(&key).map(|value| Value::clone(&value))))
}

/// POST /del {keys}; answers the number of live keys removed
async fn handle_del(State(store): State<Store>, body: Bytes) -> Result<Json<usize>, ApiError> {
    let keys = decode::<DelParams>("DEL", &body)?;
    tracing::debug!("DEL {} key(s)", keys.len());

    Ok(Json(store.delete(&keys)))
}

/// POST /keys {pattern}
async fn handle_keys(State(store): State<Store>, body: Bytes) -> Result<Json<Vec<String>>, ApiError> {
    let pattern = decode::<KeysParams>("KEYS", &body)?;
    tracing::debug!("KEYS {}", truncate_key_for_log(&pattern));

    store
        .keys(&pattern)
        .map(Json)
        .map_err(|e| ApiError::new("KEYS", e.to_string()))
}
