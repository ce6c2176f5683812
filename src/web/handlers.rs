//! HTTP handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use sysinfo::System;
use tracing::{debug, error, warn};

use crate::backend::{BackendError, KvBackend};
use crate::store::Store;

/// Backend shared by the add/get handlers
pub type SharedBackend = Arc<dyn KvBackend>;

/// Request body for `/add`
#[derive(Debug, Deserialize)]
pub struct PutRequest {
    pub key: String,
    /// Any JSON value, stored re-serialized
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// System statistics response
#[derive(Debug, Serialize)]
pub struct SystemStats {
    /// Total system memory in MB
    pub total_memory_mb: f64,
    /// Used system memory in MB
    pub used_memory_mb: f64,
    /// Free system memory in MB
    pub free_memory_mb: f64,
    /// CPU usage percentage (0-100)
    pub cpu_usage: f64,
    /// Value log memory usage in MB
    pub db_memory_mb: f64,
    pub num_shards: usize,
    pub indexed_keys: usize,
    pub log_entries: usize,
    pub oldest_entry_age_secs: Option<u64>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Store a JSON value under a key
pub async fn put_handler(State(backend): State<SharedBackend>, body: Bytes) -> Response {
    let req: PutRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            warn!("Rejected malformed add request on {}: {}", backend.name(), e);
            debug!(
                "Malformed body (B64): {}",
                general_purpose::STANDARD.encode(&body)
            );
            return error_response(StatusCode::BAD_REQUEST, format!("invalid request body: {}", e));
        }
    };

    let value = match serde_json::to_vec(&req.value) {
        Ok(v) => v,
        Err(e) => {
            error!("Failed to re-encode value for '{}': {}", req.key, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to encode value");
        }
    };

    debug!("{} add '{}' ({} bytes)", backend.name(), req.key, value.len());

    match backend.set(&req.key, Bytes::from(value)).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(e) => {
            error!("{} add '{}' failed: {}", backend.name(), req.key, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Return the JSON value stored under a key
pub async fn get_handler(State(backend): State<SharedBackend>, Path(key): Path<String>) -> Response {
    get_value(backend, key).await
}

/// `GET /get/`: the wildcard route never matches an empty key
pub async fn get_empty_key_handler(State(backend): State<SharedBackend>) -> Response {
    get_value(backend, String::new()).await
}

async fn get_value(backend: SharedBackend, key: String) -> Response {
    debug!("{} get '{}'", backend.name(), key);

    match backend.get(&key).await {
        Ok(value) => ([(header::CONTENT_TYPE, "application/json")], value).into_response(),
        Err(BackendError::NotFound(key)) => {
            error_response(StatusCode::NOT_FOUND, format!("key not found: {}", key))
        }
        Err(e) => {
            error!("{} get '{}' failed: {}", backend.name(), key, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Get system and store statistics
pub async fn stats_handler(State(store): State<Arc<Store>>) -> impl IntoResponse {
    let mut sys = System::new_all();
    sys.refresh_all();

    let total_mem_bytes = sys.total_memory();
    let available_mem_bytes = sys.available_memory();
    let used_mem_bytes = total_mem_bytes.saturating_sub(available_mem_bytes);

    let store_stats = store.stats();

    let stats = SystemStats {
        total_memory_mb: total_mem_bytes as f64 / 1024.0 / 1024.0,
        used_memory_mb: used_mem_bytes as f64 / 1024.0 / 1024.0,
        free_memory_mb: available_mem_bytes as f64 / 1024.0 / 1024.0,
        cpu_usage: sys.global_cpu_usage() as f64,
        db_memory_mb: store_stats.used_memory_bytes as f64 / 1024.0 / 1024.0,
        num_shards: store_stats.num_shards,
        indexed_keys: store_stats.indexed_keys,
        log_entries: store_stats.log_entries,
        oldest_entry_age_secs: store_stats.oldest_entry_age_secs,
    };

    (StatusCode::OK, Json(stats))
}

/// Get detailed shard statistics
pub async fn shard_stats_handler(State(store): State<Arc<Store>>) -> impl IntoResponse {
    (StatusCode::OK, Json(store.shard_stats()))
}
