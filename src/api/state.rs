//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::query::QueryExecutor;
use crate::storage::StorageEngine;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
pub struct AppState {
    /// Storage engine: latest register and history
    pub storage: Arc<StorageEngine>,
    /// Range queries and exports
    pub executor: Arc<QueryExecutor>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Device sessions currently connected
    pub active_sessions: AtomicUsize,
}

impl AppState {
    pub fn new(storage: Arc<StorageEngine>, executor: Arc<QueryExecutor>, config: ApiConfig) -> Self {
        Self {
            storage,
            executor,
            config: Arc::new(config),
            start_time: Instant::now(),
            active_sessions: AtomicUsize::new(0),
        }
    }

    /// Build the state straight from a storage engine
    pub fn from_storage(storage: Arc<StorageEngine>, config: ApiConfig) -> Self {
        let executor = Arc::new(QueryExecutor::new(Arc::clone(&storage)));
        Self::new(storage, executor, config)
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn session_count(&self) -> usize {
        self.active_sessions.load(Ordering::SeqCst)
    }
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
