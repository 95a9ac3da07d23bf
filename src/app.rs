//! Application facade
//!
//! Wires configuration into the log store, authentication service,
//! dispatcher, and reconciler consumed by the HTTP layer, and owns the
//! process-level counters reported by the health endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::auth::AuthService;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::reconcile::Reconciler;
use crate::store::{LogStore, StoreResult};

/// Shared application state.
pub struct App {
    pub config: Config,
    pub store: Arc<LogStore>,
    pub auth: Arc<AuthService>,
    pub dispatcher: Dispatcher,
    pub reconciler: Reconciler,
    started: Instant,
    operations: AtomicU64,
}

impl App {
    /// Build the application from configuration, opening (and if necessary
    /// creating) the data directory.
    pub fn from_config(config: Config) -> StoreResult<Self> {
        std::fs::create_dir_all(&config.storage.data_dir)?;

        let store = Arc::new(LogStore::open(&config.storage.data_dir)?);
        let auth = Arc::new(AuthService::open(
            &config.storage.data_dir,
            config.auth.token_ttl_secs,
        ));
        let dispatcher = Dispatcher::new(Arc::clone(&store));
        let reconciler = Reconciler::new(Arc::clone(&store));

        Ok(App {
            config,
            store,
            auth,
            dispatcher,
            reconciler,
            started: Instant::now(),
            operations: AtomicU64::new(0),
        })
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    pub fn record_operation(&self) {
        self.operations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_operations(&self) -> u64 {
        self.operations.load(Ordering::Relaxed)
    }
}
