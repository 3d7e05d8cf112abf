//! Store client
//!
//! Selects a driver from configuration and opens databases by name.
//! Only the in-memory driver ships with this crate; the HTTP transport
//! for a real CouchDB server is provided elsewhere.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use super::context::CallContext;
use super::errors::{StoreError, StoreResult};
use super::memory::MemoryStore;

/// Driver name of the bundled in-memory store
pub const MEMORY_DRIVER: &str = "memory";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server address handed to the driver (default: "http://localhost:5984/")
    #[serde(default = "default_host")]
    pub host: String,

    /// Driver name (default: "memory")
    #[serde(default = "default_driver")]
    pub driver: String,
}

fn default_host() -> String {
    "http://localhost:5984/".to_string()
}

fn default_driver() -> String {
    MEMORY_DRIVER.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            driver: default_driver(),
        }
    }
}

/// Handle to a document server
#[derive(Debug, Clone)]
pub struct Client {
    host: String,
    databases: Arc<RwLock<HashMap<String, MemoryStore>>>,
}

impl Client {
    /// Create a client for the configured driver
    pub fn new(ctx: &CallContext, config: &ClientConfig) -> StoreResult<Self> {
        ctx.check()?;
        if config.driver != MEMORY_DRIVER {
            return Err(StoreError::UnsupportedDriver(config.driver.clone()));
        }

        Ok(Self {
            host: config.host.clone(),
            databases: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Open a database, creating it on first use.
    ///
    /// Every call with the same name returns a handle to the same data.
    pub fn database(&self, ctx: &CallContext, name: &str) -> StoreResult<MemoryStore> {
        ctx.check()?;
        if name.is_empty() {
            return Err(StoreError::InvalidDatabaseName(name.to_string()));
        }

        let mut databases = self
            .databases
            .write()
            .map_err(|_| StoreError::Internal("client lock poisoned".to_string()))?;
        Ok(databases.entry(name.to_string()).or_default().clone())
    }
}
