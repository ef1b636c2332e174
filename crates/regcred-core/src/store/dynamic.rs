//! Dynamic store
//!
//! Picks the backing store per server address from the configuration:
//! 1. Server-specific credential helper
//! 2. Globally configured credentials store
//! 3. Platform default helper detected when nothing was configured
//! 4. The plaintext store

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{BackendProvider, ConfigView, Store};
use crate::credential::Credential;
use crate::error::{Error, Result};

/// Options for a [`DynamicStore`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Allow saving credentials in plaintext when no native helper is available.
    ///
    /// When false (default), `put` fails with [`Error::PlaintextPutDisabled`]
    /// instead of writing to the plaintext store.
    pub allow_plaintext_put: bool,
}

/// The backend chosen for a server address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendSelection {
    /// Native credential helper with the given name
    Native(String),
    /// Plaintext store
    Plaintext { disable_put: bool },
}

/// Choose a backend from the configured and detected helper names.
///
/// Empty names count as unset.
pub fn select_backend(
    per_address: Option<&str>,
    global: Option<&str>,
    detected: Option<&str>,
    options: &StoreOptions,
) -> BackendSelection {
    [per_address, global, detected]
        .into_iter()
        .flatten()
        .find(|helper| !helper.is_empty())
        .map(|helper| BackendSelection::Native(helper.to_string()))
        .unwrap_or(BackendSelection::Plaintext {
            disable_put: !options.allow_plaintext_put,
        })
}

/// Store that resolves the backing store on every call
pub struct DynamicStore {
    config: Arc<dyn ConfigView>,
    options: StoreOptions,
    provider: Arc<dyn BackendProvider>,
    /// Platform default, only set when no auth was configured at construction
    detected_default: Option<String>,
    /// Set once the detected default has been written (or attempted)
    default_persisted: Mutex<bool>,
}

impl DynamicStore {
    /// Create a new dynamic store.
    ///
    /// `detect_default` runs at most once, and only when the configuration has
    /// no authentication configured.
    pub async fn new<F>(
        config: Arc<dyn ConfigView>,
        options: StoreOptions,
        provider: Arc<dyn BackendProvider>,
        detect_default: F,
    ) -> Self
    where
        F: FnOnce() -> Option<String>,
    {
        let detected_default = if config.is_auth_configured().await {
            None
        } else {
            detect_default().filter(|helper| !helper.is_empty())
        };

        match &detected_default {
            Some(helper) => debug!("Detected default credentials store: {}", helper),
            None => debug!("No default credentials store detected"),
        }

        Self {
            config,
            options,
            provider,
            detected_default,
            default_persisted: Mutex::new(false),
        }
    }

    /// Platform default detected at construction, if any
    pub fn detected_default(&self) -> Option<&str> {
        self.detected_default.as_deref()
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Resolve the backend for a server address without touching it
    pub async fn selection(&self, server_address: &str) -> BackendSelection {
        let per_address = self.config.credential_helper(server_address).await;
        let global = self.config.credentials_store().await;

        select_backend(
            per_address.as_deref(),
            global.as_deref(),
            self.detected_default.as_deref(),
            &self.options,
        )
    }

    async fn store_for(&self, server_address: &str) -> Arc<dyn Store> {
        match self.selection(server_address).await {
            BackendSelection::Native(helper) => {
                debug!("Using credential helper {} for {}", helper, server_address);
                self.provider.native_store(&helper)
            }
            BackendSelection::Plaintext { disable_put } => {
                debug!("Using plaintext store for {}", server_address);
                self.provider.plaintext_store(disable_put)
            }
        }
    }

    /// Write the detected default back to the configuration, once.
    ///
    /// The lock is held across the write so racing callers wait for it; only
    /// the caller that performed the write sees its error. The latch is set
    /// once the write completes, so a cancelled write is attempted again.
    async fn persist_detected_default(&self) -> Result<()> {
        let Some(helper) = self.detected_default.as_deref() else {
            return Ok(());
        };

        let mut persisted = self.default_persisted.lock().await;
        if *persisted {
            return Ok(());
        }

        info!("Saving detected credentials store {} to config", helper);
        let result = self.config.set_credentials_store(helper).await;
        *persisted = true;

        result.map_err(|e| {
            warn!("Failed to save credentials store {}: {}", helper, e);
            Error::SetCredentialsStore(Box::new(e))
        })
    }
}

#[async_trait]
impl Store for DynamicStore {
    async fn get(&self, server_address: &str) -> Result<Credential> {
        self.store_for(server_address)
            .await
            .get(server_address)
            .await
    }

    /// Save the credential, then persist the detected default on first success.
    ///
    /// Returns [`Error::PlaintextPutDisabled`] when no native helper is
    /// available and plaintext puts are not allowed.
    async fn put(&self, server_address: &str, cred: &Credential) -> Result<()> {
        self.store_for(server_address)
            .await
            .put(server_address, cred)
            .await?;

        self.persist_detected_default().await
    }

    async fn delete(&self, server_address: &str) -> Result<()> {
        self.store_for(server_address)
            .await
            .delete(server_address)
            .await
    }
}
