//! Store trait definitions

use std::sync::Arc;

use async_trait::async_trait;

use crate::credential::Credential;
use crate::error::Result;

/// Trait that every credentials store implements
#[async_trait]
pub trait Store: Send + Sync {
    /// Retrieve the credential for the given server address.
    ///
    /// Returns [`Credential::EMPTY`] when nothing is stored; an error means the
    /// backend itself failed.
    async fn get(&self, server_address: &str) -> Result<Credential>;

    /// Save a credential for the given server address
    async fn put(&self, server_address: &str, cred: &Credential) -> Result<()>;

    /// Remove the credential for the given server address
    async fn delete(&self, server_address: &str) -> Result<()>;
}

/// Read/write view of the configuration that drives store selection
#[async_trait]
pub trait ConfigView: Send + Sync {
    /// Helper configured for this specific server address, if any
    async fn credential_helper(&self, server_address: &str) -> Option<String>;

    /// Globally configured helper, if any
    async fn credentials_store(&self) -> Option<String>;

    /// Whether any helper or stored authentication is configured
    async fn is_auth_configured(&self) -> bool;

    /// Persist the global helper name
    async fn set_credentials_store(&self, name: &str) -> Result<()>;
}

/// Builds the concrete stores a [`DynamicStore`](super::DynamicStore) delegates to
pub trait BackendProvider: Send + Sync {
    /// Store backed by the native credential helper with the given name
    fn native_store(&self, helper: &str) -> Arc<dyn Store>;

    /// Plaintext store; `disable_put` makes every put fail
    fn plaintext_store(&self, disable_put: bool) -> Arc<dyn Store>;
}
