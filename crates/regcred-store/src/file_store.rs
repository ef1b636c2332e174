//! Plaintext store backed by the `auths` section of the config file

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use regcred_core::{Credential, Error, Result, Store};
use tracing::{debug, warn};

use crate::config::DockerConfig;

/// Store that keeps credentials unencrypted in the config file
pub struct FileStore {
    config: Arc<DockerConfig>,
    /// Reject every put with [`Error::PlaintextPutDisabled`]
    disable_put: bool,
}

impl FileStore {
    /// Create a file store over an already loaded config
    pub fn new(config: Arc<DockerConfig>) -> Self {
        Self {
            config,
            disable_put: false,
        }
    }

    /// Load the config file at `path` and create a file store over it
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let config = DockerConfig::load(path).await?;
        Ok(Self::new(Arc::new(config)))
    }

    pub fn with_disable_put(mut self, disable_put: bool) -> Self {
        self.disable_put = disable_put;
        self
    }

    pub fn is_put_disabled(&self) -> bool {
        self.disable_put
    }
}

#[async_trait]
impl Store for FileStore {
    async fn get(&self, server_address: &str) -> Result<Credential> {
        self.config.get_credential(server_address).await
    }

    async fn put(&self, server_address: &str, cred: &Credential) -> Result<()> {
        if self.disable_put {
            warn!(
                "Refusing to save plaintext credential for {} (plaintext put disabled)",
                server_address
            );
            return Err(Error::PlaintextPutDisabled);
        }

        if cred.username().contains(':') {
            return Err(Error::BadCredentialFormat(
                "username cannot contain ':'".to_string(),
            ));
        }

        self.config.put_credential(server_address, cred).await?;
        debug!("Saved plaintext credential to {:?}", self.config.path());
        Ok(())
    }

    async fn delete(&self, server_address: &str) -> Result<()> {
        self.config.delete_credential(server_address).await
    }
}
