//! Stores resolved from a Docker config file

use std::path::PathBuf;
use std::sync::Arc;

use regcred_core::{BackendProvider, DynamicStore, Result, Store, StoreOptions};
use tracing::info;

use crate::config::{docker_config_path, DockerConfig};
use crate::detect::detect_default_helper;
use crate::file_store::FileStore;
use crate::native_store::NativeStore;

/// Backends behind a Docker config file: native helpers and the file itself
pub struct DockerBackends {
    config: Arc<DockerConfig>,
}

impl DockerBackends {
    pub fn new(config: Arc<DockerConfig>) -> Self {
        Self { config }
    }
}

impl BackendProvider for DockerBackends {
    fn native_store(&self, helper: &str) -> Arc<dyn Store> {
        Arc::new(NativeStore::new(helper))
    }

    fn plaintext_store(&self, disable_put: bool) -> Arc<dyn Store> {
        Arc::new(FileStore::new(self.config.clone()).with_disable_put(disable_put))
    }
}

/// Create a store driven by the config file at `config_path`.
///
/// For every call the store picks, in order:
///  1. the server-specific credential helper (`credHelpers`)
///  2. the configured credentials store (`credsStore`)
///  3. the plaintext config file itself
///
/// If the file has no authentication configured at all, the platform default
/// helper (osxkeychain, wincred, pass or secretservice) is used when installed,
/// and is written to `credsStore` after the first successful put.
pub async fn new_store(
    config_path: impl Into<PathBuf>,
    options: StoreOptions,
) -> Result<DynamicStore> {
    let config = Arc::new(DockerConfig::load(config_path).await?);
    info!("Using credentials config {:?}", config.path());

    let provider = Arc::new(DockerBackends::new(config.clone()));
    Ok(DynamicStore::new(config, options, provider, detect_default_helper).await)
}

/// Create a store driven by the default Docker config file.
///
/// See [`docker_config_path`] for how the file is located.
pub async fn new_store_from_docker(options: StoreOptions) -> Result<DynamicStore> {
    new_store(docker_config_path()?, options).await
}
