//! In-memory credential store

use std::collections::HashMap;

use async_trait::async_trait;
use regcred_core::{Credential, Result, Store};
use tokio::sync::RwLock;

/// Store that keeps credentials in process memory only
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Credential>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, server_address: &str) -> Result<Credential> {
        Ok(self
            .entries
            .read()
            .await
            .get(server_address)
            .cloned()
            .unwrap_or_default())
    }

    async fn put(&self, server_address: &str, cred: &Credential) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(server_address.to_string(), cred.clone());
        Ok(())
    }

    async fn delete(&self, server_address: &str) -> Result<()> {
        self.entries.write().await.remove(server_address);
        Ok(())
    }
}
