//! Store composed of a primary store and fallback stores

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::Store;
use crate::credential::Credential;
use crate::error::Result;

/// Store backed by a primary store and zero or more fallbacks.
///
/// - `get` searches the primary, then each fallback, and stops at the first
///   credential or the first error.
/// - `put` and `delete` only touch the primary.
pub struct StoreWithFallbacks {
    /// Primary first, then fallbacks in search order. Never empty.
    stores: Vec<Arc<dyn Store>>,
}

/// Compose a primary store with fallback stores.
///
/// With no fallbacks the primary is returned as is.
pub fn new_store_with_fallbacks(
    primary: Arc<dyn Store>,
    fallbacks: Vec<Arc<dyn Store>>,
) -> Arc<dyn Store> {
    if fallbacks.is_empty() {
        return primary;
    }

    let mut stores = Vec::with_capacity(fallbacks.len() + 1);
    stores.push(primary);
    stores.extend(fallbacks);
    Arc::new(StoreWithFallbacks { stores })
}

impl StoreWithFallbacks {
    fn primary(&self) -> &Arc<dyn Store> {
        &self.stores[0]
    }
}

#[async_trait]
impl Store for StoreWithFallbacks {
    async fn get(&self, server_address: &str) -> Result<Credential> {
        for (index, store) in self.stores.iter().enumerate() {
            let cred = store.get(server_address).await?;
            if !cred.is_empty() {
                debug!("Found credential for {} in store #{}", server_address, index);
                return Ok(cred);
            }
        }

        Ok(Credential::EMPTY)
    }

    async fn put(&self, server_address: &str, cred: &Credential) -> Result<()> {
        self.primary().put(server_address, cred).await
    }

    async fn delete(&self, server_address: &str) -> Result<()> {
        self.primary().delete(server_address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::store::testing::{CallLog, FakeStore};

    fn chain(log: &CallLog, stores: Vec<FakeStore>) -> Arc<dyn Store> {
        let mut stores: Vec<Arc<dyn Store>> = stores
            .into_iter()
            .map(|s| Arc::new(s.logging_to(log)) as Arc<dyn Store>)
            .collect();
        let primary = stores.remove(0);
        new_store_with_fallbacks(primary, stores)
    }

    #[tokio::test]
    async fn test_get_returns_first_match() {
        let log = CallLog::default();
        let store = chain(
            &log,
            vec![
                FakeStore::empty("b1"),
                FakeStore::found("b2", Credential::basic("x", "x-secret")),
                FakeStore::found("b3", Credential::basic("y", "y-secret")),
            ],
        );

        let cred = store.get("registry.example.com").await.unwrap();

        assert_eq!(cred, Credential::basic("x", "x-secret"));
        assert_eq!(
            log.calls(),
            vec![
                "b1.get(registry.example.com)",
                "b2.get(registry.example.com)"
            ]
        );
    }

    #[tokio::test]
    async fn test_get_stops_at_first_error() {
        let log = CallLog::default();
        let store = chain(
            &log,
            vec![
                FakeStore::failing("b1"),
                FakeStore::found("b2", Credential::basic("x", "x-secret")),
            ],
        );

        let err = store.get("registry.example.com").await.unwrap_err();

        assert!(matches!(err, Error::StorageError(_)));
        assert_eq!(log.calls(), vec!["b1.get(registry.example.com)"]);
    }

    #[tokio::test]
    async fn test_get_error_after_empty_masks_later_stores() {
        let log = CallLog::default();
        let store = chain(
            &log,
            vec![
                FakeStore::empty("b1"),
                FakeStore::failing("b2"),
                FakeStore::found("b3", Credential::basic("y", "y-secret")),
            ],
        );

        store.get("registry.example.com").await.unwrap_err();
        assert_eq!(log.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_get_not_found_anywhere() {
        let log = CallLog::default();
        let store = chain(
            &log,
            vec![FakeStore::empty("b1"), FakeStore::empty("b2")],
        );

        let cred = store.get("registry.example.com").await.unwrap();

        assert!(cred.is_empty());
        assert_eq!(log.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_put_and_delete_target_primary_only() {
        let log = CallLog::default();
        let store = chain(
            &log,
            vec![
                FakeStore::empty("b1"),
                FakeStore::empty("b2"),
                FakeStore::empty("b3"),
            ],
        );

        store
            .put("registry.example.com", &Credential::basic("u", "p"))
            .await
            .unwrap();
        store.delete("registry.example.com").await.unwrap();

        assert_eq!(
            log.calls(),
            vec![
                "b1.put(registry.example.com)",
                "b1.delete(registry.example.com)"
            ]
        );
    }

    #[tokio::test]
    async fn test_primary_put_error_is_returned() {
        let log = CallLog::default();
        let store = chain(
            &log,
            vec![FakeStore::empty("b1").put_fails(), FakeStore::empty("b2")],
        );

        let err = store
            .put("registry.example.com", &Credential::basic("u", "p"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::StorageError(_)));
        assert_eq!(log.calls(), vec!["b1.put(registry.example.com)"]);
    }

    #[tokio::test]
    async fn test_no_fallbacks_returns_primary() {
        let primary: Arc<dyn Store> = Arc::new(FakeStore::failing("b1"));

        let store = new_store_with_fallbacks(primary.clone(), Vec::new());

        assert!(Arc::ptr_eq(&store, &primary));
        let err = store.get("registry.example.com").await.unwrap_err();
        assert_eq!(err.to_string(), "Storage error: b1 unavailable");
    }
}
