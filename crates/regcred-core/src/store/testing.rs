//! In-crate test doubles for stores and configuration

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BackendProvider, ConfigView, Store};
use crate::credential::Credential;
use crate::error::{Error, Result};

/// Shared record of store calls, in call order
#[derive(Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn record(&self, call: String) {
        self.0.lock().unwrap().push(call);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

enum FakeGet {
    Empty,
    Found(Credential),
    Fail,
}

pub(crate) struct FakeStore {
    name: String,
    log: CallLog,
    get: FakeGet,
    put_fails: bool,
    put_disabled: bool,
}

impl FakeStore {
    fn new(name: &str, get: FakeGet) -> Self {
        Self {
            name: name.to_string(),
            log: CallLog::default(),
            get,
            put_fails: false,
            put_disabled: false,
        }
    }

    pub(crate) fn empty(name: &str) -> Self {
        Self::new(name, FakeGet::Empty)
    }

    pub(crate) fn found(name: &str, cred: Credential) -> Self {
        Self::new(name, FakeGet::Found(cred))
    }

    pub(crate) fn failing(name: &str) -> Self {
        Self::new(name, FakeGet::Fail)
    }

    pub(crate) fn logging_to(mut self, log: &CallLog) -> Self {
        self.log = log.clone();
        self
    }

    pub(crate) fn put_fails(mut self) -> Self {
        self.put_fails = true;
        self
    }

    fn unavailable(&self) -> Error {
        Error::StorageError(format!("{} unavailable", self.name))
    }
}

#[async_trait]
impl Store for FakeStore {
    async fn get(&self, server_address: &str) -> Result<Credential> {
        self.log
            .record(format!("{}.get({})", self.name, server_address));
        match &self.get {
            FakeGet::Empty => Ok(Credential::EMPTY),
            FakeGet::Found(cred) => Ok(cred.clone()),
            FakeGet::Fail => Err(self.unavailable()),
        }
    }

    async fn put(&self, server_address: &str, _cred: &Credential) -> Result<()> {
        self.log
            .record(format!("{}.put({})", self.name, server_address));
        if self.put_disabled {
            return Err(Error::PlaintextPutDisabled);
        }
        if self.put_fails {
            return Err(self.unavailable());
        }
        Ok(())
    }

    async fn delete(&self, server_address: &str) -> Result<()> {
        self.log
            .record(format!("{}.delete({})", self.name, server_address));
        Ok(())
    }
}

/// Hands out fake stores that answer with their own name as username
#[derive(Default)]
pub(crate) struct FakeProvider {
    log: CallLog,
    put_fails: AtomicBool,
}

impl FakeProvider {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.log.calls()
    }

    pub(crate) fn set_put_fails(&self, fails: bool) {
        self.put_fails.store(fails, Ordering::SeqCst);
    }
}

impl BackendProvider for FakeProvider {
    fn native_store(&self, helper: &str) -> Arc<dyn Store> {
        let name = format!("native:{}", helper);
        let mut store =
            FakeStore::found(&name, Credential::basic(name.clone(), "secret")).logging_to(&self.log);
        store.put_fails = self.put_fails.load(Ordering::SeqCst);
        Arc::new(store)
    }

    fn plaintext_store(&self, disable_put: bool) -> Arc<dyn Store> {
        let mut store = FakeStore::empty("plaintext").logging_to(&self.log);
        store.put_disabled = disable_put;
        store.put_fails = self.put_fails.load(Ordering::SeqCst);
        Arc::new(store)
    }
}

#[derive(Default)]
pub(crate) struct FakeConfig {
    helpers: HashMap<String, String>,
    credentials_store: RwLock<Option<String>>,
    auth_configured: bool,
    fail_set: bool,
    set_calls: AtomicUsize,
}

impl FakeConfig {
    pub(crate) fn with_helper(mut self, server_address: &str, helper: &str) -> Self {
        self.helpers
            .insert(server_address.to_string(), helper.to_string());
        self
    }

    pub(crate) fn with_credentials_store(mut self, helper: &str) -> Self {
        self.credentials_store = RwLock::new(Some(helper.to_string()));
        self
    }

    pub(crate) fn with_auth_configured(mut self) -> Self {
        self.auth_configured = true;
        self
    }

    pub(crate) fn with_failing_set(mut self) -> Self {
        self.fail_set = true;
        self
    }

    pub(crate) fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    pub(crate) async fn persisted(&self) -> Option<String> {
        self.credentials_store.read().await.clone()
    }
}

#[async_trait]
impl ConfigView for FakeConfig {
    async fn credential_helper(&self, server_address: &str) -> Option<String> {
        self.helpers.get(server_address).cloned()
    }

    async fn credentials_store(&self) -> Option<String> {
        self.credentials_store.read().await.clone()
    }

    async fn is_auth_configured(&self) -> bool {
        self.auth_configured
            || !self.helpers.is_empty()
            || self.credentials_store.read().await.is_some()
    }

    async fn set_credentials_store(&self, name: &str) -> Result<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        // widen the window for racing callers
        tokio::time::sleep(Duration::from_millis(20)).await;
        if self.fail_set {
            return Err(Error::StorageError("config is read-only".to_string()));
        }
        *self.credentials_store.write().await = Some(name.to_string());
        Ok(())
    }
}
