//! # regcred-core
//!
//! Credential store resolution for registry clients:
//! - Per-address selection between credential helpers and a plaintext store
//! - One-time persistence of a detected platform default helper
//! - Fallback chains that search several stores but write to one

pub mod credential;
pub mod error;
pub mod registry;
pub mod store;

pub use credential::Credential;
pub use error::{Error, Result};
pub use registry::{server_address_from_hostname, DOCKER_HUB_SERVER_ADDRESS};
pub use store::{
    new_store_with_fallbacks, select_backend, BackendProvider, BackendSelection, ConfigView,
    DynamicStore, Store, StoreOptions, StoreWithFallbacks,
};
