//! Credential stores
//!
//! This module provides the store abstractions and the two composite stores:
//! 1. Dynamic store (per-address backend resolution)
//! 2. Store with fallbacks (search many, write one)

mod traits;
mod dynamic;
mod fallback;

#[cfg(test)]
pub(crate) mod testing;

pub use traits::{BackendProvider, ConfigView, Store};
pub use dynamic::{select_backend, BackendSelection, DynamicStore, StoreOptions};
pub use fallback::{new_store_with_fallbacks, StoreWithFallbacks};
