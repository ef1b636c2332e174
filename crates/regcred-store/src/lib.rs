//! # regcred-store
//!
//! Credential backends for regcred:
//! - Docker config.json document (credential helper settings and plaintext auths)
//! - Native credential helper programs (`docker-credential-*`)
//! - In-memory store
//! - Platform default helper detection

pub mod config;
pub mod detect;
mod file_store;
mod memory_store;
mod native_store;
mod provider;

pub use config::{docker_config_path, DockerConfig, DOCKER_CONFIG_DIR_ENV};
pub use detect::{detect_default_helper, find_executable};
pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use native_store::{NativeStore, HELPER_PROGRAM_PREFIX};
pub use provider::{new_store, new_store_from_docker, DockerBackends};
