//! Docker config.json document
//!
//! Reads and writes the configuration file used by Docker and other container
//! tools (typically `~/.docker/config.json`). Keys this crate does not know
//! about are kept as they are when the file is rewritten.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine as _;
use directories::BaseDirs;
use regcred_core::{ConfigView, Credential, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

/// Environment variable overriding the Docker config directory
pub const DOCKER_CONFIG_DIR_ENV: &str = "DOCKER_CONFIG";

const DOCKER_CONFIG_DIR: &str = ".docker";
const DOCKER_CONFIG_FILE_NAME: &str = "config.json";

/// In-memory form of the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    auths: BTreeMap<String, AuthEntry>,
    #[serde(rename = "credsStore", default, skip_serializing_if = "String::is_empty")]
    creds_store: String,
    #[serde(rename = "credHelpers", default, skip_serializing_if = "BTreeMap::is_empty")]
    cred_helpers: BTreeMap<String, String>,
    #[serde(flatten)]
    other: Map<String, Value>,
}

/// Authentication entry under `auths`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AuthEntry {
    /// Base64-encoded "username:password"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    auth: String,
    #[serde(rename = "identitytoken", default, skip_serializing_if = "String::is_empty")]
    identity_token: String,
    #[serde(rename = "registrytoken", default, skip_serializing_if = "String::is_empty")]
    registry_token: String,
    /// Legacy plain username (alternative to auth field)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    username: String,
    /// Legacy plain password (alternative to auth field)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    password: String,
    #[serde(flatten)]
    other: Map<String, Value>,
}

impl AuthEntry {
    fn to_credential(&self) -> Result<Credential> {
        let cred = if !self.auth.is_empty() {
            let (username, password) = decode_auth(&self.auth)?;
            Credential::basic(username, password)
        } else {
            Credential::basic(self.username.as_str(), self.password.as_str())
        };

        Ok(cred
            .with_refresh_token(self.identity_token.as_str())
            .with_access_token(self.registry_token.as_str()))
    }

    /// Overwrite the credential fields, keeping any other keys of the entry
    fn set_credential(&mut self, cred: &Credential) {
        self.auth = if cred.username().is_empty() && cred.password().is_empty() {
            String::new()
        } else {
            encode_auth(cred.username(), cred.password())
        };
        self.identity_token = cred.refresh_token().to_string();
        self.registry_token = cred.access_token().to_string();
        self.username.clear();
        self.password.clear();
    }
}

/// Docker config file, shared by the plaintext store and store resolution
pub struct DockerConfig {
    path: PathBuf,
    document: RwLock<ConfigDocument>,
}

impl DockerConfig {
    /// Load the config file at `path`.
    ///
    /// A missing file yields an empty config; it is created on first write.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let document = if path.exists() {
            let contents = tokio::fs::read_to_string(&path).await?;
            let document = parse_document(&contents)?;
            debug!("Loaded config from {:?}", path);
            document
        } else {
            debug!("No config file at {:?}, using empty config", path);
            ConfigDocument::default()
        };

        Ok(Self {
            path,
            document: RwLock::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the plaintext credential stored for a server address.
    ///
    /// Entries saved by older tools under a URL such as
    /// `https://registry.example.com/` also match `registry.example.com`.
    pub async fn get_credential(&self, server_address: &str) -> Result<Credential> {
        let document = self.document.read().await;

        let entry = document.auths.get(server_address).or_else(|| {
            document
                .auths
                .iter()
                .find(|(address, _)| to_hostname(address) == server_address)
                .map(|(_, entry)| entry)
        });

        match entry {
            Some(entry) => entry.to_credential(),
            None => Ok(Credential::EMPTY),
        }
    }

    /// Store a plaintext credential for a server address and save the file
    pub async fn put_credential(&self, server_address: &str, cred: &Credential) -> Result<()> {
        let mut document = self.document.write().await;

        let mut updated = document.clone();
        updated
            .auths
            .entry(server_address.to_string())
            .or_default()
            .set_credential(cred);

        self.save(&updated).await?;
        *document = updated;

        debug!("Stored plaintext credential for {}", server_address);
        Ok(())
    }

    /// Remove the plaintext credential for a server address and save the file.
    ///
    /// Only the exact key is removed. Legacy URL keys such as
    /// `https://registry.example.com/v1/` still match in
    /// [`get_credential`](Self::get_credential) but must be deleted by their
    /// full key.
    pub async fn delete_credential(&self, server_address: &str) -> Result<()> {
        let mut document = self.document.write().await;

        if !document.auths.contains_key(server_address) {
            // nothing to delete, leave the file alone
            return Ok(());
        }

        let mut updated = document.clone();
        updated.auths.remove(server_address);

        self.save(&updated).await?;
        *document = updated;

        debug!("Deleted plaintext credential for {}", server_address);
        Ok(())
    }

    /// Write the document atomically using a temp file
    async fn save(&self, document: &ConfigDocument) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }

        let contents = serde_json::to_string_pretty(document)?;
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        tokio::fs::rename(&temp_path, &self.path).await?;

        debug!("Saved config to {:?}", self.path);
        Ok(())
    }
}

#[async_trait]
impl ConfigView for DockerConfig {
    async fn credential_helper(&self, server_address: &str) -> Option<String> {
        let document = self.document.read().await;
        document
            .cred_helpers
            .get(server_address)
            .filter(|helper| !helper.is_empty())
            .cloned()
    }

    async fn credentials_store(&self) -> Option<String> {
        let document = self.document.read().await;
        Some(document.creds_store.clone()).filter(|store| !store.is_empty())
    }

    async fn is_auth_configured(&self) -> bool {
        let document = self.document.read().await;
        !document.creds_store.is_empty()
            || !document.cred_helpers.is_empty()
            || !document.auths.is_empty()
    }

    async fn set_credentials_store(&self, name: &str) -> Result<()> {
        let mut document = self.document.write().await;

        let mut updated = document.clone();
        updated.creds_store = name.to_string();

        self.save(&updated).await?;
        *document = updated;
        Ok(())
    }
}

/// Path of the default Docker config file.
///
/// `$DOCKER_CONFIG/config.json` when the variable is set, otherwise
/// `$HOME/.docker/config.json`.
pub fn docker_config_path() -> Result<PathBuf> {
    let dir = match std::env::var_os(DOCKER_CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(DOCKER_CONFIG_DIR))
            .ok_or_else(|| {
                Error::StorageError("Could not determine user home directory".to_string())
            })?,
    };

    Ok(dir.join(DOCKER_CONFIG_FILE_NAME))
}

fn parse_document(contents: &str) -> Result<ConfigDocument> {
    if contents.trim().is_empty() {
        return Ok(ConfigDocument::default());
    }

    serde_json::from_str(contents).map_err(|e| Error::InvalidConfigFormat(e.to_string()))
}

/// Strip the scheme and path from a legacy server address
fn to_hostname(address: &str) -> &str {
    let address = address
        .strip_prefix("https://")
        .or_else(|| address.strip_prefix("http://"))
        .unwrap_or(address);

    address.split('/').next().unwrap_or(address)
}

fn encode_auth(username: &str, password: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", username, password))
}

/// Decode base64-encoded "username:password" auth string
fn decode_auth(auth: &str) -> Result<(String, String)> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(auth)
        .map_err(|e| Error::BadCredentialFormat(format!("auth is not valid base64: {}", e)))?;

    let decoded = String::from_utf8(decoded)
        .map_err(|_| Error::BadCredentialFormat("auth is not valid UTF-8".to_string()))?;

    match decoded.split_once(':') {
        Some((username, password)) => Ok((username.to_string(), password.to_string())),
        None => Err(Error::BadCredentialFormat(
            "auth is missing the ':' separator".to_string(),
        )),
    }
}
