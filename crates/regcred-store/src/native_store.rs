//! Native credential helper store
//!
//! Talks to `docker-credential-<helper>` programs (osxkeychain, wincred, pass,
//! secretservice, ...) using the Docker credential helper protocol: the action
//! is the first argument, the request is written to stdin and the response is
//! read from stdout.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use regcred_core::{Credential, Error, Result, Store};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Prefix of credential helper program names
pub const HELPER_PROGRAM_PREFIX: &str = "docker-credential-";

/// Username helpers use to mark an identity token
const TOKEN_USERNAME: &str = "<token>";

/// Message helpers print when nothing is stored for an address
const NOT_FOUND_MESSAGE: &str = "credentials not found in native keychain";

/// Credential as exchanged with a helper
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HelperCredential {
    #[serde(rename = "ServerURL", default)]
    server_url: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    secret: String,
}

/// Store backed by a native credential helper program
#[derive(Debug, Clone)]
pub struct NativeStore {
    helper: String,
    program: PathBuf,
}

impl NativeStore {
    /// Create a store for the helper with the given name, looked up on `PATH`
    pub fn new(helper: &str) -> Self {
        Self {
            helper: helper.to_string(),
            program: PathBuf::from(format!("{}{}", HELPER_PROGRAM_PREFIX, helper)),
        }
    }

    /// Create a store that runs a specific helper program
    pub fn with_program(helper: &str, program: impl Into<PathBuf>) -> Self {
        Self {
            helper: helper.to_string(),
            program: program.into(),
        }
    }

    pub fn helper(&self) -> &str {
        &self.helper
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// List the server addresses the helper holds credentials for, with their usernames
    pub async fn list(&self) -> Result<HashMap<String, String>> {
        let output = self.execute("list", b"").await?;
        Ok(serde_json::from_slice(&output)?)
    }

    /// Run the helper with an action and stdin payload, returning its stdout
    #[instrument(skip(self, input), fields(helper = %self.helper))]
    async fn execute(&self, action: &str, input: &[u8]) -> Result<Vec<u8>> {
        debug!("Running credential helper");

        let mut child = Command::new(&self.program)
            .arg(action)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Error::HelperNotFound {
                    helper: self.helper.clone(),
                    message: format!("{}: {}", self.program.display(), e),
                },
                _ => Error::IoError(e),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input).await?;
            // dropping stdin closes the pipe so the helper sees EOF
        }

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stdout.trim() {
                "" => stderr.trim().to_string(),
                out => out.to_string(),
            };
            let message = if message.is_empty() {
                format!("exited with {}", output.status)
            } else {
                message
            };
            return Err(Error::helper(&self.helper, message));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl Store for NativeStore {
    async fn get(&self, server_address: &str) -> Result<Credential> {
        let output = match self.execute("get", server_address.as_bytes()).await {
            Ok(output) => output,
            Err(Error::Helper { message, .. }) if message == NOT_FOUND_MESSAGE => {
                debug!("No credential for {} in {}", server_address, self.helper);
                return Ok(Credential::EMPTY);
            }
            Err(e) => return Err(e),
        };

        let response: HelperCredential = serde_json::from_slice(&output)?;
        if response.username == TOKEN_USERNAME {
            Ok(Credential::identity_token(response.secret))
        } else {
            Ok(Credential::basic(response.username, response.secret))
        }
    }

    async fn put(&self, server_address: &str, cred: &Credential) -> Result<()> {
        let request = if cred.refresh_token().is_empty() {
            HelperCredential {
                server_url: server_address.to_string(),
                username: cred.username().to_string(),
                secret: cred.password().to_string(),
            }
        } else {
            HelperCredential {
                server_url: server_address.to_string(),
                username: TOKEN_USERNAME.to_string(),
                secret: cred.refresh_token().to_string(),
            }
        };

        let payload = serde_json::to_vec(&request)?;
        self.execute("store", &payload).await?;
        debug!("Stored credential for {} in {}", server_address, self.helper);
        Ok(())
    }

    async fn delete(&self, server_address: &str) -> Result<()> {
        self.execute("erase", server_address.as_bytes()).await?;
        debug!("Erased credential for {} from {}", server_address, self.helper);
        Ok(())
    }
}
