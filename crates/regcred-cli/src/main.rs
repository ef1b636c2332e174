//! regcred CLI - look up, save and remove registry credentials
//!
//! Uses the same configuration file and credential helpers as the Docker CLI,
//! so credentials saved by either tool are visible to the other.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use regcred_core::{
    new_store_with_fallbacks, server_address_from_hostname, Credential, Store, StoreOptions,
};
use regcred_store::{docker_config_path, new_store, FileStore};

/// regcred - Registry credential store
#[derive(Parser, Debug)]
#[command(name = "regcred")]
#[command(version)]
#[command(about = "Look up, save and remove registry credentials using Docker-compatible stores")]
struct Args {
    /// Config file to use (default: $DOCKER_CONFIG/config.json or ~/.docker/config.json)
    #[arg(long, global = true, env = "REGCRED_CONFIG")]
    config: Option<PathBuf>,

    /// Allow saving credentials in plaintext when no credential helper is available
    #[arg(long, global = true, env = "REGCRED_ALLOW_PLAINTEXT_PUT")]
    allow_plaintext_put: bool,

    /// Extra config files to search on lookup (never written)
    #[arg(long = "fallback", global = true)]
    fallbacks: Vec<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the credential stored for a registry as JSON
    Get {
        /// Registry hostname (e.g. ghcr.io, docker.io)
        registry: String,
    },
    /// Save a credential for a registry, reading the secret from stdin
    Store {
        /// Registry hostname (e.g. ghcr.io, docker.io)
        registry: String,

        /// Username to save with --password-stdin
        #[arg(short, long, conflicts_with = "identity_token_stdin")]
        username: Option<String>,

        /// Read the password from stdin
        #[arg(
            long,
            conflicts_with = "identity_token_stdin",
            required_unless_present = "identity_token_stdin"
        )]
        password_stdin: bool,

        /// Read an identity token from stdin
        #[arg(long)]
        identity_token_stdin: bool,
    },
    /// Remove the credential saved for a registry
    Erase {
        /// Registry hostname (e.g. ghcr.io, docker.io)
        registry: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // stdout carries command output, so logs go to stderr
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let store = open_store(&args).await?;

    match args.command {
        Command::Get { registry } => {
            let server_address = server_address_from_hostname(&registry);
            let cred = store.get(server_address).await?;
            if cred.is_empty() {
                return Err(format!("No credentials found for {}", registry).into());
            }
            println!("{}", serde_json::to_string_pretty(&cred)?);
        }
        Command::Store {
            registry,
            username,
            password_stdin,
            identity_token_stdin,
        } => {
            let secret = read_secret_from_stdin().await?;
            let cred = if identity_token_stdin {
                Credential::identity_token(secret)
            } else if password_stdin {
                let username =
                    username.ok_or("--username is required with --password-stdin")?;
                Credential::basic(username, secret)
            } else {
                return Err("one of --password-stdin or --identity-token-stdin is required".into());
            };

            let server_address = server_address_from_hostname(&registry);
            store.put(server_address, &cred).await?;
            info!("Saved credentials for {}", registry);
        }
        Command::Erase { registry } => {
            let server_address = server_address_from_hostname(&registry);
            store.delete(server_address).await?;
            info!("Removed credentials for {}", registry);
        }
    }

    Ok(())
}

/// Build the primary store from the config file, with plaintext fallbacks
async fn open_store(args: &Args) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => docker_config_path()?,
    };
    debug!("Using config file {:?}", config_path);

    let options = StoreOptions {
        allow_plaintext_put: args.allow_plaintext_put,
    };
    let primary: Arc<dyn Store> = Arc::new(new_store(config_path, options).await?);

    let mut fallbacks: Vec<Arc<dyn Store>> = Vec::with_capacity(args.fallbacks.len());
    for path in &args.fallbacks {
        debug!("Adding fallback config file {:?}", path);
        fallbacks.push(Arc::new(FileStore::open(path).await?));
    }

    Ok(new_store_with_fallbacks(primary, fallbacks))
}

/// Read a secret from stdin, dropping the trailing newline
async fn read_secret_from_stdin() -> Result<String, Box<dyn std::error::Error>> {
    let mut secret = String::new();
    tokio::io::stdin().read_to_string(&mut secret).await?;

    let secret = secret.trim_end_matches(['\r', '\n']).to_string();
    if secret.is_empty() {
        return Err("no secret provided on stdin".into());
    }
    Ok(secret)
}
