//! # Vault tools CLI
//!
//! Runs a single Vault operation with AppRole credentials taken from the
//! environment (`VAULT_ADDR`, `VAULT_NAMESPACE`, `VAULT_ROLE_ID`,
//! `VAULT_SECRET_ID`, `VAULT_VERIFY_SSL`). A `.env` file in the working
//! directory overrides the process environment.
//!
//! - `vault-tools auth` - log in and verify the token
//! - `vault-tools read PATH` - print the keys of a secret
//! - `vault-tools write PATH JSON` - store a JSON object
//! - `vault-tools renew` - log in and renew the token
//! - `vault-tools demo` - authenticate, read and write sample secrets, renew

use anyhow::{Context, Result, bail};
use approle_vault_client::{VaultClient, VaultConfig};
use approle_vault_client::secrets::payload_from_value;
use clap::{Parser, Subcommand};
use rust_common::env::{self, ProcessEnv};
use rust_common::init_tracing;
use tracing::info;
use vault_tools::config::{self, SERVICE_NAME};
use vault_tools::tools::greetings_tool;

/// Vault AppRole tools
#[derive(Parser)]
#[command(name = "vault-tools")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); overrides `LOG_LEVEL`
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate with AppRole and verify the token
    Auth,

    /// Read a secret and list its keys
    Read {
        /// Secret path, e.g. `myapp/config`
        path: String,
    },

    /// Write a JSON object as a secret
    Write {
        /// Secret path
        path: String,
        /// Payload, e.g. `{"username":"app"}`
        json: String,
    },

    /// Authenticate, then renew the token
    Renew,

    /// Greet a user by name
    Greet {
        /// Name to greet
        name: String,
    },

    /// Authenticate, read and write sample secrets, then renew the token
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    env::load_dotenv();
    let cli = Cli::parse();

    let tracing_config =
        config::tracing_from(&ProcessEnv, cli.log_level.as_deref(), cli.json_logs)?;
    init_tracing(&tracing_config);

    if let Commands::Greet { name } = &cli.command {
        println!("{}", greetings_tool(name));
        return Ok(());
    }

    let config = VaultConfig::from_source(&ProcessEnv).context("Invalid Vault configuration")?;
    info!(service = SERVICE_NAME, addr = %config.addr, "Starting");

    let mut client = VaultClient::new(config).context("Failed to build Vault client")?;
    if !client.authenticate().await {
        bail!("Failed to authenticate with Vault");
    }
    println!("Successfully authenticated with Vault");

    match cli.command {
        Commands::Auth | Commands::Greet { .. } => {}
        Commands::Read { path } => read(&client, &path).await?,
        Commands::Write { path, json } => write(&client, &path, &json).await?,
        Commands::Renew => renew(&mut client).await?,
        Commands::Demo => demo(&mut client).await?,
    }

    Ok(())
}

async fn read(client: &VaultClient, path: &str) -> Result<()> {
    let secret = client
        .try_read_secret(path)
        .await
        .with_context(|| format!("No secret found at path: {path}"))?;

    // Keys only; values stay out of the terminal
    println!("Retrieved secret from {path}");
    println!("  Secret keys: {:?}", secret.keys().collect::<Vec<_>>());
    Ok(())
}

async fn write(client: &VaultClient, path: &str, json: &str) -> Result<()> {
    let value: serde_json::Value = serde_json::from_str(json).context("Payload is not JSON")?;
    let Some(payload) = payload_from_value(&value) else {
        bail!("Payload must be a JSON object");
    };

    let used = client
        .try_write_secret(path, &payload)
        .await
        .with_context(|| format!("Failed to write secret to {path}"))?;
    println!("Successfully wrote secret to {path} ({used})");
    Ok(())
}

async fn renew(client: &mut VaultClient) -> Result<()> {
    if !client.renew_token().await {
        bail!("Token renewal failed");
    }
    let ttl = client.session().token_info().map_or(0, |i| i.ttl);
    println!("Token renewed (ttl: {ttl}s)");
    Ok(())
}

async fn demo(client: &mut VaultClient) -> Result<()> {
    if let Err(e) = read(client, "myapp/config").await {
        println!("{e:#}");
    }
    write(
        client,
        "myapp/test",
        r#"{"username":"testuser","password":"testpass"}"#,
    )
    .await?;
    renew(client).await
}
