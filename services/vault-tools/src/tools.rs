//! Tool adapters.
//!
//! Every tool builds a fresh client from a key-value connection, performs a
//! single operation and reports the outcome as text. Failures are rendered
//! as `"Error: ..."` strings rather than returned, since the hosting
//! runtime only relays text back to the agent.

use crate::error::ToolError;
use approle_vault_client::secrets::payload_from_value;
use approle_vault_client::{VaultClient, VaultConfig};
use rust_common::env::{ConfigSource, ProcessEnv};
use tracing::{info, instrument, warn};

/// Confirmation returned by a successful login.
pub const AUTHENTICATED: &str = "Authenticated with Vault";

/// Greet a user by name.
#[must_use]
pub fn greetings_tool(name: &str) -> String {
    format!("Hello, {name}!")
}

/// Vault tools bound to a set of fallback settings.
///
/// The connection handed to each tool supplies `role_id` and `secret_id`
/// and may carry `vault_addr`, `namespace` and `verify_ssl`; anything it
/// lacks is taken from the `VAULT_*` keys of the defaults.
#[derive(Debug, Clone, Default)]
pub struct VaultTools<D = ProcessEnv> {
    defaults: D,
}

impl VaultTools<ProcessEnv> {
    /// Tools falling back to the process environment.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            defaults: ProcessEnv,
        }
    }
}

impl<D: ConfigSource> VaultTools<D> {
    /// Tools falling back to an explicit source.
    pub const fn with_defaults(defaults: D) -> Self {
        Self { defaults }
    }

    /// Log in and report the outcome.
    pub async fn authenticate_tool<C: ConfigSource + Clone>(&self, connection: &C) -> String {
        render(self.login(connection).await.map(|_| AUTHENTICATED.to_string()))
    }

    /// Log in and confirm the session without revealing the token.
    ///
    /// Reports the policies attached to the verified token.
    pub async fn message_tool<C: ConfigSource + Clone>(&self, connection: &C) -> String {
        render(self.login(connection).await.map(|client| {
            let policies = client
                .session()
                .token_info()
                .map(|info| info.policies.join(", "))
                .unwrap_or_default();
            format!("{AUTHENTICATED} (policies: {policies})")
        }))
    }

    /// Log in, then renew the issued token.
    pub async fn renew_token_tool<C: ConfigSource + Clone>(&self, connection: &C) -> String {
        render(self.renew(connection).await)
    }

    /// Read a secret and return it as JSON text.
    pub async fn read_secret_tool<C: ConfigSource + Clone>(
        &self,
        connection: &C,
        path: &str,
    ) -> String {
        render(self.read(connection, path).await)
    }

    /// Write a JSON object as a secret.
    pub async fn write_secret_tool<C: ConfigSource + Clone>(
        &self,
        connection: &C,
        path: &str,
        json_payload: &str,
    ) -> String {
        render(self.write(connection, path, json_payload).await)
    }

    #[instrument(skip_all)]
    async fn login<C: ConfigSource + Clone>(&self, connection: &C) -> Result<VaultClient, ToolError> {
        let config = VaultConfig::from_connection(connection, &self.defaults)?;
        let mut client =
            VaultClient::new(config).map_err(|e| ToolError::Init(e.to_string()))?;

        if client.authenticate().await {
            Ok(client)
        } else {
            Err(ToolError::AuthenticationFailed)
        }
    }

    async fn renew<C: ConfigSource + Clone>(&self, connection: &C) -> Result<String, ToolError> {
        let mut client = self.login(connection).await?;
        if !client.renew_token().await {
            return Err(ToolError::RenewalFailed);
        }

        let ttl = client.session().token_info().map_or(0, |info| info.ttl);
        Ok(format!("Token renewed (ttl: {ttl}s)"))
    }

    #[instrument(skip(self, connection))]
    async fn read<C: ConfigSource + Clone>(
        &self,
        connection: &C,
        path: &str,
    ) -> Result<String, ToolError> {
        let client = self.login(connection).await?;
        let secret = client.try_read_secret(path).await?;
        info!(keys = ?secret.keys().collect::<Vec<_>>(), "Retrieved secret");

        serde_json::to_string(&secret).map_err(|e| ToolError::Vault(e.to_string()))
    }

    #[instrument(skip(self, connection, json_payload))]
    async fn write<C: ConfigSource + Clone>(
        &self,
        connection: &C,
        path: &str,
        json_payload: &str,
    ) -> Result<String, ToolError> {
        let value: serde_json::Value = serde_json::from_str(json_payload)
            .map_err(|e| ToolError::InvalidPayload(e.to_string()))?;
        let payload = payload_from_value(&value)
            .ok_or_else(|| ToolError::InvalidPayload("expected a JSON object".to_string()))?;

        let client = self.login(connection).await?;
        let used = client.try_write_secret(path, &payload).await?;
        Ok(format!("Secret written to {path} ({used})"))
    }
}

fn render(result: Result<String, ToolError>) -> String {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "Tool call failed");
        e.to_tool_output()
    })
}
