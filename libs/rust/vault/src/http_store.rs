//! Vault HTTP API implementation of [`SecretStore`].

use crate::{
    config::VaultConfig,
    error::{VaultError, VaultResult},
    secrets::{AuthResponse, ErrorResponse, MountsResponse, SecretPayload, TokenLookupResponse},
    store::{AuthInfo, KvVersion, MountInfo, SecretStore, TokenInfo},
};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use rust_common::build_http_client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

const TOKEN_HEADER: &str = "X-Vault-Token";
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";

/// Secret store speaking the Vault HTTP API.
#[derive(Debug, Clone)]
pub struct HttpSecretStore {
    addr: String,
    namespace: Option<String>,
    http: Client,
}

impl HttpSecretStore {
    /// Create a store for the endpoint described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &VaultConfig) -> VaultResult<Self> {
        let http = build_http_client(&config.http_config())?;
        Ok(Self {
            addr: config.addr.clone(),
            namespace: config.namespace.clone(),
            http,
        })
    }

    /// Server address this store talks to.
    #[must_use]
    pub fn addr(&self) -> &str {
        &self.addr
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.addr, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, token: Option<&SecretString>) -> RequestBuilder {
        let mut request = self.http.request(method, self.url(path));
        if let Some(namespace) = &self.namespace {
            request = request.header(NAMESPACE_HEADER, namespace);
        }
        if let Some(token) = token {
            request = request.header(TOKEN_HEADER, token.expose_secret());
        }
        request
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> VaultResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| VaultError::transport(e.to_string()))?;

        let status = response.status();
        debug!(path, status = status.as_u16(), "Vault response");
        if status.is_success() {
            return Ok(response);
        }

        let message = error_message(response).await;
        Err(match status {
            StatusCode::BAD_REQUEST => VaultError::InvalidRequest(message),
            StatusCode::FORBIDDEN => VaultError::PermissionDenied(format!("{path}: {message}")),
            StatusCode::NOT_FOUND => VaultError::not_found(path),
            _ => VaultError::store(status.as_u16(), message),
        })
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder, path: &str) -> VaultResult<T> {
        let response = self.send(request, path).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| VaultError::transport(e.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn read_body(&self, token: &SecretString, path: &str) -> VaultResult<Value> {
        let response = self.send(self.request(Method::GET, path, Some(token)), path).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Err(VaultError::not_found(path));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| VaultError::transport(e.to_string()))?;
        if bytes.is_empty() {
            return Err(VaultError::not_found(path));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_body(
        &self,
        method: Method,
        token: &SecretString,
        path: &str,
        body: &Value,
    ) -> VaultResult<()> {
        self.send(self.request(method, path, Some(token)).json(body), path)
            .await
            .map(|_| ())
    }
}

async fn error_message(response: Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let parsed: ErrorResponse = serde_json::from_str(&text).unwrap_or_default();
    if parsed.errors.is_empty() {
        if text.trim().is_empty() {
            status.to_string()
        } else {
            text
        }
    } else {
        parsed.errors.join("; ")
    }
}

fn kv_path(version: KvVersion, mount: &str, path: &str) -> String {
    let mount = mount.trim_matches('/');
    match version {
        KvVersion::V1 => format!("{mount}/{path}"),
        KvVersion::V2 => format!("{mount}/data/{path}"),
    }
}

impl From<AuthResponse> for AuthInfo {
    fn from(response: AuthResponse) -> Self {
        let auth = response.auth;
        Self {
            client_token: SecretString::from(auth.client_token),
            accessor: auth.accessor.filter(|a| !a.is_empty()),
            policies: auth.policies,
            lease_duration: auth.lease_duration,
            renewable: auth.renewable,
        }
    }
}

#[async_trait]
impl SecretStore for HttpSecretStore {
    #[instrument(skip(self, secret_id), fields(addr = %self.addr))]
    async fn approle_login(&self, role_id: &str, secret_id: &SecretString) -> VaultResult<AuthInfo> {
        let path = "auth/approle/login";
        let body = serde_json::json!({
            "role_id": role_id,
            "secret_id": secret_id.expose_secret(),
        });

        let response: AuthResponse = self
            .json(self.request(Method::POST, path, None).json(&body), path)
            .await
            .map_err(|e| match e {
                VaultError::InvalidRequest(msg) | VaultError::PermissionDenied(msg) => {
                    VaultError::auth_failed(msg)
                }
                other => other,
            })?;

        if response.auth.client_token.is_empty() {
            return Err(VaultError::auth_failed("login returned an empty client token"));
        }
        Ok(response.into())
    }

    async fn lookup_self(&self, token: &SecretString) -> VaultResult<TokenInfo> {
        let path = "auth/token/lookup-self";
        let response: TokenLookupResponse =
            self.json(self.request(Method::GET, path, Some(token)), path).await?;

        let data = response.data;
        Ok(TokenInfo {
            policies: data.policies,
            ttl: data.ttl,
            renewable: data.renewable,
            display_name: data.display_name,
        })
    }

    async fn renew_self(&self, token: &SecretString) -> VaultResult<AuthInfo> {
        let path = "auth/token/renew-self";
        let response: AuthResponse = self
            .json(
                self.request(Method::POST, path, Some(token))
                    .json(&serde_json::json!({})),
                path,
            )
            .await?;
        Ok(response.into())
    }

    async fn kv_read(
        &self,
        token: &SecretString,
        version: KvVersion,
        mount: &str,
        path: &str,
    ) -> VaultResult<Value> {
        self.read_body(token, &kv_path(version, mount, path)).await
    }

    async fn kv_write(
        &self,
        token: &SecretString,
        version: KvVersion,
        mount: &str,
        path: &str,
        payload: &SecretPayload,
    ) -> VaultResult<()> {
        let body = match version {
            KvVersion::V1 => serde_json::to_value(payload)?,
            KvVersion::V2 => serde_json::json!({ "data": payload }),
        };
        self.write_body(Method::POST, token, &kv_path(version, mount, path), &body)
            .await
    }

    async fn raw_read(&self, token: &SecretString, path: &str) -> VaultResult<Value> {
        self.read_body(token, path).await
    }

    async fn raw_write(
        &self,
        token: &SecretString,
        path: &str,
        payload: &SecretPayload,
    ) -> VaultResult<()> {
        let body = serde_json::to_value(payload)?;
        self.write_body(Method::PUT, token, path, &body).await
    }

    async fn list_mounts(&self, token: &SecretString) -> VaultResult<Vec<MountInfo>> {
        let path = "sys/mounts";
        let response: MountsResponse =
            self.json(self.request(Method::GET, path, Some(token)), path).await?;

        Ok(response
            .data
            .into_iter()
            .map(|(path, entry)| MountInfo {
                path,
                engine_type: entry.engine_type,
                version: entry.options.and_then(|mut o| o.remove("version")),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::AppRoleCredentials;

    #[test]
    fn test_kv_paths() {
        assert_eq!(kv_path(KvVersion::V2, "secret", "app/config"), "secret/data/app/config");
        assert_eq!(kv_path(KvVersion::V1, "kv/", "app/config"), "kv/app/config");
    }

    #[test]
    fn test_url_building() {
        let config = VaultConfig::new("http://vault:8200/", AppRoleCredentials::new("r1", "s1"));
        let store = HttpSecretStore::new(&config).unwrap();
        assert_eq!(store.addr(), "http://vault:8200");
        assert_eq!(store.url("/sys/mounts"), "http://vault:8200/v1/sys/mounts");
    }
}
