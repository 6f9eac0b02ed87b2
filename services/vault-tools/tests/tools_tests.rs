//! Tool adapters against a mock Vault.

use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use vault_tools::tools::{AUTHENTICATED, VaultTools};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "hvs.tool-token";

fn tools() -> VaultTools<BTreeMap<String, String>> {
    VaultTools::with_defaults(BTreeMap::new())
}

fn connection(server: &MockServer, secret_id: &str) -> HashMap<String, String> {
    let uri = server.uri();
    [
        ("role_id", "r1"),
        ("secret_id", secret_id),
        ("vault_addr", uri.as_str()),
        ("namespace", "admin"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/auth/approle/login"))
        .and(body_json(json!({"role_id": "r1", "secret_id": "s1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "auth": {
                "client_token": TOKEN,
                "policies": ["default", "app"],
                "lease_duration": 3600,
                "renewable": true
            }
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/approle/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"errors": ["invalid secret id"]})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .and(header("X-Vault-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"policies": ["default", "app"], "ttl": 3600, "renewable": true}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn authenticate_tool_reports_success() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let out = tools().authenticate_tool(&connection(&server, "s1")).await;
    assert_eq!(out, AUTHENTICATED);
}

#[tokio::test]
async fn authenticate_tool_reports_rejection() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let out = tools().authenticate_tool(&connection(&server, "wrong")).await;
    assert_eq!(out, "Error: Failed to authenticate to Vault with AppRole.");
}

#[tokio::test]
async fn message_tool_never_echoes_the_token() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let out = tools().message_tool(&connection(&server, "s1")).await;
    assert!(!out.contains(TOKEN));
    assert_eq!(out, format!("{AUTHENTICATED} (policies: default, app)"));
}

#[tokio::test]
async fn missing_secret_id_contacts_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut conn = connection(&server, "s1");
    conn.remove("secret_id");

    let out = tools().message_tool(&conn).await;
    assert_eq!(out, "Error: role_id or secret_id not found in connections.");
}

#[tokio::test]
async fn read_secret_tool_returns_json() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/kv/data/myapp/config"))
        .and(header("X-Vault-Namespace", "admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"data": {"username": "app", "port": 5432}, "metadata": {"version": 1}}
        })))
        .mount(&server)
        .await;

    let out = tools()
        .read_secret_tool(&connection(&server, "s1"), "myapp/config")
        .await;
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed, json!({"username": "app", "port": "5432"}));
}

#[tokio::test]
async fn read_secret_tool_reports_missing_path() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let out = tools()
        .read_secret_tool(&connection(&server, "s1"), "nowhere")
        .await;
    assert_eq!(out, "Error: No secret found at path: nowhere");
}

#[tokio::test]
async fn write_secret_tool_reports_candidate_used() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/kv/data/myapp/test"))
        .and(body_json(json!({"data": {"username": "testuser"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"version": 1}})))
        .expect(1)
        .mount(&server)
        .await;

    let out = tools()
        .write_secret_tool(
            &connection(&server, "s1"),
            "myapp/test",
            r#"{"username": "testuser"}"#,
        )
        .await;
    assert_eq!(out, "Secret written to myapp/test (kv-v2@kv)");
}

#[tokio::test]
async fn renew_token_tool_reports_ttl() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/token/renew-self"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "auth": {"client_token": TOKEN, "lease_duration": 7200, "renewable": true}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let out = tools().renew_token_tool(&connection(&server, "s1")).await;
    assert_eq!(out, "Token renewed (ttl: 7200s)");
}

#[tokio::test]
async fn renew_token_tool_reports_failure() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/token/renew-self"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"errors": ["permission denied"]})))
        .mount(&server)
        .await;

    let out = tools().renew_token_tool(&connection(&server, "s1")).await;
    assert_eq!(out, "Error: Token renewal failed.");
}
