#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};

use supply_chain_api::config::AppConfig;
use supply_chain_api::database::models::Role;
use supply_chain_api::services::NewAccount;
use supply_chain_api::state::AppState;

pub const PASSWORD: &str = "P4$$w0rd";

/// The router on a random local port over a fresh in-memory store.
///
/// Each test gets its own server: `#[tokio::test]` creates a runtime per test
/// and the server task lives on it.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    pub client: Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let state = AppState::in_memory(AppConfig::development());
        let app = supply_chain_api::app(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            state,
            client: Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str, body: &Value) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token).json(body)
    }

    pub fn put(&self, path: &str, token: &str, body: &Value) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token).json(body)
    }

    pub fn patch(&self, path: &str, token: &str, body: &Value) -> RequestBuilder {
        self.client.patch(self.url(path)).bearer_auth(token).json(body)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    /// Registers `email` with the shared password and returns its access token.
    pub async fn register_and_login(&self, email: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/user/register/"))
            .json(&json!({
                "email": email,
                "password": PASSWORD,
                "password_confirmation": PASSWORD
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
        self.login(email, PASSWORD).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/user/login/"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body = expect_status(res, StatusCode::OK).await?;
        body["data"]["access"]
            .as_str()
            .map(str::to_string)
            .context("login response without access token")
    }

    /// Creates an administrator directly in the store and logs it in.
    pub async fn admin_token(&self) -> Result<String> {
        let account = NewAccount {
            email: "admin@example.com".to_string(),
            password: PASSWORD.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            role: Role::Admin,
            is_active: true,
            is_staff: true,
            is_superuser: false,
        };
        self.state
            .users
            .create_account(account)
            .await
            .map_err(|e| anyhow::anyhow!("admin creation failed: {:?}", e))?;
        self.login("admin@example.com", PASSWORD).await
    }

    /// Creates a node through the API and returns the `data` object.
    pub async fn create_node(&self, token: &str, name: &str, supplier: Option<i64>) -> Result<Value> {
        let res = self.post("/supply/nodes/create/", token, &node_body(name, supplier)).send().await?;
        let body = expect_status(res, StatusCode::CREATED).await?;
        Ok(body["data"].clone())
    }

    pub async fn create_product(&self, token: &str, name: &str, owner: i64) -> Result<Value> {
        let res = self
            .post(
                "/supply/products/create/",
                token,
                &json!({
                    "name": name,
                    "model": format!("{}-1", name),
                    "release_date": "2024-03-01",
                    "owner": owner
                }),
            )
            .send()
            .await?;
        let body = expect_status(res, StatusCode::CREATED).await?;
        Ok(body["data"].clone())
    }
}

/// A complete node body with fields derived from `name` so they stay unique.
pub fn node_body(name: &str, supplier: Option<i64>) -> Value {
    let slug: String = name.to_lowercase().chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    let phone_suffix: u32 = slug.bytes().map(u32::from).sum();
    json!({
        "name": name,
        "email": format!("{}@example.com", slug),
        "phone": format!("+7900{}{:05}", slug.len(), phone_suffix),
        "country": "Russia",
        "city": "Moscow",
        "street": "Tverskaya",
        "building_number": "1",
        "supplier": supplier
    })
}

/// Asserts the status and returns the parsed JSON body.
pub async fn expect_status(res: Response, expected: StatusCode) -> Result<Value> {
    let status = res.status();
    let body: Value = res.json().await.unwrap_or(Value::Null);
    anyhow::ensure!(status == expected, "expected {}, got {}: {}", expected, status, body);
    Ok(body)
}

pub fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().unwrap_or_default()
}
