use std::sync::Arc;

use anyhow::Result;
use fernet::Fernet;
use serde_json::{json, Value};

use estate_manager_api::auth::TokenService;
use estate_manager_api::config::SecurityConfig;
use estate_manager_api::store::{MemoryStore, Store};
use estate_manager_api::{routes, AppState};

pub struct TestApp {
    pub base_url: String,
    pub state: AppState,
    pub security: SecurityConfig,
}

/// Serve the router in-process over a seeded in-memory store, bound to an
/// ephemeral port. Every test gets an isolated instance.
pub async fn spawn_app() -> Result<TestApp> {
    spawn_app_with_store(Arc::new(MemoryStore::seeded().await)).await
}

/// Same harness over an arbitrary store, for exercising persistence
/// failure paths.
pub async fn spawn_app_with_store(store: Arc<dyn Store>) -> Result<TestApp> {
    let security = SecurityConfig {
        cryptographic_key: Fernet::generate_key(),
        jwt_key: "integration-test-signing-key".to_string(),
        token_ttl_days: 7,
    };
    let tokens = TokenService::new(&security)?;
    let state = AppState::new(store, tokens);

    let app = routes(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });

    Ok(TestApp {
        base_url,
        state,
        security,
    })
}

impl TestApp {
    /// Register a user through the public endpoint.
    pub async fn register(&self, client: &reqwest::Client, email: &str, name: &str) -> Result<()> {
        let res = client
            .post(format!("{}/api/v1/users", self.base_url))
            .json(&json!({
                "email": email,
                "name": name,
                "password": "ABC123!@#",
                "phone_number": format!("+1555{}", name.len()),
            }))
            .send()
            .await?;
        anyhow::ensure!(
            res.status() == reqwest::StatusCode::CREATED,
            "registration failed: {}",
            res.text().await?
        );
        Ok(())
    }

    /// Sign in and return the issued token.
    pub async fn signin(&self, client: &reqwest::Client, email: &str) -> Result<String> {
        let res = client
            .post(format!("{}/api/v1/signin", self.base_url))
            .json(&json!({ "email": email, "password": "ABC123!@#" }))
            .send()
            .await?;
        let body = res.json::<Value>().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("no token in signin response: {body}"))
    }

    /// Register + sign in, returning a usable token.
    pub async fn register_and_signin(
        &self,
        client: &reqwest::Client,
        email: &str,
        name: &str,
    ) -> Result<String> {
        self.register(client, email, name).await?;
        self.signin(client, email).await
    }

    /// Grant the `admin` role by patching the stored user, then re-issue the
    /// token so it carries the new role list.
    pub async fn promote_to_admin(&self, client: &reqwest::Client, email: &str) -> Result<String> {
        let users = self.state.store.get_all("user").await?;
        let user = users
            .into_iter()
            .find(|u| u.str_field("email") == email)
            .ok_or_else(|| anyhow::anyhow!("user {email} not found"))?;
        let mut patch = serde_json::Map::new();
        patch.insert("roles".to_string(), json!(["basic", "admin"]));
        self.state.store.update(&user, &patch).await?;
        self.signin(client, email).await
    }

    /// Token signed with the app's keys but already past its expiry.
    pub fn expired_token_for(&self, email: &str) -> Result<String> {
        let expired = TokenService::new(&SecurityConfig {
            token_ttl_days: -1,
            ..self.security.clone()
        })?;
        let identity = estate_manager_api::auth::Identity {
            id: 1,
            email: email.to_string(),
            name: "Expired".to_string(),
            roles: vec!["basic".to_string()],
        };
        Ok(expired.create_token(&identity)?)
    }
}
