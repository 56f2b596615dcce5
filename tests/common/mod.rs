#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use client_portal_api::config::{AppConfig, StoreBackend};
use client_portal_api::store::{
    AuthResponse, AuthUser, Backend, Credentials, MemoryStore, Operation, Row, StoreClient, StoreError, StoreRequest,
};
use client_portal_api::{app, AppState};

pub const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/demo.yaml");

pub const ADMIN_EMAIL: &str = "admin@portal.test";
pub const ADMIN_PASSWORD: &str = "admin-demo-pass";
pub const CLIENT_EMAIL: &str = "client@portal.test";
pub const CLIENT_PASSWORD: &str = "client-demo-pass";

// Seeded profile rows (fixtures/demo.yaml)
pub const ALICE_ID: &str = "a0000000-0000-4000-8000-000000000001";
pub const ALICE_AUTH: &str = "b0000000-0000-4000-8000-000000000001";
pub const BOB_ID: &str = "a0000000-0000-4000-8000-000000000002";
pub const BOB_AUTH: &str = "b0000000-0000-4000-8000-000000000002";
pub const CAROL_ID: &str = "a0000000-0000-4000-8000-000000000003";
pub const DAVE_ID: &str = "a0000000-0000-4000-8000-000000000004";
pub const DAVE_AUTH: &str = "b0000000-0000-4000-8000-000000000004";

/// One in-process server per test, each test owning its runtime and its store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Seeded from the demo fixture, with both demo accounts configured
    pub async fn start() -> Result<Self> {
        let mut config = test_config();
        config.demo.admin = Credentials::new(ADMIN_EMAIL, ADMIN_PASSWORD);
        config.demo.client = Credentials::new(CLIENT_EMAIL, CLIENT_PASSWORD);
        Self::start_with(config).await
    }

    pub async fn start_with(config: AppConfig) -> Result<Self> {
        let store = Arc::new(MemoryStore::load_fixture(FIXTURE).context("failed to load demo fixture")?);
        Self::serve(config, store.clone(), store).await
    }

    /// Seeded like `start`, but every insert, update and delete is rejected
    /// by the store with [`STORE_FAILURE`]
    pub async fn start_with_failing_writes() -> Result<Self> {
        let mut config = test_config();
        config.demo.admin = Credentials::new(ADMIN_EMAIL, ADMIN_PASSWORD);
        config.demo.client = Credentials::new(CLIENT_EMAIL, CLIENT_PASSWORD);
        let store = Arc::new(MemoryStore::load_fixture(FIXTURE).context("failed to load demo fixture")?);
        let backend = Arc::new(FailingWrites { inner: store.clone() });
        Self::serve(config, backend, store).await
    }

    async fn serve(config: AppConfig, backend: Arc<dyn Backend>, store: Arc<MemoryStore>) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;

        let state = AppState::new(StoreClient::new(backend), config);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            port,
            base_url,
            store,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        let resp = self.client.get(self.url(path)).send().await?;
        read(resp).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<(StatusCode, Value)> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        read(resp).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<(StatusCode, Value)> {
        let resp = self.client.put(self.url(path)).json(body).send().await?;
        read(resp).await
    }

    pub async fn delete(&self, path: &str, body: &Value) -> Result<(StatusCode, Value)> {
        let resp = self.client.delete(self.url(path)).json(body).send().await?;
        read(resp).await
    }

    pub async fn options(&self, path: &str) -> Result<(StatusCode, Value)> {
        let resp = self.client.request(reqwest::Method::OPTIONS, self.url(path)).send().await?;
        read(resp).await
    }

    /// Profile row by primary key, straight from the store
    pub async fn user(&self, id: &str) -> Option<serde_json::Map<String, Value>> {
        self.store
            .rows("users")
            .await
            .into_iter()
            .find(|row| row.get("id").and_then(Value::as_str) == Some(id))
    }
}

pub const STORE_FAILURE: &str = "raw store text";

/// Reads and auth go to the memory store, writes fail the way a rejected
/// PostgREST request does
pub struct FailingWrites {
    inner: Arc<MemoryStore>,
}

#[async_trait]
impl Backend for FailingWrites {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn execute(&self, request: StoreRequest) -> Result<Vec<Row>, StoreError> {
        match request.operation {
            Operation::Select { .. } => self.inner.execute(request).await,
            _ => Err(StoreError::Api {
                status: 400,
                code: None,
                message: STORE_FAILURE.to_string(),
            }),
        }
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthResponse, StoreError> {
        self.inner.sign_in_with_password(credentials).await
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthUser, StoreError> {
        self.inner.sign_up(credentials).await
    }
}

/// Memory-backed configuration with no demo credentials
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.store.backend = StoreBackend::Memory;
    config.store.fixture_path = Some(FIXTURE.to_string());
    config
}

async fn read(resp: reqwest::Response) -> Result<(StatusCode, Value)> {
    let status = resp.status();
    let text = resp.text().await?;
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).with_context(|| format!("non-JSON body: {}", text))?
    };
    Ok((status, body))
}
