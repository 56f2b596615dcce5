//! Client for the hosted backend: table CRUD plus password auth.
//!
//! Routes only see [`StoreClient`]. The actual transport sits behind the
//! [`Backend`] trait so the gateway can run against Supabase or against the
//! in-process [`memory::MemoryStore`].

pub mod auth;
pub mod filter;
pub mod memory;
pub mod postgrest;
pub mod query_builder;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};

pub use auth::{AuthClient, AuthResponse, AuthUser, Credentials, Session};
pub use filter::Filter;
pub use memory::MemoryStore;
pub use postgrest::SupabaseBackend;
pub use query_builder::QueryBuilder;

/// One table row as returned by the store
pub type Row = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("{0}")]
    Auth(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response from store: {0}")]
    Decode(String),

    #[error("Invalid store configuration: {0}")]
    Config(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Select { columns: String },
    Insert { rows: Vec<Row> },
    Update { patch: Row },
    Delete,
}

impl Operation {
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Select { .. } => "select",
            Operation::Insert { .. } => "insert",
            Operation::Update { .. } => "update",
            Operation::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreRequest {
    pub table: String,
    pub operation: Operation,
    pub filters: Vec<Filter>,
}

/// Transport used by [`StoreClient`]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Backend name for logging and the health endpoint
    fn name(&self) -> &'static str;

    async fn execute(&self, request: StoreRequest) -> Result<Vec<Row>, StoreError>;

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthResponse, StoreError>;

    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthUser, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Process-wide store handle, shared by every request
#[derive(Clone)]
pub struct StoreClient {
    backend: Arc<dyn Backend>,
}

impl StoreClient {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub fn table(&self, name: &str) -> QueryBuilder<'_> {
        QueryBuilder::new(self.backend.as_ref(), name)
    }

    pub fn auth(&self) -> AuthClient<'_> {
        AuthClient::new(self.backend.as_ref())
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.backend.health_check().await
    }
}

/// Build the configured backend
pub fn connect(config: &StoreConfig) -> Result<StoreClient, StoreError> {
    let backend: Arc<dyn Backend> = match config.backend {
        StoreBackend::Supabase => Arc::new(SupabaseBackend::new(config)?),
        StoreBackend::Memory => match &config.fixture_path {
            Some(path) => Arc::new(MemoryStore::load_fixture(path)?),
            None => Arc::new(MemoryStore::new()),
        },
    };
    tracing::info!("Store backend: {}", backend.name());
    Ok(StoreClient::new(backend))
}

/// Serialize an insert/update model into a row
pub fn to_row<T: Serialize>(value: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::Decode(format!("expected an object row, got {}", other))),
        Err(e) => Err(StoreError::Decode(e.to_string())),
    }
}
