//! In-process store used by the test suite and by `--store memory`.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AuthResponse, AuthUser, Backend, Credentials, Operation, Row, Session, StoreError, StoreRequest};

const SESSION_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone)]
struct Account {
    user: AuthUser,
    password: String,
}

/// YAML seed file: `tables` maps table name to rows, `accounts` lists auth identities
#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub tables: HashMap<String, Vec<Row>>,
    #[serde(default)]
    pub accounts: Vec<FixtureAccount>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureAccount {
    #[serde(default)]
    pub id: Option<String>,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    accounts: RwLock<Vec<Account>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: Fixture) -> Self {
        let mut store = Self::new();
        for (table, rows) in fixture.tables {
            store.tables.get_mut().insert(table, rows);
        }
        for account in fixture.accounts {
            let id = account.id.unwrap_or_else(|| Uuid::new_v4().to_string());
            store = store.with_account_id(id, &account.email, &account.password, account.role, account.user_metadata);
        }
        store
    }

    pub fn load_fixture(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("cannot read fixture {}: {}", path.display(), e)))?;
        let fixture: Fixture = serde_yaml::from_str(&raw)
            .map_err(|e| StoreError::Config(format!("invalid fixture {}: {}", path.display(), e)))?;
        tracing::info!(
            "Loaded fixture {} ({} tables, {} accounts)",
            path.display(),
            fixture.tables.len(),
            fixture.accounts.len()
        );
        Ok(Self::from_fixture(fixture))
    }

    /// Seed a table. Non-object values are skipped.
    pub fn with_table(mut self, table: &str, rows: Vec<Value>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        self.tables.get_mut().insert(table.to_string(), rows);
        self
    }

    /// Seed an auth identity with a generated id
    pub fn with_account(self, email: &str, password: &str, user_metadata: Value) -> Self {
        let metadata = match user_metadata {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.with_account_id(Uuid::new_v4().to_string(), email, password, None, metadata)
    }

    fn with_account_id(
        mut self,
        id: String,
        email: &str,
        password: &str,
        role: Option<String>,
        user_metadata: Map<String, Value>,
    ) -> Self {
        self.accounts.get_mut().push(Account {
            user: AuthUser {
                id,
                email: Some(email.to_string()),
                role: Some(role.unwrap_or_else(|| "authenticated".to_string())),
                user_metadata,
            },
            password: password.to_string(),
        });
        self
    }

    /// Snapshot of a table
    pub async fn rows(&self, table: &str) -> Vec<Row> {
        self.tables.read().await.get(table).cloned().unwrap_or_default()
    }

    /// Snapshot of registered auth identities
    pub async fn accounts(&self) -> Vec<AuthUser> {
        self.accounts.read().await.iter().map(|a| a.user.clone()).collect()
    }
}

fn project(row: &Row, columns: &str) -> Row {
    if columns == "*" {
        return row.clone();
    }
    columns
        .split(',')
        .map(|col| (col.to_string(), row.get(col).cloned().unwrap_or(Value::Null)))
        .collect()
}

fn mint_token() -> String {
    Uuid::new_v4().simple().to_string()
}

#[async_trait]
impl Backend for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn execute(&self, request: StoreRequest) -> Result<Vec<Row>, StoreError> {
        let StoreRequest { table, operation, filters } = request;
        let matches = |row: &Row| filters.iter().all(|f| f.matches(row));

        match operation {
            Operation::Select { columns } => {
                let tables = self.tables.read().await;
                Ok(tables
                    .get(&table)
                    .map(|rows| rows.iter().filter(|r| matches(*r)).map(|r| project(r, &columns)).collect())
                    .unwrap_or_default())
            }
            Operation::Insert { rows } => {
                let mut tables = self.tables.write().await;
                let target = tables.entry(table).or_default();
                let mut inserted = Vec::with_capacity(rows.len());
                for mut row in rows {
                    if row.get("id").map_or(true, Value::is_null) {
                        row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
                    }
                    target.push(row.clone());
                    inserted.push(row);
                }
                Ok(inserted)
            }
            Operation::Update { patch } => {
                let mut tables = self.tables.write().await;
                let mut updated = Vec::new();
                if let Some(rows) = tables.get_mut(&table) {
                    for row in rows.iter_mut().filter(|r| matches(&**r)) {
                        for (key, value) in &patch {
                            row.insert(key.clone(), value.clone());
                        }
                        updated.push(row.clone());
                    }
                }
                Ok(updated)
            }
            Operation::Delete => {
                let mut tables = self.tables.write().await;
                let mut removed = Vec::new();
                if let Some(rows) = tables.get_mut(&table) {
                    let (gone, kept): (Vec<Row>, Vec<Row>) = rows.drain(..).partition(|r| matches(r));
                    *rows = kept;
                    removed = gone;
                }
                Ok(removed)
            }
        }
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthResponse, StoreError> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .iter()
            .find(|a| a.user.email.as_deref() == Some(credentials.email.as_str()) && a.password == credentials.password)
            .ok_or_else(|| StoreError::Auth("Invalid login credentials".to_string()))?;

        Ok(AuthResponse {
            user: account.user.clone(),
            session: Session {
                access_token: mint_token(),
                refresh_token: mint_token(),
                expires_in: SESSION_TTL_SECS,
            },
        })
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthUser, StoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|a| a.user.email.as_deref() == Some(credentials.email.as_str())) {
            return Err(StoreError::Auth("User already registered".to_string()));
        }
        let user = AuthUser {
            id: Uuid::new_v4().to_string(),
            email: Some(credentials.email.clone()),
            role: Some("authenticated".to_string()),
            user_metadata: Map::new(),
        };
        accounts.push(Account {
            user: user.clone(),
            password: credentials.password.clone(),
        });
        Ok(user)
    }
}
