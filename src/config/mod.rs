use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::store::Credentials;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub demo: DemoAccounts,
    pub security: SecurityConfig,
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Supabase,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supabase" => Ok(StoreBackend::Supabase),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}' (expected supabase or memory)", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Per-request deadline for store calls. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    /// YAML seed for the memory backend
    pub fixture_path: Option<String>,
}

/// The two fixed identities the login routes sign in with
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemoAccounts {
    #[serde(skip_serializing)]
    pub admin: Credentials,
    #[serde(skip_serializing)]
    pub client: Credentials,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Allowed origins; `*` mirrors any caller origin
    pub cors_origins: Vec<String>,
}

impl Environment {
    pub fn from_env() -> Self {
        match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        // Set defaults based on environment, then override with specific env vars
        Self::preset(Environment::from_env()).with_env_overrides()
    }

    pub fn preset(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Store overrides
        if let Ok(v) = env::var("STORE_BACKEND") {
            match v.parse() {
                Ok(backend) => self.store.backend = backend,
                Err(e) => tracing::warn!("Ignoring STORE_BACKEND: {}", e),
            }
        }
        if let Ok(v) = env::var("SUPABASE_URL") {
            self.store.url = v;
        }
        if let Ok(v) = env::var("SUPABASE_KEY") {
            self.store.api_key = v;
        }
        if let Ok(v) = env::var("STORE_TIMEOUT_SECS") {
            self.store.timeout_secs = parse_timeout(&v);
        }
        if let Ok(v) = env::var("STORE_FIXTURE") {
            self.store.fixture_path = Some(v);
        }

        // Demo account overrides
        if let Ok(v) = env::var("DEMO_ADMIN_EMAIL") {
            self.demo.admin.email = v;
        }
        if let Ok(v) = env::var("DEMO_ADMIN_PASSWORD") {
            self.demo.admin.password = v;
        }
        if let Ok(v) = env::var("DEMO_CLIENT_EMAIL") {
            self.demo.client.email = v;
        }
        if let Ok(v) = env::var("DEMO_CLIENT_PASSWORD") {
            self.demo.client.password = v;
        }

        // Security overrides
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(v) = env::var("LOG_LEVEL") {
            self.log_level = v;
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            store: StoreConfig {
                backend: StoreBackend::Supabase,
                url: String::new(),
                api_key: String::new(),
                timeout_secs: None,
                fixture_path: None,
            },
            demo: DemoAccounts::default(),
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
            },
            log_level: "client_portal_api=debug,tower_http=debug,info".to_string(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            log_level: "client_portal_api=info,tower_http=info,warn".to_string(),
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            log_level: "client_portal_api=info,warn".to_string(),
            ..Self::staging()
        }
    }
}

/// `STORE_TIMEOUT_SECS`: zero or garbage leaves store calls unbounded
fn parse_timeout(raw: &str) -> Option<u64> {
    raw.trim().parse().ok().filter(|secs| *secs > 0)
}

/// Filter directives for the log subscriber, which has to exist before
/// [`config()`] runs so configuration warnings are not lost.
/// `RUST_LOG` still wins over this at subscriber setup.
pub fn log_level_from_env() -> String {
    log_filter(env::var("LOG_LEVEL").ok(), Environment::from_env())
}

fn log_filter(level: Option<String>, environment: Environment) -> String {
    level
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| AppConfig::preset(environment).log_level)
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
