use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Backend, StoreError};

/// Email/password pair sent to the auth provider
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity record issued by the auth provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone)]
pub struct AuthResponse {
    pub user: AuthUser,
    pub session: Session,
}

/// Auth half of the store client
pub struct AuthClient<'a> {
    backend: &'a dyn Backend,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    pub async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthResponse, StoreError> {
        tracing::debug!(email = %credentials.email, backend = self.backend.name(), "password sign-in");
        self.backend.sign_in_with_password(credentials).await
    }

    pub async fn sign_up(&self, credentials: &Credentials) -> Result<AuthUser, StoreError> {
        tracing::debug!(email = %credentials.email, backend = self.backend.name(), "sign-up");
        self.backend.sign_up(credentials).await
    }
}
