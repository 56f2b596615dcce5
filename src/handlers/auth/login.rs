// handlers/auth/login.rs - POST /loginAdmin, POST /loginClient

use axum::extract::State;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Payload};
use crate::store::{AuthResponse, Credentials};

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub company: Value,
}

#[derive(Debug, Serialize)]
pub struct LoginSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: LoginUser,
    pub session: LoginSession,
}

impl From<AuthResponse> for LoginResponse {
    fn from(auth: AuthResponse) -> Self {
        let company = auth.user.user_metadata.get("company").cloned().unwrap_or(Value::Null);
        Self {
            user: LoginUser {
                id: auth.user.id,
                email: auth.user.email,
                role: auth.user.role,
                company,
            },
            session: LoginSession {
                access_token: auth.session.access_token,
                refresh_token: auth.session.refresh_token,
                expires_in: auth.session.expires_in,
            },
        }
    }
}

/// POST /loginAdmin - sign in as the admin demo account
pub async fn login_admin(
    State(state): State<AppState>,
    Payload(body): Payload<Map<String, Value>>,
) -> ApiResult<LoginResponse> {
    let credentials = state.config.demo.admin.clone();
    sign_in(&state, "admin", &credentials, &body).await
}

/// POST /loginClient - sign in as the client demo account
pub async fn login_client(
    State(state): State<AppState>,
    Payload(body): Payload<Map<String, Value>>,
) -> ApiResult<LoginResponse> {
    let credentials = state.config.demo.client.clone();
    sign_in(&state, "client", &credentials, &body).await
}

async fn sign_in(
    state: &AppState,
    account: &str,
    credentials: &Credentials,
    body: &Map<String, Value>,
) -> ApiResult<LoginResponse> {
    if body.is_empty() {
        return Err(ApiError::bad_request("No data provided"));
    }
    if !credentials.is_configured() {
        tracing::error!("Login for the {} demo account attempted but no credentials are configured", account);
        return Err(ApiError::internal_server_error(format!(
            "Credentials for the {} demo account are not configured",
            account
        )));
    }

    match state.store.auth().sign_in_with_password(credentials).await {
        Ok(auth) => {
            tracing::info!(account, user_id = %auth.user.id, "demo account signed in");
            Ok(ApiResponse::success(LoginResponse::from(auth)))
        }
        Err(e) => {
            tracing::error!(account, "sign-in failed: {}", e);
            Err(ApiError::internal_server_error(e.to_string()))
        }
    }
}
