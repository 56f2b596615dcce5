// handlers/users/manage.rs - account creation, profile edits, deletion

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::utils::{is_truthy, present};
use crate::middleware::{ApiResponse, ApiResult, Payload};
use crate::models::{tables, NewUser, UserPatch};
use crate::store::{to_row, Credentials};

#[derive(Debug, Default, Deserialize)]
pub struct AddUserRequest {
    pub username: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub id: Option<Value>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteUserRequest {
    pub email: Option<String>,
}

/// POST /addUser - register an auth identity and its profile row.
///
/// The email check, the sign-up and the insert are three separate remote
/// calls with no transaction: two concurrent requests can both pass the
/// check, and a failed insert leaves the auth identity behind.
pub async fn add_user(State(state): State<AppState>, Payload(body): Payload<AddUserRequest>) -> ApiResult<Value> {
    let (username, company, email, password, role) = match (
        present(&body.username),
        present(&body.company),
        present(&body.email),
        present(&body.password),
        present(&body.role),
    ) {
        (Some(u), Some(c), Some(e), Some(p), Some(r)) => (u, c, e, p, r),
        _ => return Err(ApiError::bad_request("All fields are required")),
    };

    let existing = state
        .store
        .table(tables::USERS)
        .select("email")
        .eq("email", email)
        .execute()
        .await?;
    if !existing.is_empty() {
        return Err(ApiError::bad_request("Email already exists"));
    }

    let new_user = NewUser {
        id: None,
        name: username.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        company: company.to_string(),
        company_name: None,
    };

    let identity = state.store.auth().sign_up(&Credentials::new(email, password)).await?;
    tracing::info!(auth_id = %identity.id, %email, "auth identity created");

    let inserted = state.store.table(tables::USERS).insert(to_row(&new_user)?).execute().await?;
    if inserted.is_empty() {
        tracing::error!(%email, "profile insert returned no rows; auth identity {} has no profile", identity.id);
        return Err(ApiError::internal_server_error("Failed to add user"));
    }

    Ok(ApiResponse::created(json!({ "success": true, "user": new_user })))
}

/// PUT /api/update-user - overwrite name, email, role and company.
/// Fields left out of the body are written as null.
pub async fn update_user(
    State(state): State<AppState>,
    Payload(body): Payload<UpdateUserRequest>,
) -> ApiResult<Value> {
    let id = match body.id {
        Some(id) if is_truthy(&id) => id,
        _ => return Err(ApiError::bad_request("User ID is required")),
    };

    let patch = UserPatch {
        name: body.name,
        email: body.email,
        role: body.role,
        company: body.company,
    };

    let updated = state
        .store
        .table(tables::USERS)
        .update(to_row(&patch)?)
        .eq("id", id)
        .execute()
        .await
        .map_err(|e| {
            tracing::warn!("user update rejected by store: {}", e);
            ApiError::bad_request(e.to_string())
        })?;

    Ok(ApiResponse::success(json!({
        "message": "User updated successfully",
        "user": updated,
    })))
}

/// DELETE /api/delete-user - remove every profile row with the given email
pub async fn delete_user(
    State(state): State<AppState>,
    Payload(body): Payload<DeleteUserRequest>,
) -> ApiResult<Value> {
    let email = present(&body.email).ok_or_else(|| ApiError::bad_request("Email is required to delete user"))?;

    match state.store.table(tables::USERS).delete().eq("email", email).execute().await {
        Ok(removed) => {
            tracing::info!(%email, removed = removed.len(), "user rows deleted");
            Ok(ApiResponse::success(json!({
                "success": true,
                "message": "User deleted successfully",
            })))
        }
        Err(e) => {
            tracing::error!("Unexpected error in /api/delete-user: {}", e);
            Err(ApiError::internal_with_details("An internal error occurred", e.to_string()))
        }
    }
}
