// handlers/users/company.rs - company rosters and company-scoped user creation

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::utils::present;
use crate::middleware::{ApiResponse, ApiResult, Payload, QueryParams};
use crate::models::{tables, NewUser, Role};
use crate::store::to_row;

#[derive(Debug, Default, Deserialize)]
pub struct CompanyQuery {
    pub company_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddUserToCompanyRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    #[serde(rename = "authId")]
    pub auth_id: Option<String>,
    #[serde(rename = "companyId")]
    pub company_id: Option<String>,
}

/// GET /getUsersByCompany?company_name=
pub async fn get_users_by_company(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<CompanyQuery>,
) -> ApiResult<Value> {
    let company = present(&query.company_name).ok_or_else(|| ApiError::bad_request("Company name is required"))?;

    let users = state
        .store
        .table(tables::USERS)
        .select("*")
        .eq("company", company)
        .execute()
        .await?;
    tracing::debug!(company, count = users.len(), "users by company");

    if users.is_empty() {
        return Err(ApiError::not_found("No users found for this company"));
    }
    Ok(ApiResponse::success(json!({ "users": users })))
}

/// POST /addUserToCompany - profile row with a validated role
pub async fn add_user_to_company(
    State(state): State<AppState>,
    Payload(body): Payload<AddUserToCompanyRequest>,
) -> ApiResult<Value> {
    let (Some(name), Some(email), Some(role), Some(company)) = (body.name, body.email, body.role, body.company_name)
    else {
        return Err(ApiError::bad_request(
            "Missing required fields: name, email, role, company_name",
        ));
    };

    let role: Role = role
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid role. Choose from 'admin', 'client', 'staff'"))?;

    insert_company_user(&state, name, email, role, company).await
}

/// POST /create_user - staff profile whose email column holds the auth id
pub async fn create_user(
    State(state): State<AppState>,
    Payload(body): Payload<CreateUserRequest>,
) -> ApiResult<Value> {
    let (Some(name), Some(auth_id), Some(company)) = (body.name, body.auth_id, body.company_id) else {
        return Err(ApiError::bad_request("Missing required fields: name, authId, companyId"));
    };

    insert_company_user(&state, name, auth_id, Role::Staff, company).await
}

/// A company exists when at least one user row already names it.
async fn insert_company_user(
    state: &AppState,
    name: String,
    email: String,
    role: Role,
    company: String,
) -> ApiResult<Value> {
    let known = state
        .store
        .table(tables::USERS)
        .select("company")
        .eq("company", company.as_str())
        .execute()
        .await?;
    if known.is_empty() {
        return Err(ApiError::not_found(format!("Company '{}' not found", company)));
    }

    let new_user = NewUser {
        id: Some(Uuid::new_v4().to_string()),
        name,
        email,
        role: role.to_string(),
        company: company.clone(),
        company_name: Some(company),
    };

    let inserted = state.store.table(tables::USERS).insert(to_row(&new_user)?).execute().await?;
    if inserted.is_empty() {
        return Err(ApiError::internal_server_error("Failed to add user to company"));
    }
    tracing::info!(company = %new_user.company, role = %role, "user added to company");

    Ok(ApiResponse::success(json!({
        "message": "User added successfully",
        "user": new_user,
    })))
}
