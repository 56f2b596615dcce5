// handlers/users/lookup.rs - read-only user queries and the admin check

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::utils::{cell, parse_uuid, present};
use crate::middleware::{ApiResponse, ApiResult, QueryParams};
use crate::models::tables;
use crate::models::user::is_admin_role;
use crate::store::Row;

#[derive(Debug, Default, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthIdQuery {
    #[serde(rename = "authId")]
    pub auth_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StaffQuery {
    pub user_id: Option<String>,
    pub company_name: Option<String>,
}

/// GET /getUser?user_id= - profile row for an auth identity
pub async fn get_user(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<UserIdQuery>,
) -> ApiResult<Row> {
    let user_id = present(&query.user_id).ok_or_else(|| ApiError::bad_request("User ID is required"))?;
    parse_uuid(user_id)?;

    let rows = state
        .store
        .table(tables::USERS)
        .select("*")
        .eq("authId", user_id)
        .execute()
        .await?;

    let user = rows.into_iter().next().ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::success(user))
}

/// GET /isAdmin?authId= - `{isAdmin}` from the stored role, case-insensitively
pub async fn is_admin(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<AuthIdQuery>,
) -> ApiResult<Value> {
    let auth_id = present(&query.auth_id).ok_or_else(|| ApiError::bad_request("Auth ID is required"))?;

    let rows = state
        .store
        .table(tables::USERS)
        .select("role")
        .eq("authId", auth_id)
        .execute()
        .await?;

    let user = rows.first().ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::success(json!({ "isAdmin": is_admin_role(cell(user, "role")) })))
}

/// GET /getStaff?user_id=&company_name= - company roster, admins of that company only
pub async fn get_staff(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<StaffQuery>,
) -> ApiResult<Value> {
    let (user_id, company_name) = match (present(&query.user_id), present(&query.company_name)) {
        (Some(u), Some(c)) => (u, c),
        _ => return Err(ApiError::bad_request("User ID and company name are required")),
    };
    let user_id = parse_uuid(user_id)?;

    let rows = state
        .store
        .table(tables::USERS)
        .select("role, company_name")
        .eq("id", user_id.to_string())
        .execute()
        .await?;
    let requester = rows.first().ok_or_else(|| ApiError::not_found("User not found"))?;

    let is_admin = cell(requester, "role").as_str() == Some("admin");
    let same_company = cell(requester, "company_name").as_str() == Some(company_name);
    if !is_admin || !same_company {
        tracing::warn!(%user_id, company_name, "staff listing refused");
        return Err(ApiError::forbidden("You are not authorized to view this staff data"));
    }

    let staff = state
        .store
        .table(tables::USERS)
        .select("id, name, company")
        .eq("company_name", company_name)
        .execute()
        .await?;

    if staff.is_empty() {
        return Err(ApiError::not_found("No staff found for this company"));
    }
    Ok(ApiResponse::success(json!({ "staff": staff })))
}

/// GET /getUserNameById?user_id= - display name for an auth identity.
/// Not-found here is not logged.
pub async fn get_user_name_by_id(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<UserIdQuery>,
) -> ApiResult<Value> {
    let Some(auth_id) = present(&query.user_id) else {
        return Err(ApiError::not_found("User not found"));
    };

    let rows = state
        .store
        .table(tables::USERS)
        .select("name")
        .eq("authId", auth_id)
        .execute()
        .await?;

    match rows.first() {
        Some(user) => Ok(ApiResponse::success(json!({ "name": cell(user, "name") }))),
        None => Err(ApiError::not_found("User not found")),
    }
}
