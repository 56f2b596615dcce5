// handlers/membership.rs - assigning users to projects through `users.project`

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::utils::{cell, display_value, is_truthy, present, same_value};
use crate::middleware::{ApiResponse, ApiResult, Payload, QueryParams};
use crate::models::tables;
use crate::store::{Row, StoreError};

#[derive(Debug, Default, Deserialize)]
pub struct ProjectQuery {
    pub project_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddUsersRequest {
    pub user_ids: Option<Vec<Value>>,
    pub project_id: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoveUserRequest {
    pub user_id: Option<Value>,
    pub project_id: Option<Value>,
}

/// GET /getUsersByProject?project_id= - id, name and email of each member
pub async fn get_users_by_project(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ProjectQuery>,
) -> ApiResult<Value> {
    let project_id = present(&query.project_id).ok_or_else(|| ApiError::bad_request("Project ID is required"))?;

    let members = state
        .store
        .table(tables::USERS)
        .select("*")
        .eq("project", project_id)
        .execute()
        .await?;

    let auth_ids: Vec<Value> = members
        .iter()
        .map(|user| cell(user, "authId"))
        .filter(|id| is_truthy(id))
        .cloned()
        .collect();
    tracing::debug!(project_id, members = members.len(), with_auth_id = auth_ids.len(), "project members");

    if auth_ids.is_empty() {
        return Err(ApiError::not_found("No valid users found for this project"));
    }

    let users = state
        .store
        .table(tables::USERS)
        .select("id, name, email")
        .in_("authId", auth_ids)
        .execute()
        .await?;

    Ok(ApiResponse::success(json!({ "users": users })))
}

/// POST /addUsersToProject - point each listed user at the project.
///
/// Users are updated one at a time. The first unknown user or failed update
/// aborts the request, and users updated before it keep the new project.
pub async fn add_users_to_project(
    State(state): State<AppState>,
    Payload(body): Payload<AddUsersRequest>,
) -> ApiResult<Value> {
    let (Some(user_ids), Some(project_id)) = (body.user_ids, body.project_id) else {
        return Err(ApiError::bad_request("Missing required fields: user_ids, project_id"));
    };

    let project = state
        .store
        .table(tables::PROJECTS)
        .select("id")
        .eq("id", project_id.clone())
        .execute()
        .await?;
    if project.is_empty() {
        return Err(ApiError::not_found(format!(
            "Project with ID '{}' not found",
            display_value(&project_id)
        )));
    }

    let mut updated_users = Vec::with_capacity(user_ids.len());
    for user_id in user_ids {
        let found = state
            .store
            .table(tables::USERS)
            .select("*")
            .eq("id", user_id.clone())
            .execute()
            .await?;
        let Some(user) = found.into_iter().next() else {
            tracing::warn!(
                user_id = %display_value(&user_id),
                updated = updated_users.len(),
                "unknown user, stopping project assignment"
            );
            return Err(ApiError::not_found(format!(
                "User with ID '{}' not found",
                display_value(&user_id)
            )));
        };

        let mut patch = Map::new();
        patch.insert("project".into(), project_id.clone());
        let changed = state
            .store
            .table(tables::USERS)
            .update(patch)
            .eq("id", user_id.clone())
            .execute()
            .await?;
        if changed.is_empty() {
            return Err(ApiError::internal_server_error(format!(
                "Failed to update user with ID '{}'",
                display_value(&user_id)
            )));
        }

        updated_users.push(member_summary(&user));
    }

    tracing::info!(project_id = %display_value(&project_id), count = updated_users.len(), "users added to project");
    Ok(ApiResponse::success(json!({
        "message": "Users successfully added to the project",
        "updated_users": updated_users,
        "project_id": project_id,
    })))
}

/// POST /removeUserFromProject - clear `project` if it names this project
pub async fn remove_user_from_project(
    State(state): State<AppState>,
    Payload(body): Payload<RemoveUserRequest>,
) -> ApiResult<Value> {
    let (user_id, project_id) = match (body.user_id, body.project_id) {
        (Some(u), Some(p)) if is_truthy(&u) && is_truthy(&p) => (u, p),
        _ => return Err(ApiError::bad_request("Missing required fields: user_id, project_id")),
    };
    let user_label = display_value(&user_id);
    let project_label = display_value(&project_id);

    let found = state
        .store
        .table(tables::USERS)
        .select("id, project")
        .eq("id", user_id.clone())
        .execute()
        .await
        .map_err(internal)?;
    let user = found
        .first()
        .ok_or_else(|| ApiError::not_found(format!("User with ID '{}' not found", user_label)))?;

    if !same_value(cell(user, "project"), &project_id) {
        return Err(ApiError::bad_request(format!(
            "User with ID '{}' is not associated with project '{}'",
            user_label, project_label
        )));
    }

    let mut patch = Map::new();
    patch.insert("project".into(), Value::Null);
    state
        .store
        .table(tables::USERS)
        .update(patch)
        .eq("id", user_id)
        .execute()
        .await
        .map_err(internal)?;

    tracing::info!(user_id = %user_label, project_id = %project_label, "user removed from project");
    Ok(ApiResponse::success(json!({
        "message": format!(
            "User with ID '{}' removed from project '{}' successfully",
            user_label, project_label
        ),
    })))
}

fn member_summary(user: &Row) -> Value {
    json!({
        "id": cell(user, "id"),
        "name": cell(user, "name"),
        "email": cell(user, "email"),
    })
}

fn internal(e: StoreError) -> ApiError {
    tracing::error!("removeUserFromProject store failure: {}", e);
    ApiError::internal_server_error(format!("Internal Server Error: {}", e))
}
