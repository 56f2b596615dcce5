// handlers/directory/projects.rs - project listing, creation and per-client lookup

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::utils::{cell, is_truthy, present};
use crate::middleware::{ApiResponse, ApiResult, Payload};
use crate::models::{tables, NewProject};
use crate::store::{to_row, Row};

#[derive(Debug, Default, Deserialize)]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub company: Option<Value>,
}

impl CreateProjectRequest {
    /// Every field must be present and non-empty
    fn into_project(self) -> Option<NewProject> {
        let company = self.company.filter(is_truthy)?;
        Some(NewProject {
            name: present(&self.name)?.to_string(),
            description: present(&self.description)?.to_string(),
            start_date: present(&self.start_date)?.to_string(),
            end_date: present(&self.end_date)?.to_string(),
            company,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ClientProjectsRequest {
    #[serde(rename = "authId")]
    pub auth_id: Option<String>,
}

/// GET /getAllProjects
pub async fn get_all_projects(State(state): State<AppState>) -> ApiResult<Value> {
    let rows = state.store.table(tables::PROJECTS).select("*").execute().await?;
    if rows.is_empty() {
        return Err(ApiError::not_found("No projects found"));
    }
    Ok(ApiResponse::success(json!({ "projects": rows })))
}

/// POST /createProject - 201 with the stored row
pub async fn create_project(
    State(state): State<AppState>,
    Payload(body): Payload<CreateProjectRequest>,
) -> ApiResult<Row> {
    tracing::debug!(company = ?body.company, "createProject received");

    let project = body
        .into_project()
        .ok_or_else(|| ApiError::bad_request("All fields are required"))?;

    let inserted = state
        .store
        .table(tables::PROJECTS)
        .insert(to_row(&project)?)
        .execute()
        .await
        .map_err(|e| {
            let message = format!("An error occurred during project creation: {}", e);
            tracing::error!("{}", message);
            ApiError::internal_server_error(message)
        })?;

    match inserted.into_iter().next() {
        Some(row) => {
            tracing::info!(name = %project.name, "project created");
            Ok(ApiResponse::created(row))
        }
        None => Err(ApiError::internal_with_details("Failed to create project", Value::Null)),
    }
}

/// POST /getClientsProjects - projects referenced by the caller's user rows
pub async fn get_clients_projects(
    State(state): State<AppState>,
    Payload(body): Payload<ClientProjectsRequest>,
) -> ApiResult<Value> {
    let auth_id = present(&body.auth_id).ok_or_else(|| ApiError::bad_request("authId is required"))?;

    let users = state
        .store
        .table(tables::USERS)
        .select("project")
        .eq("authId", auth_id)
        .execute()
        .await?;
    if users.is_empty() {
        return Err(ApiError::not_found("No user found with the given authId"));
    }

    let project_ids: Vec<Value> = users
        .iter()
        .map(|user| cell(user, "project"))
        .filter(|id| !id.is_null())
        .cloned()
        .collect();
    if project_ids.is_empty() {
        return Err(ApiError::not_found("No projects found for the user"));
    }

    let projects = state
        .store
        .table(tables::PROJECTS)
        .select("*")
        .in_("id", project_ids)
        .execute()
        .await?;
    if projects.is_empty() {
        return Err(ApiError::not_found("No projects found for the user"));
    }

    Ok(ApiResponse::success(json!({ "projects": projects })))
}
