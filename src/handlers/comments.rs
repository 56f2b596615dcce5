// handlers/comments.rs - project discussion threads

use std::collections::HashMap;

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::utils::{cell, is_truthy, present};
use crate::middleware::{ApiResponse, ApiResult, Payload, QueryParams};
use crate::models::comment::timestamp_now;
use crate::models::{tables, NewComment};
use crate::store::filter::text_form;
use crate::store::{to_row, Row};

const UNKNOWN_AUTHOR: &str = "Unknown";

#[derive(Debug, Default, Deserialize)]
pub struct CommentsQuery {
    pub project_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddCommentRequest {
    pub project_id: Option<Value>,
    pub comment: Option<String>,
    /// Auth id of the author
    pub sender: Option<Value>,
}

/// GET /getCommentsByProject?project_id= - comments with the author's `userName`
pub async fn get_comments_by_project(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<CommentsQuery>,
) -> ApiResult<Value> {
    let project_id = present(&query.project_id).ok_or_else(|| ApiError::bad_request("Project ID is required"))?;

    let mut comments = state
        .store
        .table(tables::COMMENTS)
        .select("*")
        .eq("projectId", project_id)
        .execute()
        .await?;
    if comments.is_empty() {
        return Ok(ApiResponse::success(json!({ "comments": [] })));
    }

    let mut author_ids: Vec<Value> = Vec::new();
    for id in comments.iter().map(|c| cell(c, "userAuthId")) {
        if !id.is_null() && !author_ids.contains(id) {
            author_ids.push(id.clone());
        }
    }

    let authors = if author_ids.is_empty() {
        Vec::new()
    } else {
        state
            .store
            .table(tables::USERS)
            .select("authId, name")
            .in_("authId", author_ids)
            .execute()
            .await?
    };

    attach_author_names(&mut comments, &authors);
    Ok(ApiResponse::success(json!({ "comments": comments })))
}

/// POST /addComment - 201 with the new comment's id, content and timestamp
pub async fn add_comment(
    State(state): State<AppState>,
    Payload(body): Payload<AddCommentRequest>,
) -> ApiResult<Value> {
    let (project_id, content, sender) = match (body.project_id, present(&body.comment), body.sender) {
        (Some(p), Some(c), Some(s)) if is_truthy(&p) && is_truthy(&s) => (p, c.to_string(), s),
        _ => return Err(ApiError::bad_request("Project ID, comment, and sender are required")),
    };

    let comment = NewComment {
        project_id,
        content,
        created_at: timestamp_now(),
        user_auth_id: sender,
    };

    let inserted = match state.store.table(tables::COMMENTS).insert(to_row(&comment)?).execute().await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Error adding comment: {}", e);
            return Err(ApiError::internal_server_error("An unexpected error occurred"));
        }
    };

    let Some(row) = inserted.first() else {
        return Err(ApiError::internal_server_error("Failed to add comment"));
    };
    tracing::debug!(project_id = ?comment.project_id, "comment added");

    Ok(ApiResponse::created(json!({
        "message": "Comment added successfully",
        "comment": {
            "id": cell(row, "id"),
            "content": comment.content,
            "created_at": comment.created_at,
        },
    })))
}

/// Set `userName` on every comment, `Unknown` when the author has no profile
fn attach_author_names(comments: &mut [Row], authors: &[Row]) {
    let names: HashMap<String, Value> = authors
        .iter()
        .filter_map(|user| Some((text_form(cell(user, "authId"))?, cell(user, "name").clone())))
        .collect();

    for comment in comments.iter_mut() {
        let name = text_form(cell(comment, "userAuthId"))
            .and_then(|id| names.get(&id).cloned())
            .unwrap_or_else(|| Value::from(UNKNOWN_AUTHOR));
        comment.insert("userName".into(), name);
    }
}
