// handlers/directory/companies.rs - company name listings

use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::utils::cell;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::tables;
use crate::store::Row;

/// GET /getCompanies - names from the companies table
pub async fn get_companies(State(state): State<AppState>) -> ApiResult<Value> {
    let rows = state.store.table(tables::COMPANIES).select("name").execute().await?;
    if rows.is_empty() {
        return Err(ApiError::not_found("No companies found"));
    }

    let names: Vec<&Value> = rows.iter().map(|row| cell(row, "name")).collect();
    Ok(ApiResponse::success(json!({ "companies": names })))
}

/// GET /get_companies - distinct `company` values found on user rows
pub async fn get_user_companies(State(state): State<AppState>) -> ApiResult<Value> {
    let rows = state.store.table(tables::USERS).select("company").execute().await?;
    if rows.is_empty() {
        return Err(ApiError::not_found("No companies found"));
    }

    Ok(ApiResponse::success(json!({ "companies": distinct_companies(&rows) })))
}

/// GET /getAllCompanies - full company rows
pub async fn get_all_companies(State(state): State<AppState>) -> ApiResult<Value> {
    let rows = state.store.table(tables::COMPANIES).select("*").execute().await?;
    if rows.is_empty() {
        return Err(ApiError::not_found("No companies found"));
    }
    Ok(ApiResponse::success(json!({ "companies": rows })))
}

/// First-seen order, nulls dropped
fn distinct_companies(rows: &[Row]) -> Vec<Value> {
    let mut seen: Vec<Value> = Vec::new();
    for company in rows.iter().map(|row| cell(row, "company")) {
        if !company.is_null() && !seen.contains(company) {
            seen.push(company.clone());
        }
    }
    seen
}
