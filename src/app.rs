use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::handlers;
use crate::middleware::{cors_layer, preflight_body};
use crate::store::StoreClient;

/// Shared per-process state: one store client, one configuration
#[derive(Clone)]
pub struct AppState {
    pub store: StoreClient,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: StoreClient, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(user_routes())
        .merge(directory_routes())
        .merge(membership_routes())
        .merge(comment_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(preflight_body))
                .layer(cors),
        )
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/loginAdmin", post(auth::login_admin))
        .route("/loginClient", post(auth::login_client))
}

fn user_routes() -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/getUser", get(users::get_user))
        .route("/isAdmin", get(users::is_admin))
        .route("/getStaff", get(users::get_staff))
        .route("/getUserNameById", get(users::get_user_name_by_id))
        .route("/addUser", post(users::add_user))
        .route("/api/update-user", put(users::update_user))
        .route("/api/delete-user", delete(users::delete_user))
        .route("/getUsersByCompany", get(users::get_users_by_company))
        .route("/addUserToCompany", post(users::add_user_to_company))
        .route("/create_user", post(users::create_user))
}

fn directory_routes() -> Router<AppState> {
    use handlers::directory;

    Router::new()
        .route("/getCompanies", get(directory::get_companies))
        .route("/get_companies", get(directory::get_user_companies))
        .route("/getAllCompanies", get(directory::get_all_companies))
        .route("/getAllProjects", get(directory::get_all_projects))
        .route("/createProject", post(directory::create_project))
        .route("/getClientsProjects", post(directory::get_clients_projects))
}

fn membership_routes() -> Router<AppState> {
    use handlers::membership;

    Router::new()
        .route("/getUsersByProject", get(membership::get_users_by_project))
        .route("/addUsersToProject", post(membership::add_users_to_project))
        .route("/removeUserFromProject", post(membership::remove_user_from_project))
}

fn comment_routes() -> Router<AppState> {
    use handlers::comments;

    Router::new()
        .route("/getCommentsByProject", get(comments::get_comments_by_project))
        .route("/addComment", post(comments::add_comment))
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "store": state.store.backend_name(),
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let store = state.store.backend_name();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "store": store,
                "timestamp": now,
            })),
        ),
        Err(e) => {
            tracing::warn!("store health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "store": store,
                    "error": e.to_string(),
                    "timestamp": now,
                })),
            )
        }
    }
}
