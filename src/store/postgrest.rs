//! Supabase backend: PostgREST for tables, GoTrue for auth.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{AuthResponse, AuthUser, Backend, Credentials, Operation, Row, Session, StoreError, StoreRequest};
use crate::config::StoreConfig;

pub struct SupabaseBackend {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

/// GoTrue password grant response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: AuthUser,
}

impl SupabaseBackend {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        if config.url.is_empty() {
            return Err(StoreError::Config("SUPABASE_URL is not set".to_string()));
        }
        if config.api_key.is_empty() {
            return Err(StoreError::Config("SUPABASE_KEY is not set".to_string()));
        }

        let mut base_url =
            Url::parse(&config.url).map_err(|e| StoreError::Config(format!("invalid SUPABASE_URL: {}", e)))?;
        // Url::join drops the last path segment unless the base ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = reqwest::Client::builder();
        // Zero means no timeout rather than an immediate one
        if let Some(secs) = config.timeout_secs.filter(|secs| *secs > 0) {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(path)
            .map_err(|e| StoreError::Config(format!("invalid endpoint {}: {}", path, e)))
    }

    fn authorized(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    /// Translate a table request into an HTTP request
    fn build_table_request(&self, request: &StoreRequest) -> Result<RequestBuilder, StoreError> {
        let url = self.endpoint(&format!("rest/v1/{}", request.table))?;

        let (method, columns) = match &request.operation {
            Operation::Select { columns } => (Method::GET, Some(columns.as_str())),
            Operation::Insert { .. } => (Method::POST, None),
            Operation::Update { .. } => (Method::PATCH, None),
            Operation::Delete => (Method::DELETE, None),
        };

        let mut params: Vec<(String, String)> = Vec::with_capacity(request.filters.len() + 1);
        if let Some(columns) = columns {
            params.push(("select".to_string(), columns.to_string()));
        }
        for filter in &request.filters {
            params.push((filter.column().to_string(), filter.to_postgrest()));
        }

        let mut builder = self.authorized(method, url).query(&params);
        builder = match &request.operation {
            Operation::Select { .. } => builder,
            Operation::Insert { rows } => builder.header("Prefer", "return=representation").json(rows),
            Operation::Update { patch } => builder.header("Prefer", "return=representation").json(patch),
            Operation::Delete => builder.header("Prefer", "return=representation"),
        };
        Ok(builder)
    }

    async fn decode_rows(response: Response) -> Result<Vec<Row>, StoreError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Array(items)) => Ok(items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect()),
            Ok(Value::Object(map)) => Ok(vec![map]),
            Ok(other) => Err(StoreError::Decode(format!("expected rows, got {}", other))),
            Err(e) => Err(StoreError::Decode(e.to_string())),
        }
    }

    async fn auth_call(&self, url: Url, credentials: &Credentials) -> Result<Value, StoreError> {
        let response = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Auth(error_message(&body).unwrap_or_else(|| {
                format!("auth provider returned {}", status)
            })));
        }
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

/// Pull the human-readable message out of a PostgREST or GoTrue error body
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn api_error(status: u16, body: &str) -> StoreError {
    let code = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("code").map(|c| super::filter::text_form(c).unwrap_or_default()));
    let message = error_message(body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            format!("store returned status {}", status)
        } else {
            body.trim().to_string()
        }
    });
    StoreError::Api { status, code, message }
}

#[async_trait]
impl Backend for SupabaseBackend {
    fn name(&self) -> &'static str {
        "supabase"
    }

    async fn execute(&self, request: StoreRequest) -> Result<Vec<Row>, StoreError> {
        let response = self.build_table_request(&request)?.send().await?;
        let rows = Self::decode_rows(response).await;
        if let Err(e) = &rows {
            tracing::debug!(table = %request.table, operation = request.operation.verb(), "store error: {}", e);
        }
        rows
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthResponse, StoreError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let body = self.auth_call(url, credentials).await?;
        let token: TokenResponse = serde_json::from_value(body).map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(AuthResponse {
            user: token.user,
            session: Session {
                access_token: token.access_token,
                refresh_token: token.refresh_token,
                expires_in: token.expires_in,
            },
        })
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthUser, StoreError> {
        let url = self.endpoint("auth/v1/signup")?;
        let mut body = self.auth_call(url, credentials).await?;

        // With auto-confirm the provider answers with a session wrapping the user
        if let Some(user) = body.get_mut("user").map(Value::take) {
            body = user;
        }
        serde_json::from_value(body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let url = self.endpoint("auth/v1/health")?;
        let response = self.http.get(url).header("apikey", &self.api_key).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(api_error(status.as_u16(), &body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreBackend;
    use crate::store::{Filter, StoreRequest};
    use serde_json::json;
    use wiremock::matchers::{body_json, header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(url: &str) -> SupabaseBackend {
        backend_with_timeout(url, None)
    }

    fn backend_with_timeout(url: &str, timeout_secs: Option<u64>) -> SupabaseBackend {
        SupabaseBackend::new(&StoreConfig {
            backend: StoreBackend::Supabase,
            url: url.to_string(),
            api_key: "anon-key".to_string(),
            timeout_secs,
            fixture_path: None,
        })
        .unwrap()
    }

    fn select_users() -> StoreRequest {
        StoreRequest {
            table: "users".to_string(),
            operation: Operation::Select { columns: "*".to_string() },
            filters: vec![Filter::eq("email", "bob@acme.test")],
        }
    }

    #[test]
    fn rejects_missing_settings() {
        let config = StoreConfig {
            backend: StoreBackend::Supabase,
            url: String::new(),
            api_key: "k".to_string(),
            timeout_secs: None,
            fixture_path: None,
        };
        assert!(matches!(SupabaseBackend::new(&config), Err(StoreError::Config(_))));
    }

    #[test]
    fn select_request_carries_projection_and_filters() {
        let backend = backend("https://demo.supabase.co");
        let request = StoreRequest {
            table: "users".to_string(),
            operation: Operation::Select { columns: "id,name".to_string() },
            filters: vec![Filter::eq("authId", "abc"), Filter::in_list("project", vec![json!(1), json!(2)])],
        };
        let built = backend.build_table_request(&request).unwrap().build().unwrap();

        assert_eq!(built.method(), &Method::GET);
        assert_eq!(built.url().path(), "/rest/v1/users");
        let pairs: Vec<(String, String)> = built.url().query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("select".to_string(), "id,name".to_string()),
                ("authId".to_string(), "eq.abc".to_string()),
                ("project".to_string(), "in.(1,2)".to_string()),
            ]
        );
        assert_eq!(built.headers()["apikey"], "anon-key");
        assert_eq!(built.headers()[header::AUTHORIZATION], "Bearer anon-key");
    }

    #[test]
    fn mutations_ask_for_the_affected_rows() {
        let backend = backend("https://demo.supabase.co/");
        let mut patch = Row::new();
        patch.insert("project".into(), Value::Null);
        let request = StoreRequest {
            table: "users".to_string(),
            operation: Operation::Update { patch },
            filters: vec![Filter::eq("id", "u1")],
        };
        let built = backend.build_table_request(&request).unwrap().build().unwrap();

        assert_eq!(built.method(), &Method::PATCH);
        assert_eq!(built.headers()["Prefer"], "return=representation");
        assert_eq!(built.url().query(), Some("id=eq.u1"));
    }

    #[test]
    fn keeps_base_path_prefix() {
        let backend = backend("http://localhost:54321/project");
        assert_eq!(
            backend.endpoint("rest/v1/users").unwrap().as_str(),
            "http://localhost:54321/project/rest/v1/users"
        );
    }

    #[test]
    fn decodes_error_bodies() {
        let err = api_error(400, r#"{"code":"22P02","message":"invalid input syntax for type uuid"}"#);
        match err {
            StoreError::Api { status, code, message } => {
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("22P02"));
                assert_eq!(message, "invalid input syntax for type uuid");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#).as_deref(),
            Some("Invalid login credentials")
        );
        assert_eq!(api_error(502, "").to_string(), "store returned status 502");
    }

    #[tokio::test]
    async fn select_decodes_arrays_objects_and_empty_bodies() {
        let server = MockServer::start().await;
        let backend = backend(&server.uri());

        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .and(query_param("email", "eq.bob@acme.test"))
            .and(header_eq("apikey", "anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "name": "Bob" },
                { "id": 2, "name": "Bea" },
                "not a row",
            ])))
            .mount(&server)
            .await;
        let rows = backend.execute(select_users()).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["name"], "Bea");

        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 7 })))
            .mount(&server)
            .await;
        let rows = backend.execute(select_users()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], 7);

        server.reset().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/users"))
            .and(header_eq("Prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        let request = StoreRequest {
            table: "users".to_string(),
            operation: Operation::Delete,
            filters: vec![Filter::eq("email", "ghost@nowhere.test")],
        };
        assert!(backend.execute(request).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_sends_rows_and_surfaces_postgrest_errors() {
        let server = MockServer::start().await;
        let backend = backend(&server.uri());

        let mut row = Row::new();
        row.insert("name".into(), json!("Warehouse"));
        Mock::given(method("POST"))
            .and(path("/rest/v1/projects"))
            .and(body_json(json!([{ "name": "Warehouse" }])))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "22P02",
                "message": "invalid input syntax for type bigint",
                "details": null,
                "hint": null,
            })))
            .mount(&server)
            .await;

        let request = StoreRequest {
            table: "projects".to_string(),
            operation: Operation::Insert { rows: vec![row] },
            filters: Vec::new(),
        };
        match backend.execute(request).await {
            Err(StoreError::Api { status, code, message }) => {
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("22P02"));
                assert_eq!(message, "invalid input syntax for type bigint");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn sign_in_uses_the_password_grant() {
        let server = MockServer::start().await;
        let backend = backend(&server.uri());

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(body_json(json!({ "email": "admin@portal.test", "password": "secret" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "jwt-token",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "refresh-token",
                "user": { "id": "b0000000-0000-4000-8000-000000000001", "email": "admin@portal.test" },
            })))
            .mount(&server)
            .await;

        let auth = backend
            .sign_in_with_password(&Credentials::new("admin@portal.test", "secret"))
            .await
            .unwrap();
        assert_eq!(auth.user.id, "b0000000-0000-4000-8000-000000000001");
        assert_eq!(auth.session.access_token, "jwt-token");
        assert_eq!(auth.session.refresh_token, "refresh-token");
        assert_eq!(auth.session.expires_in, 3600);
    }

    #[tokio::test]
    async fn sign_in_rejection_carries_the_provider_message() {
        let server = MockServer::start().await;
        let backend = backend(&server.uri());

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials",
            })))
            .mount(&server)
            .await;

        let err = backend
            .sign_in_with_password(&Credentials::new("admin@portal.test", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(&err, StoreError::Auth(message) if message == "Invalid login credentials"));
    }

    #[tokio::test]
    async fn sign_up_accepts_both_response_shapes() {
        let server = MockServer::start().await;
        let backend = backend(&server.uri());

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "c0000000-0000-4000-8000-000000000001",
                "email": "frank@globex.test",
                "role": "authenticated",
            })))
            .mount(&server)
            .await;
        let user = backend.sign_up(&Credentials::new("frank@globex.test", "pw")).await.unwrap();
        assert_eq!(user.id, "c0000000-0000-4000-8000-000000000001");
        assert_eq!(user.role.as_deref(), Some("authenticated"));

        server.reset().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "jwt-token",
                "refresh_token": "refresh-token",
                "expires_in": 3600,
                "user": { "id": "c0000000-0000-4000-8000-000000000002", "email": "gina@globex.test" },
            })))
            .mount(&server)
            .await;
        let user = backend.sign_up(&Credentials::new("gina@globex.test", "pw")).await.unwrap();
        assert_eq!(user.id, "c0000000-0000-4000-8000-000000000002");
        assert_eq!(user.email.as_deref(), Some("gina@globex.test"));
    }

    #[tokio::test]
    async fn health_check_follows_the_auth_health_endpoint() {
        let server = MockServer::start().await;
        let backend = backend(&server.uri());

        Mock::given(method("GET"))
            .and(path("/auth/v1/health"))
            .and(header_eq("apikey", "anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "GoTrue" })))
            .mount(&server)
            .await;
        assert!(backend.health_check().await.is_ok());

        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        assert!(matches!(
            backend.health_check().await,
            Err(StoreError::Api { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn zero_timeout_leaves_requests_unbounded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
            .mount(&server)
            .await;

        let backend = backend_with_timeout(&server.uri(), Some(0));
        assert_eq!(backend.execute(select_users()).await.unwrap().len(), 1);
    }
}
