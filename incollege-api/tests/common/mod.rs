#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use incollege_api::config::AppConfig;
use incollege_api::{build_router, run_migrations, AppState};
use incollege_shared::clients::db::{create_pool, get_conn, DbPool};

pub struct TestApp {
    pub router: Router,
    pub pool: DbPool,
    pub config: AppConfig,
    _dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let database_url = dir.path().join("incollege.db").to_string_lossy().into_owned();
        let config = AppConfig { database_url, ..config };

        let pool = create_pool(&config.database_url, 8).expect("pool");
        {
            let mut conn = get_conn(&pool).expect("conn");
            run_migrations(&mut conn).expect("migrations");
        }

        let state = Arc::new(AppState {
            db: pool.clone(),
            config: config.clone(),
            metrics_handle: None,
        });

        Self {
            router: build_router(state),
            pool,
            config,
            _dir: dir,
        }
    }

    pub async fn request(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, token, Some(body)).await
    }

    /// Sign up and log in, returning the bearer token.
    pub async fn register(&self, username: &str, tier: &str) -> String {
        let (status, body) = self
            .post(
                "/add-user",
                None,
                json!({
                    "username": username,
                    "firstname": capitalize(username),
                    "lastname": "Tester",
                    "passwordHash": format!("{username}-digest"),
                    "tier": tier,
                    "university": "university of south florida",
                    "major": "computer science",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "signup {username}: {body}");
        self.login(username).await
    }

    pub async fn login(&self, username: &str) -> String {
        let (status, body) = self
            .post(
                "/login",
                None,
                json!({ "username": username, "passwordHash": format!("{username}-digest") }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login {username}: {body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn error_kind(body: &Value) -> &str {
    body["error"]["kind"].as_str().unwrap_or_default()
}
