use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use incollege_shared::clients::db::{spawn_read, spawn_write};
use incollege_shared::errors::AppResult;
use incollege_shared::middleware::{validate_request, JsonBody};
use incollege_shared::types::auth::TokenResponse;
use incollege_shared::types::{ApiResponse, MessageBody};

use crate::models::{Tier, UserSummary};
use crate::services::user_service::{self, LookupFilter, SignupInput};
use crate::services::{password_service, token_service};
use crate::AppState;

// --- GET /list-users ---

pub async fn list_users(State(state): State<Arc<AppState>>) -> AppResult<Json<ApiResponse<Vec<UserSummary>>>> {
    let users = spawn_read(&state.db, user_service::list_users).await?;
    Ok(Json(ApiResponse::ok(users)))
}

// --- POST /lookup-user ---

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookupRequest {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub university: Option<String>,
    pub major: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LookupResponse {
    pub matches: Vec<UserSummary>,
}

pub async fn lookup_user(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<LookupRequest>,
) -> AppResult<Json<ApiResponse<LookupResponse>>> {
    let filter = LookupFilter {
        firstname: req.firstname,
        lastname: req.lastname,
        university: req.university,
        major: req.major,
    };
    let matches = spawn_read(&state.db, move |conn| user_service::lookup_users(conn, &filter)).await?;
    Ok(Json(ApiResponse::ok(LookupResponse { matches })))
}

// --- POST /login ---

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[serde(rename = "passwordHash")]
    #[validate(length(min = 1, message = "passwordHash is required"))]
    pub password_hash: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    validate_request(&req)?;

    let user = spawn_read(&state.db, move |conn| {
        user_service::authenticate(conn, &req.username, &req.password_hash)
    })
    .await?;
    let token = token_service::create_access_token(&user, &state.config.jwt_secret, state.config.jwt_ttl_secs)?;

    tracing::info!(user_id = user.id, "user logged in");
    Ok(Json(ApiResponse::ok(token)))
}

// --- POST /add-user ---

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "firstname is required"))]
    pub firstname: String,
    #[validate(length(min = 1, message = "lastname is required"))]
    pub lastname: String,
    #[serde(rename = "passwordHash")]
    #[validate(length(min = 1, message = "passwordHash is required"))]
    pub password_hash: String,
    pub tier: Tier,
    pub university: String,
    pub major: String,
}

pub async fn add_user(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> AppResult<Json<ApiResponse<MessageBody>>> {
    validate_request(&req)?;

    let hashed_password = password_service::hash_password_blocking(req.password_hash).await?;
    let input = SignupInput {
        username: req.username,
        firstname: req.firstname,
        lastname: req.lastname,
        hashed_password,
        tier: req.tier,
        university: req.university,
        major: req.major,
    };
    let max_users = state.config.max_users;
    spawn_write(&state.db, move |conn| user_service::signup(conn, &input, max_users)).await?;

    Ok(Json(ApiResponse::ok(MessageBody::new("user successfully added"))))
}
