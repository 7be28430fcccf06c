use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use incollege_shared::clients::db::{spawn_read, spawn_write};
use incollege_shared::errors::AppResult;
use incollege_shared::middleware::{validate_request, JsonBody};
use incollege_shared::types::auth::AuthUser;
use incollege_shared::types::{ApiResponse, MessageBody};

use crate::models::{ConnectedUser, UserSummary};
use crate::services::connection_service::{self, ConsiderOutcome, NamedUser};
use crate::services::user_service;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UsernameRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
}

// --- POST /make-connection-request ---

pub async fn make_request(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<UsernameRequest>,
) -> AppResult<Json<ApiResponse<MessageBody>>> {
    validate_request(&req)?;

    let target = spawn_write(&state.db, move |conn| {
        let requester = user_service::require_user(conn, auth.id)?;
        connection_service::request_connection(conn, &requester, &req.username)
    })
    .await?;

    Ok(Json(ApiResponse::ok(MessageBody::new(format!(
        "connection request sent to {}",
        target.username
    )))))
}

// --- GET /pending-requests ---

pub async fn pending_requests(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<UserSummary>>>> {
    let senders = spawn_read(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        connection_service::pending_requests(conn, auth.id)
    })
    .await?;
    Ok(Json(ApiResponse::ok(senders)))
}

// --- POST /accept-requests ---

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsiderRequestsRequest {
    #[serde(rename = "users-to-accept", default)]
    pub users_to_accept: Vec<NamedUser>,
    #[serde(rename = "users-to-deny", default)]
    pub users_to_deny: Vec<NamedUser>,
}

pub async fn consider_requests(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<ConsiderRequestsRequest>,
) -> AppResult<Json<ApiResponse<ConsiderOutcome>>> {
    let accept: Vec<String> = req.users_to_accept.into_iter().map(|u| u.username).collect();
    let deny: Vec<String> = req.users_to_deny.into_iter().map(|u| u.username).collect();

    let outcome = spawn_write(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        connection_service::consider_requests(conn, auth.id, &accept, &deny)
    })
    .await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

// --- GET /connections ---

pub async fn list_connections(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ConnectedUser>>>> {
    let connected = spawn_read(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        connection_service::list_connections(conn, auth.id)
    })
    .await?;
    Ok(Json(ApiResponse::ok(connected)))
}

// --- POST /disconnect ---

pub async fn disconnect(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<UsernameRequest>,
) -> AppResult<Json<ApiResponse<MessageBody>>> {
    validate_request(&req)?;

    let confirmation = format!("successfully disconnected from {}", req.username);
    spawn_write(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        connection_service::disconnect(conn, auth.id, &req.username)
    })
    .await?;
    Ok(Json(ApiResponse::ok(MessageBody::new(confirmation))))
}
