use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use incollege_shared::clients::db::{spawn_read, spawn_write};
use incollege_shared::errors::AppResult;
use incollege_shared::middleware::{validate_request, JsonBody};
use incollege_shared::types::auth::AuthUser;
use incollege_shared::types::{ApiResponse, MessageBody};

use crate::models::{MessageView, UnreadSummary};
use crate::routes::connections::UsernameRequest;
use crate::services::{messaging_service, user_service};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct MessageRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,
}

// --- GET /unread-messages ---

pub async fn unread_messages(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<UnreadSummary>>>> {
    let summary = spawn_read(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        messaging_service::unread_summary(conn, auth.id)
    })
    .await?;
    Ok(Json(ApiResponse::ok(summary)))
}

// --- POST /messages ---

pub async fn fetch_messages(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<UsernameRequest>,
) -> AppResult<Json<ApiResponse<Vec<MessageView>>>> {
    validate_request(&req)?;

    let messages = spawn_write(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        messaging_service::fetch_messages(conn, auth.id, &req.username)
    })
    .await?;
    Ok(Json(ApiResponse::ok(messages)))
}

// --- POST /message ---

pub async fn send_message(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<MessageRequest>,
) -> AppResult<Json<ApiResponse<MessageBody>>> {
    validate_request(&req)?;

    let now = Utc::now().naive_utc();
    let confirmation = format!("successfully messaged {}", req.username);
    spawn_write(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        messaging_service::send_message(conn, auth.id, &req.username, &req.content, now)
    })
    .await?;
    Ok(Json(ApiResponse::ok(MessageBody::new(confirmation))))
}

// --- POST /start-conversation ---

pub async fn start_conversation(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<MessageRequest>,
) -> AppResult<Json<ApiResponse<MessageBody>>> {
    validate_request(&req)?;

    let now = Utc::now().naive_utc();
    let confirmation = format!("successfully messaged {}", req.username);
    spawn_write(&state.db, move |conn| {
        let initiator = user_service::require_user(conn, auth.id)?;
        messaging_service::start_conversation(conn, &initiator, &req.username, &req.content, now)
    })
    .await?;
    Ok(Json(ApiResponse::ok(MessageBody::new(confirmation))))
}

// --- POST /delete-conversation ---

pub async fn delete_conversation(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<UsernameRequest>,
) -> AppResult<Json<ApiResponse<MessageBody>>> {
    validate_request(&req)?;

    let confirmation = format!("conversation with {} deleted", req.username);
    spawn_write(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        messaging_service::delete_conversation(conn, auth.id, &req.username)
    })
    .await?;
    Ok(Json(ApiResponse::ok(MessageBody::new(confirmation))))
}
