use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use incollege_shared::clients::db::{spawn_read, spawn_write};
use incollege_shared::errors::AppResult;
use incollege_shared::middleware::JsonBody;
use incollege_shared::types::auth::AuthUser;
use incollege_shared::types::{ApiResponse, MessageBody};

use crate::models::UserPreferences;
use crate::services::preferences_service::{self, PreferenceUpdate};
use crate::services::user_service;
use crate::AppState;

// --- GET /user-preferences ---

pub async fn get_preferences(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UserPreferences>>> {
    let prefs = spawn_read(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        preferences_service::get(conn, auth.id)
    })
    .await?;
    Ok(Json(ApiResponse::ok(prefs)))
}

// --- POST /set-user-preferences ---

pub async fn set_preferences(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(update): JsonBody<PreferenceUpdate>,
) -> AppResult<Json<ApiResponse<MessageBody>>> {
    spawn_write(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        preferences_service::set(conn, auth.id, update)
    })
    .await?;
    Ok(Json(ApiResponse::ok(MessageBody::new("preferences updated successfully"))))
}
