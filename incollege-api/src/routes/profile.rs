use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use incollege_shared::clients::db::{spawn_read, spawn_write};
use incollege_shared::errors::AppResult;
use incollege_shared::middleware::JsonBody;
use incollege_shared::types::auth::AuthUser;
use incollege_shared::types::{ApiResponse, MessageBody};

use crate::models::{Experience, Profile};
use crate::services::experience_service::{self, ExperienceInput};
use crate::services::profile_service::{self, ProfileEdit, ProfileView};
use crate::services::user_service;
use crate::AppState;

// --- GET /profile ---

pub async fn get_profile(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<ProfileView>>> {
    let profile = spawn_read(&state.db, move |conn| {
        let user = user_service::require_user(conn, auth.id)?;
        profile_service::get_profile(conn, &user)
    })
    .await?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- POST /edit-profile ---

pub async fn edit_profile(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(edit): JsonBody<ProfileEdit>,
) -> AppResult<Json<ApiResponse<MessageBody>>> {
    spawn_write(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        profile_service::edit_profile(conn, auth.id, edit)
    })
    .await?;
    Ok(Json(ApiResponse::ok(MessageBody::new("successfully edited profile"))))
}

// --- POST /friend-profile ---

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FriendProfileRequest {
    pub id: i32,
}

pub async fn friend_profile(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<FriendProfileRequest>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let profile = spawn_read(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        profile_service::friend_profile(conn, auth.id, req.id)
    })
    .await?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- GET /job-history ---

pub async fn job_history(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Experience>>>> {
    let entries = spawn_read(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        experience_service::list(conn, auth.id)
    })
    .await?;
    Ok(Json(ApiResponse::ok(entries)))
}

// --- POST /add-job-history ---

pub async fn add_job_history(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<ExperienceInput>,
) -> AppResult<Json<ApiResponse<MessageBody>>> {
    let max_entries = state.config.max_experiences;
    spawn_write(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        experience_service::add(conn, auth.id, input, max_entries)
    })
    .await?;
    Ok(Json(ApiResponse::ok(MessageBody::new("successfully added job history"))))
}

// --- POST /edit-job-history ---

pub async fn edit_job_history(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<serde_json::Map<String, serde_json::Value>>,
) -> AppResult<Json<ApiResponse<MessageBody>>> {
    let (id, change) = experience_service::parse_edit(body)?;
    spawn_write(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        experience_service::edit(conn, auth.id, id, change)
    })
    .await?;
    Ok(Json(ApiResponse::ok(MessageBody::new("successfully edited job history"))))
}

// --- POST /remove-job-history ---

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoveJobHistoryRequest {
    pub id: i32,
}

pub async fn remove_job_history(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<RemoveJobHistoryRequest>,
) -> AppResult<Json<ApiResponse<MessageBody>>> {
    spawn_write(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        experience_service::remove(conn, auth.id, req.id)
    })
    .await?;
    Ok(Json(ApiResponse::ok(MessageBody::new("successfully removed job history"))))
}
