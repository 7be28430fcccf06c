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

use crate::models::{AppliedJob, ExpiredApplication, JobPosting, PostingWithOwner};
use crate::services::job_service::{self, ApplicationInput, JobInput};
use crate::services::user_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobIdRequest {
    pub job_id: i32,
}

// --- POST /post-job ---

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PostJobRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "employer is required"))]
    pub employer: String,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
    pub salary: String,
}

pub async fn post_job(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<PostJobRequest>,
) -> AppResult<Json<ApiResponse<JobPosting>>> {
    validate_request(&req)?;

    let input = JobInput {
        title: req.title,
        description: req.description,
        employer: req.employer,
        location: req.location,
        salary: req.salary,
    };
    let (limit, scope) = (state.config.job_posting_limit, state.config.job_posting_cap_scope);

    let posting = spawn_write(&state.db, move |conn| {
        let owner = user_service::require_user(conn, auth.id)?;
        job_service::post_job(conn, &owner, input, limit, scope)
    })
    .await?;
    Ok(Json(ApiResponse::ok_with_message(posting, "job posting created successfully")))
}

// --- GET /job-postings ---

pub async fn list_postings(State(state): State<Arc<AppState>>) -> AppResult<Json<ApiResponse<Vec<PostingWithOwner>>>> {
    let postings = spawn_read(&state.db, job_service::list_postings).await?;
    Ok(Json(ApiResponse::ok(postings)))
}

// --- GET /jobs-posted ---

pub async fn list_own_postings(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<JobPosting>>>> {
    let postings = spawn_read(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        job_service::list_own_postings(conn, auth.id)
    })
    .await?;
    Ok(Json(ApiResponse::ok(postings)))
}

// --- POST /delete-job ---

pub async fn delete_job(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<JobIdRequest>,
) -> AppResult<Json<ApiResponse<MessageBody>>> {
    spawn_write(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        job_service::delete_job(conn, auth.id, req.job_id)
    })
    .await?;
    Ok(Json(ApiResponse::ok(MessageBody::new("job posting deleted successfully"))))
}

// --- POST /apply ---

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplyRequest {
    pub job_id: i32,
    pub graduation_date: String,
    pub ideal_start_date: String,
    pub cover_letter: String,
}

pub async fn apply(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<ApplyRequest>,
) -> AppResult<Json<ApiResponse<MessageBody>>> {
    let input = ApplicationInput {
        graduation_date: req.graduation_date,
        ideal_start_date: req.ideal_start_date,
        cover_letter: req.cover_letter,
    };
    let today = Utc::now().date_naive();

    spawn_write(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        job_service::apply(conn, auth.id, req.job_id, input, today)
    })
    .await?;
    Ok(Json(ApiResponse::ok(MessageBody::new("application submitted successfully"))))
}

// --- GET /applications ---

pub async fn list_applied(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<AppliedJob>>>> {
    let applied = spawn_read(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        job_service::list_applied(conn, auth.id)
    })
    .await?;
    Ok(Json(ApiResponse::ok(applied)))
}

// --- GET /unapplied ---

pub async fn list_unapplied(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<PostingWithOwner>>>> {
    let postings = spawn_read(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        job_service::list_unapplied(conn, auth.id)
    })
    .await?;
    Ok(Json(ApiResponse::ok(postings)))
}

// --- GET /expired-applications ---

pub async fn expired_applications(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ExpiredApplication>>>> {
    let expired = spawn_write(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        job_service::take_expired_applications(conn, auth.id)
    })
    .await?;
    Ok(Json(ApiResponse::ok(expired)))
}

// --- POST /mark ---

pub async fn mark(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<JobIdRequest>,
) -> AppResult<Json<ApiResponse<MessageBody>>> {
    spawn_write(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        job_service::mark(conn, auth.id, req.job_id)
    })
    .await?;
    Ok(Json(ApiResponse::ok(MessageBody::new("job marked successfully"))))
}

// --- POST /unmark ---

pub async fn unmark(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<JobIdRequest>,
) -> AppResult<Json<ApiResponse<MessageBody>>> {
    spawn_write(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        job_service::unmark(conn, auth.id, req.job_id)
    })
    .await?;
    Ok(Json(ApiResponse::ok(MessageBody::new("job unmarked successfully"))))
}

// --- GET /marked ---

pub async fn list_marked(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<i32>>>> {
    let ids = spawn_read(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        job_service::list_marked(conn, auth.id)
    })
    .await?;
    Ok(Json(ApiResponse::ok(ids)))
}
