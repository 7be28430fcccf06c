use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use incollege_shared::clients::db::spawn_write;
use incollege_shared::errors::AppResult;
use incollege_shared::middleware::JsonBody;
use incollege_shared::types::auth::AuthUser;
use incollege_shared::types::ApiResponse;

use crate::models::{NotificationContext, NotificationView};
use crate::services::{notification_service, user_service};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationsRequest {
    #[serde(alias = "menu")]
    pub context: NotificationContext,
}

// --- POST /notifications ---

pub async fn fetch_notifications(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<NotificationsRequest>,
) -> AppResult<Json<ApiResponse<Vec<NotificationView>>>> {
    let delivered = spawn_write(&state.db, move |conn| {
        user_service::require_user(conn, auth.id)?;
        notification_service::take(conn, auth.id, req.context)
    })
    .await?;
    Ok(Json(ApiResponse::ok(delivered)))
}
