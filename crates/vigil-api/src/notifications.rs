use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use vigil_db::models::NotificationRow;
use vigil_types::api::{ApiResponse, NotificationResponse, UnreadCount};

use crate::error::ApiError;
use crate::middleware::Claims;
use crate::{AppState, blocking};

pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = {
        let state = state.clone();
        let user_id = claims.sub.to_string();
        blocking(move || state.db.get_notifications_for_user(&user_id)).await?
    };

    Ok(Json(ApiResponse::ok(
        rows.into_iter().map(to_response).collect::<Vec<_>>(),
    )))
}

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let count = {
        let state = state.clone();
        let user_id = claims.sub.to_string();
        blocking(move || state.db.unread_notification_count(&user_id)).await?
    };

    Ok(Json(ApiResponse::ok(UnreadCount { count })))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = {
        let state = state.clone();
        let id = id.to_string();
        let user_id = claims.sub.to_string();
        blocking(move || state.db.mark_notification_read(&id, &user_id)).await?
    };
    if updated == 0 {
        return Err(ApiError::not_found("Notification not found"));
    }

    Ok(Json(ApiResponse::message("Notification marked as read")))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    {
        let state = state.clone();
        let user_id = claims.sub.to_string();
        blocking(move || state.db.mark_all_notifications_read(&user_id)).await?;
    }

    Ok(Json(ApiResponse::message("All notifications marked as read")))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = {
        let state = state.clone();
        let id = id.to_string();
        let user_id = claims.sub.to_string();
        blocking(move || state.db.delete_notification(&id, &user_id)).await?
    };
    if deleted == 0 {
        return Err(ApiError::not_found("Notification not found"));
    }

    Ok(Json(ApiResponse::message("Notification deleted")))
}

fn to_response(row: NotificationRow) -> NotificationResponse {
    NotificationResponse {
        id: crate::parse_uuid(&row.id, "notification id"),
        complaint_id: row
            .complaint_id
            .as_deref()
            .map(|id| crate::parse_uuid(id, "notification complaint_id")),
        title: row.title,
        message: row.message,
        kind: row.kind,
        is_read: row.is_read,
        created_at: crate::parse_db_timestamp(&row.created_at, "notification"),
        complaint_title: row.complaint_title,
    }
}
