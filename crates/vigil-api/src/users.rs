use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use vigil_db::models::UserRow;
use vigil_types::api::{ApiResponse, UpdateProfileRequest, UserProfile};

use crate::error::ApiError;
use crate::middleware::Claims;
use crate::{AppState, blocking};

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    if claims.sub != id {
        return Err(ApiError::Unauthorized);
    }

    let user = {
        let state = state.clone();
        let id = id.to_string();
        blocking(move || state.db.get_user_by_id(&id)).await?
    }
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(ApiResponse::ok_with(
        "User profile retrieved successfully",
        to_profile(user),
    )))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if claims.sub != id {
        return Err(ApiError::Unauthorized);
    }
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.phone.trim().is_empty() {
        return Err(ApiError::validation("Please provide all required fields"));
    }

    let updated = {
        let state = state.clone();
        let id = id.to_string();
        blocking(move || {
            let n = state.db.update_user(
                &id,
                &req.name,
                &req.email,
                &req.phone,
                req.address.as_deref(),
            )?;
            if n == 0 {
                return Ok(None);
            }
            state.db.get_user_by_id(&id)
        })
        .await?
    }
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(ApiResponse::ok_with(
        "Profile updated successfully",
        to_profile(updated),
    )))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    if claims.sub != id {
        return Err(ApiError::Unauthorized);
    }

    let deleted = {
        let state = state.clone();
        let id = id.to_string();
        blocking(move || state.db.delete_user(&id)).await?
    };
    if deleted == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    Ok(Json(ApiResponse::message("Account deleted successfully")))
}

fn to_profile(row: UserRow) -> UserProfile {
    UserProfile {
        id: crate::parse_uuid(&row.id, "user id"),
        name: row.name,
        email: row.email,
        phone: row.phone,
        address: row.address,
        created_at: crate::parse_db_timestamp(&row.created_at, "user"),
    }
}
