use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use tracing::warn;
use uuid::Uuid;

use vigil_db::models::{ComplaintRow, NewComplaint, NewNotification};
use vigil_types::api::{
    ApiResponse, ComplaintCreated, ComplaintResponse, UpdateComplaintRequest, UpdateStatusRequest,
};
use vigil_types::models::{ComplaintStatus, status_notification};

use crate::error::ApiError;
use crate::middleware::{Claims, claims_from_headers};
use crate::uploads::{MAX_EVIDENCE_FILE_SIZE, MAX_EVIDENCE_FILES, store_evidence};
use crate::{AppState, blocking, tracking};

#[derive(Default)]
struct ComplaintForm {
    title: Option<String>,
    category: Option<String>,
    location: Option<String>,
    description: Option<String>,
    is_anonymous: bool,
    files: Vec<(Option<String>, axum::body::Bytes)>,
}

/// POST /api/complaints — multipart form with up to 5 `evidence` files.
/// The route itself is public: anonymous submissions carry no token, and
/// everything else must authenticate. That decision can only be made after
/// the form is parsed, so the handler enforces auth rather than middleware.
pub async fn create_complaint(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart).await?;

    let claims = if form.is_anonymous {
        None
    } else {
        Some(claims_from_headers(&headers, &state.jwt_secret).ok_or(ApiError::Unauthorized)?)
    };

    let (Some(title), Some(category), Some(location), Some(description)) = (
        non_empty(form.title),
        non_empty(form.category),
        non_empty(form.location),
        non_empty(form.description),
    ) else {
        return Err(ApiError::validation("Please provide all required fields"));
    };

    let mut evidence_files = Vec::with_capacity(form.files.len());
    for (file_name, bytes) in &form.files {
        evidence_files.push(store_evidence(&state.upload_dir, file_name.as_deref(), bytes).await?);
    }

    let tracking_code = if form.is_anonymous {
        Some(tracking::generate_tracking_code()?)
    } else {
        None
    };

    let complaint_id = Uuid::new_v4();
    {
        let state = state.clone();
        let id = complaint_id.to_string();
        let user_id = claims.as_ref().map(|c| c.sub.to_string());
        let code = tracking_code.clone();
        let is_anonymous = form.is_anonymous;
        let evidence_json = if evidence_files.is_empty() {
            None
        } else {
            Some(
                serde_json::to_string(&evidence_files)
                    .map_err(|e| ApiError::Internal(e.into()))?,
            )
        };
        let template = status_notification(ComplaintStatus::Pending.as_str());
        blocking(move || {
            let note_id = Uuid::new_v4().to_string();
            let note = template.as_ref().map(|t| NewNotification {
                id: &note_id,
                title: t.title,
                message: t.message,
                kind: t.kind.as_str(),
            });
            state.db.create_complaint(
                &NewComplaint {
                    id: &id,
                    user_id: user_id.as_deref(),
                    title: &title,
                    category: &category,
                    location: &location,
                    description: &description,
                    evidence_files: evidence_json.as_deref(),
                    is_anonymous,
                    tracking_code: code.as_deref(),
                },
                note.as_ref(),
            )
        })
        .await?;
    }

    let message = if form.is_anonymous {
        "Anonymous complaint filed successfully. Save your tracking code!"
    } else {
        "Complaint filed successfully"
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with(
            message,
            ComplaintCreated {
                complaint_id,
                tracking_code,
                evidence_files,
            },
        )),
    ))
}

async fn read_form(mut multipart: Multipart) -> Result<ComplaintForm, ApiError> {
    let mut form = ComplaintForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::validation("Malformed multipart request"))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "evidence" {
            if form.files.len() == MAX_EVIDENCE_FILES {
                return Err(ApiError::validation(
                    "At most 5 evidence files are allowed",
                ));
            }
            let file_name = field.file_name().map(|s| s.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|_| ApiError::validation("Could not read evidence file"))?;
            if bytes.len() > MAX_EVIDENCE_FILE_SIZE {
                return Err(ApiError::validation("Evidence files are limited to 10 MB"));
            }
            form.files.push((file_name, bytes));
        } else {
            let value = field
                .text()
                .await
                .map_err(|_| ApiError::validation("Malformed multipart request"))?;
            match name.as_str() {
                "title" => form.title = Some(value),
                "category" => form.category = Some(value),
                "location" => form.location = Some(value),
                "description" => form.description = Some(value),
                "is_anonymous" => form.is_anonymous = value == "true",
                _ => {}
            }
        }
    }

    Ok(form)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn get_all_complaints(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = {
        let state = state.clone();
        blocking(move || state.db.get_all_complaints()).await?
    };

    Ok(Json(ApiResponse::ok_with(
        "All complaints retrieved successfully",
        rows.into_iter().map(to_response).collect::<Vec<_>>(),
    )))
}

pub async fn get_complaint(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let row = {
        let state = state.clone();
        let id = id.to_string();
        blocking(move || state.db.get_complaint(&id)).await?
    }
    .ok_or_else(|| ApiError::not_found("Complaint not found"))?;

    Ok(Json(ApiResponse::ok_with(
        "Complaint retrieved successfully",
        to_response(row),
    )))
}

pub async fn get_user_complaints(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = {
        let state = state.clone();
        let user_id = user_id.to_string();
        blocking(move || state.db.get_complaints_for_user(&user_id)).await?
    };

    Ok(Json(ApiResponse::ok_with(
        "Complaints retrieved successfully",
        rows.into_iter().map(to_response).collect::<Vec<_>>(),
    )))
}

pub async fn update_complaint(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(_claims): Extension<Claims>,
    Json(req): Json<UpdateComplaintRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.trim().is_empty()
        || req.category.trim().is_empty()
        || req.location.trim().is_empty()
        || req.description.trim().is_empty()
    {
        return Err(ApiError::validation("Please provide all required fields"));
    }

    let updated = {
        let state = state.clone();
        let id = id.to_string();
        blocking(move || {
            state
                .db
                .update_complaint(&id, &req.title, &req.category, &req.location, &req.description)
        })
        .await?
    };
    if updated == 0 {
        return Err(ApiError::not_found("Complaint not found"));
    }

    Ok(Json(ApiResponse::message("Complaint updated successfully")))
}

/// PUT /api/complaints/:id/status — writes the status verbatim. Statuses
/// with a notification template fan out exactly one notification to the
/// owning user, in the same transaction as the status write; unknown
/// statuses and anonymous complaints update silently.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(_claims): Extension<Claims>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.status.trim().is_empty() {
        return Err(ApiError::validation("Please provide status"));
    }

    let template = status_notification(&req.status);
    let found = {
        let state = state.clone();
        let id = id.to_string();
        let status = req.status.clone();
        blocking(move || {
            let note_id = Uuid::new_v4().to_string();
            let note = template.as_ref().map(|t| NewNotification {
                id: &note_id,
                title: t.title,
                message: t.message,
                kind: t.kind.as_str(),
            });
            state.db.update_complaint_status(&id, &status, note.as_ref())
        })
        .await?
    };
    if !found {
        return Err(ApiError::not_found("Complaint not found"));
    }

    Ok(Json(ApiResponse::message(
        "Complaint status updated successfully",
    )))
}

pub async fn delete_complaint(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = {
        let state = state.clone();
        let id = id.to_string();
        blocking(move || state.db.delete_complaint(&id)).await?
    };
    if deleted == 0 {
        return Err(ApiError::not_found("Complaint not found"));
    }

    Ok(Json(ApiResponse::message("Complaint deleted successfully")))
}

pub(crate) fn to_response(row: ComplaintRow) -> ComplaintResponse {
    let evidence_files = row
        .evidence_files
        .as_deref()
        .map(|raw| {
            serde_json::from_str(raw).unwrap_or_else(|e| {
                warn!("Corrupt evidence_files on complaint '{}': {}", row.id, e);
                Vec::new()
            })
        })
        .unwrap_or_default();

    ComplaintResponse {
        id: crate::parse_uuid(&row.id, "complaint id"),
        user_id: row.user_id.as_deref().map(|id| crate::parse_uuid(id, "complaint user_id")),
        title: row.title,
        category: row.category,
        location: row.location,
        description: row.description,
        evidence_files,
        is_anonymous: row.is_anonymous,
        tracking_code: row.tracking_code,
        status: row.status,
        created_at: crate::parse_db_timestamp(&row.created_at, "complaint"),
        user_name: row.user_name,
        user_email: row.user_email,
        user_phone: row.user_phone,
    }
}
