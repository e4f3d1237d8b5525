use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use vigil_types::api::{
    AnalyticsData, ApiResponse, CategoryCount, MonthlyCount, StatusOverview,
};

use crate::complaints::to_response;
use crate::error::ApiError;
use crate::middleware::Claims;
use crate::{AppState, blocking};

pub async fn get_stats(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let (overview, categories, trends) = {
        let state = state.clone();
        blocking(move || {
            let overview = state.db.status_overview()?;
            let categories = state.db.category_counts()?;
            let trends = state.db.monthly_trends()?;
            Ok((overview, categories, trends))
        })
        .await?
    };

    Ok(Json(ApiResponse::ok(AnalyticsData {
        overview: StatusOverview {
            total: overview.total,
            pending: overview.pending,
            investigating: overview.investigating,
            resolved: overview.resolved,
            rejected: overview.rejected,
        },
        categories: categories
            .into_iter()
            .map(|c| CategoryCount {
                category: c.category,
                count: c.count,
            })
            .collect(),
        trends: trends
            .into_iter()
            .map(|t| MonthlyCount {
                month: t.month,
                count: t.count,
            })
            .collect(),
    })))
}

/// GET /api/analytics/track/:tracking_code — the public status lookup for
/// anonymous submitters. Exact, case-sensitive equality on the code.
pub async fn track_complaint(
    State(state): State<AppState>,
    Path(tracking_code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = {
        let state = state.clone();
        blocking(move || state.db.get_complaint_by_tracking_code(&tracking_code)).await?
    }
    .ok_or_else(|| ApiError::not_found("Complaint not found with this tracking code"))?;

    Ok(Json(ApiResponse::ok(to_response(row))))
}
