use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Response envelope --

/// Every JSON response uses the same envelope:
/// `{ "success": bool, "message"?: string, "data"?: T }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn ok_with(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthData {
    pub user_id: Uuid,
    pub name: String,
    pub token: String,
}

// -- Users --

#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
}

// -- Complaints --

#[derive(Debug, Serialize, Deserialize)]
pub struct ComplaintResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub title: String,
    pub category: String,
    pub location: String,
    pub description: String,
    pub evidence_files: Vec<String>,
    pub is_anonymous: bool,
    pub tracking_code: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    /// Contact details of the owning user, joined on lookup.
    /// Always null for anonymous complaints.
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_phone: Option<String>,
}

/// Payload returned from complaint creation. The tracking code is only
/// ever surfaced here — anonymous submitters must save it.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComplaintCreated {
    pub complaint_id: Uuid,
    pub tracking_code: Option<String>,
    pub evidence_files: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateComplaintRequest {
    pub title: String,
    pub category: String,
    pub location: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// -- Notifications --

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub complaint_id: Option<Uuid>,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub complaint_title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnreadCount {
    pub count: i64,
}

// -- Analytics --

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyticsData {
    pub overview: StatusOverview,
    pub categories: Vec<CategoryCount>,
    pub trends: Vec<MonthlyCount>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusOverview {
    pub total: i64,
    pub pending: i64,
    pub investigating: i64,
    pub resolved: i64,
    pub rejected: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub month: String,
    pub count: i64,
}
