/// Database row types — these map directly to SQLite rows.
/// Distinct from vigil-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub password: String,
    pub created_at: String,
}

pub struct ComplaintRow {
    pub id: String,
    pub user_id: Option<String>,
    pub title: String,
    pub category: String,
    pub location: String,
    pub description: String,
    /// JSON array of stored evidence file names, or NULL.
    pub evidence_files: Option<String>,
    pub is_anonymous: bool,
    pub tracking_code: Option<String>,
    pub status: String,
    pub created_at: String,
    // Joined from users; always NULL for anonymous complaints.
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_phone: Option<String>,
}

pub struct NotificationRow {
    pub id: String,
    pub user_id: String,
    pub complaint_id: Option<String>,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub is_read: bool,
    pub created_at: String,
    /// Joined from complaints; NULL once the complaint is deleted.
    pub complaint_title: Option<String>,
}

/// Insert arguments for a new complaint. IDs and the tracking code are
/// generated by the caller.
pub struct NewComplaint<'a> {
    pub id: &'a str,
    pub user_id: Option<&'a str>,
    pub title: &'a str,
    pub category: &'a str,
    pub location: &'a str,
    pub description: &'a str,
    pub evidence_files: Option<&'a str>,
    pub is_anonymous: bool,
    pub tracking_code: Option<&'a str>,
}

/// Insert arguments for the notification written alongside a complaint
/// insert or status update. The owning user comes from the complaint row.
pub struct NewNotification<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub message: &'a str,
    pub kind: &'a str,
}

pub struct OverviewCounts {
    pub total: i64,
    pub pending: i64,
    pub investigating: i64,
    pub resolved: i64,
    pub rejected: i64,
}

pub struct CategoryCountRow {
    pub category: String,
    pub count: i64,
}

pub struct MonthlyCountRow {
    pub month: String,
    pub count: i64,
}
