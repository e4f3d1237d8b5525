use serde::{Deserialize, Serialize};

/// Canonical complaint categories offered to clients. The server stores
/// whatever category string it receives; this list is informational.
pub const COMPLAINT_CATEGORIES: [&str; 11] = [
    "Theft",
    "Assault",
    "Burglary",
    "Cybercrime",
    "Fraud",
    "Vandalism",
    "Drug Offense",
    "Domestic Violence",
    "Traffic Violation",
    "Missing Person",
    "Other",
];

/// The four statuses a complaint moves through. Status is stored as free
/// text, so an unknown string round-trips through the database untouched —
/// it just doesn't correspond to any variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplaintStatus {
    Pending,
    UnderInvestigation,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::UnderInvestigation => "Under Investigation",
            ComplaintStatus::Resolved => "Resolved",
            ComplaintStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(ComplaintStatus::Pending),
            "Under Investigation" => Some(ComplaintStatus::UnderInvestigation),
            "Resolved" => Some(ComplaintStatus::Resolved),
            "Rejected" => Some(ComplaintStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
        }
    }
}

/// Title/message/kind for the notification a status transition produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNotification {
    pub title: &'static str,
    pub message: &'static str,
    pub kind: NotificationKind,
}

/// Map a new status to its notification template. A function of the new
/// status only — the prior status never matters. Unknown statuses map to
/// `None`: the status is still written, but nobody gets notified.
pub fn status_notification(new_status: &str) -> Option<StatusNotification> {
    let status = ComplaintStatus::parse(new_status)?;
    Some(match status {
        ComplaintStatus::Pending => StatusNotification {
            title: "Complaint Submitted",
            message: "Your complaint has been submitted and is pending review.",
            kind: NotificationKind::Info,
        },
        ComplaintStatus::UnderInvestigation => StatusNotification {
            title: "Investigation Started",
            message: "Your complaint is now under investigation by authorities.",
            kind: NotificationKind::Info,
        },
        ComplaintStatus::Resolved => StatusNotification {
            title: "Complaint Resolved",
            message: "Good news! Your complaint has been resolved.",
            kind: NotificationKind::Success,
        },
        ComplaintStatus::Rejected => StatusNotification {
            title: "Complaint Rejected",
            message: "Your complaint has been rejected. Please contact support for more details.",
            kind: NotificationKind::Error,
        },
    })
}
