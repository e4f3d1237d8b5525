use crate::Database;
use crate::models::{
    CategoryCountRow, ComplaintRow, MonthlyCountRow, NewComplaint, NewNotification,
    NotificationRow, OverviewCounts, UserRow,
};
use anyhow::Result;
use rusqlite::Connection;

const COMPLAINT_COLUMNS: &str = "c.id, c.user_id, c.title, c.category, c.location, \
     c.description, c.evidence_files, c.is_anonymous, c.tracking_code, c.status, \
     c.created_at, u.name, u.email, u.phone";

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        name: &str,
        email: &str,
        phone: &str,
        address: Option<&str>,
        password_hash: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, email, phone, address, password)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, name, email, phone, address, password_hash],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Returns the number of rows updated (0 when the user does not exist).
    pub fn update_user(
        &self,
        id: &str,
        name: &str,
        email: &str,
        phone: &str,
        address: Option<&str>,
    ) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE users SET name = ?1, email = ?2, phone = ?3, address = ?4 WHERE id = ?5",
                rusqlite::params![name, email, phone, address, id],
            )?;
            Ok(n)
        })
    }

    /// Deletes the user; complaints and notifications cascade via FKs.
    pub fn delete_user(&self, id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(n)
        })
    }

    // -- Complaints --

    /// Insert a complaint, and for registered submitters the creation
    /// notification, in one transaction. The notification is skipped when
    /// `complaint.user_id` is NULL regardless of what the caller passes.
    pub fn create_complaint(
        &self,
        complaint: &NewComplaint,
        notification: Option<&NewNotification>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO complaints (id, user_id, title, category, location, description,
                                         evidence_files, is_anonymous, tracking_code, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'Pending')",
                rusqlite::params![
                    complaint.id,
                    complaint.user_id,
                    complaint.title,
                    complaint.category,
                    complaint.location,
                    complaint.description,
                    complaint.evidence_files,
                    complaint.is_anonymous,
                    complaint.tracking_code,
                ],
            )?;
            if let (Some(user_id), Some(n)) = (complaint.user_id, notification) {
                insert_notification(&tx, n, user_id, complaint.id)?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    pub fn get_complaint(&self, id: &str) -> Result<Option<ComplaintRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COMPLAINT_COLUMNS} FROM complaints c
                 LEFT JOIN users u ON c.user_id = u.id
                 WHERE c.id = ?1"
            );
            let mut stmt = conn.prepare(&sql)?;
            let row = stmt.query_row([id], map_complaint_row).optional()?;
            Ok(row)
        })
    }

    pub fn get_complaint_by_tracking_code(&self, code: &str) -> Result<Option<ComplaintRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COMPLAINT_COLUMNS} FROM complaints c
                 LEFT JOIN users u ON c.user_id = u.id
                 WHERE c.tracking_code = ?1"
            );
            let mut stmt = conn.prepare(&sql)?;
            let row = stmt.query_row([code], map_complaint_row).optional()?;
            Ok(row)
        })
    }

    pub fn get_complaints_for_user(&self, user_id: &str) -> Result<Vec<ComplaintRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COMPLAINT_COLUMNS} FROM complaints c
                 LEFT JOIN users u ON c.user_id = u.id
                 WHERE c.user_id = ?1
                 ORDER BY c.created_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], map_complaint_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_all_complaints(&self) -> Result<Vec<ComplaintRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COMPLAINT_COLUMNS} FROM complaints c
                 LEFT JOIN users u ON c.user_id = u.id
                 ORDER BY c.created_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], map_complaint_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns the number of rows updated (0 when the complaint is missing).
    pub fn update_complaint(
        &self,
        id: &str,
        title: &str,
        category: &str,
        location: &str,
        description: &str,
    ) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE complaints SET title = ?1, category = ?2, location = ?3,
                                       description = ?4
                 WHERE id = ?5",
                rusqlite::params![title, category, location, description, id],
            )?;
            Ok(n)
        })
    }

    /// Write the new status and, when the complaint belongs to a registered
    /// user and the caller supplied a template, the status notification —
    /// both inside one transaction so neither lands without the other.
    /// Returns false when the complaint does not exist (nothing written).
    pub fn update_complaint_status(
        &self,
        id: &str,
        status: &str,
        notification: Option<&NewNotification>,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let user_id: Option<Option<String>> = tx
                .query_row("SELECT user_id FROM complaints WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()?;
            let Some(user_id) = user_id else {
                return Ok(false);
            };

            tx.execute(
                "UPDATE complaints SET status = ?1 WHERE id = ?2",
                rusqlite::params![status, id],
            )?;

            if let (Some(user_id), Some(n)) = (user_id, notification) {
                insert_notification(&tx, n, &user_id, id)?;
            }

            tx.commit()?;
            Ok(true)
        })
    }

    pub fn delete_complaint(&self, id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM complaints WHERE id = ?1", [id])?;
            Ok(n)
        })
    }

    // -- Notifications --

    pub fn get_notifications_for_user(&self, user_id: &str) -> Result<Vec<NotificationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT n.id, n.user_id, n.complaint_id, n.title, n.message, n.kind,
                        n.is_read, n.created_at, c.title
                 FROM notifications n
                 LEFT JOIN complaints c ON n.complaint_id = c.id
                 WHERE n.user_id = ?1
                 ORDER BY n.created_at DESC",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(NotificationRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        complaint_id: row.get(2)?,
                        title: row.get(3)?,
                        message: row.get(4)?,
                        kind: row.get(5)?,
                        is_read: row.get(6)?,
                        created_at: row.get(7)?,
                        complaint_title: row.get(8)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn unread_notification_count(&self, user_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND is_read = 0",
                [user_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// Scoped to the owning user: marking someone else's notification is a
    /// no-op returning 0.
    pub fn mark_notification_read(&self, id: &str, user_id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND user_id = ?2",
                rusqlite::params![id, user_id],
            )?;
            Ok(n)
        })
    }

    pub fn mark_all_notifications_read(&self, user_id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE notifications SET is_read = 1 WHERE user_id = ?1",
                [user_id],
            )?;
            Ok(n)
        })
    }

    pub fn delete_notification(&self, id: &str, user_id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM notifications WHERE id = ?1 AND user_id = ?2",
                rusqlite::params![id, user_id],
            )?;
            Ok(n)
        })
    }

    // -- Analytics --

    pub fn status_overview(&self) -> Result<OverviewCounts> {
        self.with_conn(|conn| {
            let counts = conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN status = 'Pending' THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN status = 'Under Investigation' THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN status = 'Resolved' THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN status = 'Rejected' THEN 1 ELSE 0 END), 0)
                 FROM complaints",
                [],
                |row| {
                    Ok(OverviewCounts {
                        total: row.get(0)?,
                        pending: row.get(1)?,
                        investigating: row.get(2)?,
                        resolved: row.get(3)?,
                        rejected: row.get(4)?,
                    })
                },
            )?;
            Ok(counts)
        })
    }

    pub fn category_counts(&self) -> Result<Vec<CategoryCountRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT category, COUNT(*) AS count
                 FROM complaints
                 GROUP BY category
                 ORDER BY count DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(CategoryCountRow {
                        category: row.get(0)?,
                        count: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Complaints per month over the trailing six months, oldest first.
    pub fn monthly_trends(&self) -> Result<Vec<MonthlyCountRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT strftime('%Y-%m', created_at) AS month, COUNT(*)
                 FROM complaints
                 WHERE created_at >= datetime('now', '-6 months')
                 GROUP BY month
                 ORDER BY month ASC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(MonthlyCountRow {
                        month: row.get(0)?,
                        count: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn insert_notification(
    conn: &Connection,
    n: &NewNotification,
    user_id: &str,
    complaint_id: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO notifications (id, user_id, complaint_id, title, message, kind)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![n.id, user_id, complaint_id, n.title, n.message, n.kind],
    )?;
    Ok(())
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, name, email, phone, address, password, created_at
         FROM users WHERE {column} = ?1"
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                phone: row.get(3)?,
                address: row.get(4)?,
                password: row.get(5)?,
                created_at: row.get(6)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn map_complaint_row(row: &rusqlite::Row) -> rusqlite::Result<ComplaintRow> {
    Ok(ComplaintRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        category: row.get(3)?,
        location: row.get(4)?,
        description: row.get(5)?,
        evidence_files: row.get(6)?,
        is_anonymous: row.get(7)?,
        tracking_code: row.get(8)?,
        status: row.get(9)?,
        created_at: row.get(10)?,
        user_name: row.get(11)?,
        user_email: row.get(12)?,
        user_phone: row.get(13)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_db() -> (Database, TempDir) {
        let dir = TempDir::new().expect("tempdir");
        let db = Database::open(&dir.path().join("vigil.db")).expect("open db");
        (db, dir)
    }

    fn seed_user(db: &Database, id: &str, email: &str) {
        db.create_user(id, "Asha Rao", email, "5550100", Some("12 Elm St"), "hash")
            .expect("create user");
    }

    fn complaint<'a>(id: &'a str, user_id: Option<&'a str>, code: Option<&'a str>) -> NewComplaint<'a> {
        NewComplaint {
            id,
            user_id,
            title: "Stolen bicycle",
            category: "Theft",
            location: "Market Street",
            description: "Bicycle taken from the rack overnight.",
            evidence_files: None,
            is_anonymous: user_id.is_none(),
            tracking_code: code,
        }
    }

    const PENDING_NOTE: NewNotification = NewNotification {
        id: "n-1",
        title: "Complaint Submitted",
        message: "Your complaint has been submitted and is pending review.",
        kind: "info",
    };

    #[test]
    fn create_inserts_notification_for_registered_user() {
        let (db, _dir) = test_db();
        seed_user(&db, "u-1", "asha@example.com");

        db.create_complaint(&complaint("c-1", Some("u-1"), None), Some(&PENDING_NOTE))
            .unwrap();

        let notes = db.get_notifications_for_user("u-1").unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].complaint_id.as_deref(), Some("c-1"));
        assert_eq!(notes[0].complaint_title.as_deref(), Some("Stolen bicycle"));
        assert!(!notes[0].is_read);
        assert_eq!(db.unread_notification_count("u-1").unwrap(), 1);
    }

    #[test]
    fn anonymous_complaint_never_notifies() {
        let (db, _dir) = test_db();
        seed_user(&db, "u-1", "asha@example.com");

        // Even if a caller passes a template, a NULL user_id means no row.
        db.create_complaint(&complaint("c-1", None, Some("CR-TEST-AAAAA")), Some(&PENDING_NOTE))
            .unwrap();

        assert_eq!(db.unread_notification_count("u-1").unwrap(), 0);
        let found = db.get_complaint_by_tracking_code("CR-TEST-AAAAA").unwrap().unwrap();
        assert_eq!(found.id, "c-1");
        assert!(found.user_name.is_none());
    }

    #[test]
    fn tracking_codes_are_unique() {
        let (db, _dir) = test_db();
        db.create_complaint(&complaint("c-1", None, Some("CR-DUP-AAAAA")), None)
            .unwrap();
        let err = db
            .create_complaint(&complaint("c-2", None, Some("CR-DUP-AAAAA")), None)
            .unwrap_err();
        assert!(err.to_string().to_lowercase().contains("unique"));
    }

    #[test]
    fn tracking_lookup_is_exact() {
        let (db, _dir) = test_db();
        db.create_complaint(&complaint("c-1", None, Some("CR-ONE-AAAAA")), None)
            .unwrap();
        db.create_complaint(&complaint("c-2", None, Some("CR-TWO-BBBBB")), None)
            .unwrap();

        let found = db.get_complaint_by_tracking_code("CR-TWO-BBBBB").unwrap().unwrap();
        assert_eq!(found.id, "c-2");
        assert!(db.get_complaint_by_tracking_code("CR-TWO-BBBBb").unwrap().is_none());
        assert!(db.get_complaint_by_tracking_code("").unwrap().is_none());
    }

    #[test]
    fn status_update_writes_row_and_notification_atomically() {
        let (db, _dir) = test_db();
        seed_user(&db, "u-1", "asha@example.com");
        db.create_complaint(&complaint("c-1", Some("u-1"), None), Some(&PENDING_NOTE))
            .unwrap();

        let note = NewNotification {
            id: "n-2",
            title: "Complaint Resolved",
            message: "Good news! Your complaint has been resolved.",
            kind: "success",
        };
        assert!(db.update_complaint_status("c-1", "Resolved", Some(&note)).unwrap());

        let row = db.get_complaint("c-1").unwrap().unwrap();
        assert_eq!(row.status, "Resolved");
        assert_eq!(db.get_notifications_for_user("u-1").unwrap().len(), 2);
    }

    #[test]
    fn status_update_without_template_skips_notification() {
        let (db, _dir) = test_db();
        seed_user(&db, "u-1", "asha@example.com");
        db.create_complaint(&complaint("c-1", Some("u-1"), None), Some(&PENDING_NOTE))
            .unwrap();

        assert!(db.update_complaint_status("c-1", "Escalated", None).unwrap());

        let row = db.get_complaint("c-1").unwrap().unwrap();
        assert_eq!(row.status, "Escalated");
        assert_eq!(db.get_notifications_for_user("u-1").unwrap().len(), 1);
    }

    #[test]
    fn status_update_on_missing_complaint_writes_nothing() {
        let (db, _dir) = test_db();
        assert!(!db.update_complaint_status("nope", "Resolved", None).unwrap());
    }

    #[test]
    fn same_status_twice_duplicates_the_notification() {
        let (db, _dir) = test_db();
        seed_user(&db, "u-1", "asha@example.com");
        db.create_complaint(&complaint("c-1", Some("u-1"), None), None).unwrap();

        for id in ["n-a", "n-b"] {
            let note = NewNotification {
                id,
                title: "Complaint Resolved",
                message: "Good news! Your complaint has been resolved.",
                kind: "success",
            };
            db.update_complaint_status("c-1", "Resolved", Some(&note)).unwrap();
        }

        assert_eq!(db.get_notifications_for_user("u-1").unwrap().len(), 2);
    }

    #[test]
    fn deleting_a_user_cascades_complaints_and_notifications() {
        let (db, _dir) = test_db();
        seed_user(&db, "u-1", "asha@example.com");
        db.create_complaint(&complaint("c-1", Some("u-1"), None), Some(&PENDING_NOTE))
            .unwrap();

        assert_eq!(db.delete_user("u-1").unwrap(), 1);

        assert!(db.get_complaint("c-1").unwrap().is_none());
        assert!(db.get_complaints_for_user("u-1").unwrap().is_empty());
        assert!(db.get_notifications_for_user("u-1").unwrap().is_empty());
    }

    #[test]
    fn deleting_a_complaint_keeps_its_notifications() {
        let (db, _dir) = test_db();
        seed_user(&db, "u-1", "asha@example.com");
        db.create_complaint(&complaint("c-1", Some("u-1"), None), Some(&PENDING_NOTE))
            .unwrap();

        assert_eq!(db.delete_complaint("c-1").unwrap(), 1);

        // complaint_id goes NULL, the notification survives
        let notes = db.get_notifications_for_user("u-1").unwrap();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].complaint_id.is_none());
        assert!(notes[0].complaint_title.is_none());
    }

    #[test]
    fn notification_mutations_are_owner_scoped() {
        let (db, _dir) = test_db();
        seed_user(&db, "u-1", "asha@example.com");
        seed_user(&db, "u-2", "dev@example.com");
        db.create_complaint(&complaint("c-1", Some("u-1"), None), Some(&PENDING_NOTE))
            .unwrap();

        assert_eq!(db.mark_notification_read("n-1", "u-2").unwrap(), 0);
        assert_eq!(db.delete_notification("n-1", "u-2").unwrap(), 0);
        assert_eq!(db.unread_notification_count("u-1").unwrap(), 1);

        assert_eq!(db.mark_notification_read("n-1", "u-1").unwrap(), 1);
        assert_eq!(db.unread_notification_count("u-1").unwrap(), 0);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let (db, _dir) = test_db();
        seed_user(&db, "u-1", "asha@example.com");
        let err = db
            .create_user("u-2", "Other", "asha@example.com", "5550101", None, "hash")
            .unwrap_err();
        assert!(err.to_string().to_lowercase().contains("unique"));
    }

    #[test]
    fn overview_counts_known_statuses() {
        let (db, _dir) = test_db();
        db.create_complaint(&complaint("c-1", None, Some("CR-A-AAAAA")), None).unwrap();
        db.create_complaint(&complaint("c-2", None, Some("CR-B-BBBBB")), None).unwrap();
        db.create_complaint(&complaint("c-3", None, Some("CR-C-CCCCC")), None).unwrap();
        db.update_complaint_status("c-2", "Resolved", None).unwrap();
        db.update_complaint_status("c-3", "Escalated", None).unwrap();

        let o = db.status_overview().unwrap();
        assert_eq!(o.total, 3);
        assert_eq!(o.pending, 1);
        assert_eq!(o.resolved, 1);
        assert_eq!(o.investigating, 0);
        assert_eq!(o.rejected, 0);

        let cats = db.category_counts().unwrap();
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].category, "Theft");
        assert_eq!(cats[0].count, 3);

        let trends = db.monthly_trends().unwrap();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].count, 3);
    }
}
