//! Operations on the `applications` table.
//!
//! Dates are stored as `YYYY-MM-DD` text. "Today" is always passed in by
//! the caller so the queries stay deterministic.

use crate::error::{DatabaseError, Result};
use chrono::{Days, NaiveDate};
use jobtrail_core::{ApplicationStatus, ListingRecord};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

const DATE_FORMAT: &str = "%Y-%m-%d";

const COLUMNS: &str = "id, job_title, company_name, job_url, location, salary_range, date_posted,
    date_discovered, application_status, status_updated, follow_up_date, interview_date,
    notes, screenshot_path";

/// A stored application row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationRecord {
    pub id: i64,
    pub job_title: String,
    pub company_name: String,
    pub job_url: String,
    pub location: String,
    pub salary_range: String,
    pub date_posted: String,
    pub date_discovered: NaiveDate,
    pub status: ApplicationStatus,
    pub status_updated: NaiveDate,
    pub follow_up_date: Option<NaiveDate>,
    pub interview_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub screenshot_path: Option<String>,
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| DatabaseError::Decode(format!("invalid date '{value}': {e}")))
}

fn parse_optional_date(value: Option<String>) -> Result<Option<NaiveDate>> {
    value.as_deref().map(parse_date).transpose()
}

fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

fn from_row(row: &SqliteRow) -> Result<ApplicationRecord> {
    let status: String = row.try_get("application_status")?;
    Ok(ApplicationRecord {
        id: row.try_get("id")?,
        job_title: row.try_get("job_title")?,
        company_name: row.try_get("company_name")?,
        job_url: row.try_get("job_url")?,
        location: row.try_get("location")?,
        salary_range: row.try_get("salary_range")?,
        date_posted: row.try_get("date_posted")?,
        date_discovered: parse_date(&row.try_get::<String, _>("date_discovered")?)?,
        status: ApplicationStatus::parse(&status)
            .ok_or_else(|| DatabaseError::Decode(format!("unknown status '{status}'")))?,
        status_updated: parse_date(&row.try_get::<String, _>("status_updated")?)?,
        follow_up_date: parse_optional_date(row.try_get("follow_up_date")?)?,
        interview_date: parse_optional_date(row.try_get("interview_date")?)?,
        notes: row.try_get("notes")?,
        screenshot_path: row.try_get("screenshot_path")?,
    })
}

fn from_rows(rows: &[SqliteRow]) -> Result<Vec<ApplicationRecord>> {
    rows.iter().map(from_row).collect()
}

/// Insert a newly discovered listing unless its URL is already stored.
///
/// The follow-up falls `follow_up_days` after `today`. Returns the new row
/// id, or `None` when the URL was already present.
pub async fn upsert_if_absent(
    pool: &Pool<Sqlite>,
    listing: &ListingRecord,
    today: NaiveDate,
    follow_up_days: u32,
) -> Result<Option<i64>> {
    let result = sqlx::query(
        "INSERT INTO applications (job_title, company_name, job_url, location, salary_range,
                                   date_posted, date_discovered, application_status,
                                   status_updated, follow_up_date)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(job_url) DO NOTHING",
    )
    .bind(listing.title())
    .bind(listing.company())
    .bind(listing.url())
    .bind(listing.location())
    .bind(listing.salary())
    .bind(listing.posted_date())
    .bind(format_date(listing.discovered_date()))
    .bind(ApplicationStatus::Discovered.as_str())
    .bind(format_date(today))
    .bind(format_date(add_days(today, follow_up_days)))
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        tracing::debug!(url = listing.url(), "Listing already stored");
        return Ok(None);
    }

    tracing::debug!(
        title = listing.title(),
        company = listing.company(),
        "Stored listing"
    );
    Ok(Some(result.last_insert_rowid()))
}

/// Set the status and notes of the row with `url`.
///
/// Returns whether a row matched.
pub async fn set_status(
    pool: &Pool<Sqlite>,
    url: &str,
    status: ApplicationStatus,
    notes: Option<&str>,
    today: NaiveDate,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE applications
         SET application_status = ?, status_updated = ?, notes = ?
         WHERE job_url = ?",
    )
    .bind(status.as_str())
    .bind(format_date(today))
    .bind(notes)
    .bind(url)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Attach an evidence snapshot path to the row with `url`.
pub async fn set_evidence(pool: &Pool<Sqlite>, url: &str, path: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE applications SET screenshot_path = ? WHERE job_url = ?")
        .bind(path)
        .bind(url)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Record an interview date and move the row to `Interview Scheduled`.
pub async fn schedule_interview(
    pool: &Pool<Sqlite>,
    url: &str,
    date: NaiveDate,
    notes: Option<&str>,
    today: NaiveDate,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE applications
         SET application_status = ?, status_updated = ?, interview_date = ?,
             notes = COALESCE(?, notes)
         WHERE job_url = ?",
    )
    .bind(ApplicationStatus::InterviewScheduled.as_str())
    .bind(format_date(today))
    .bind(format_date(date))
    .bind(notes)
    .bind(url)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Rows waiting on a follow-up, oldest due date first.
pub async fn query_due_followups(pool: &Pool<Sqlite>, today: NaiveDate) -> Result<Vec<ApplicationRecord>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM applications
         WHERE follow_up_date <= ? AND application_status IN (?, ?)
         ORDER BY follow_up_date ASC"
    ))
    .bind(format_date(today))
    .bind(ApplicationStatus::Applied.as_str())
    .bind(ApplicationStatus::InterviewScheduled.as_str())
    .fetch_all(pool)
    .await?;

    from_rows(&rows)
}

/// Scheduled interviews from `today` through `today + window_days`.
pub async fn query_upcoming_interviews(
    pool: &Pool<Sqlite>,
    today: NaiveDate,
    window_days: u32,
) -> Result<Vec<ApplicationRecord>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM applications
         WHERE interview_date >= ? AND interview_date <= ? AND application_status = ?
         ORDER BY interview_date ASC"
    ))
    .bind(format_date(today))
    .bind(format_date(add_days(today, window_days)))
    .bind(ApplicationStatus::InterviewScheduled.as_str())
    .fetch_all(pool)
    .await?;

    from_rows(&rows)
}

/// Most recently discovered rows first.
pub async fn list_recent(pool: &Pool<Sqlite>, limit: u32) -> Result<Vec<ApplicationRecord>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM applications ORDER BY date_discovered DESC, id DESC LIMIT ?"
    ))
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    from_rows(&rows)
}

pub async fn list_by_status(pool: &Pool<Sqlite>, status: ApplicationStatus) -> Result<Vec<ApplicationRecord>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM applications
         WHERE application_status = ?
         ORDER BY date_discovered DESC, id DESC"
    ))
    .bind(status.as_str())
    .fetch_all(pool)
    .await?;

    from_rows(&rows)
}

/// Rows discovered on or after `since`, newest first.
pub async fn applications_since(pool: &Pool<Sqlite>, since: NaiveDate) -> Result<Vec<ApplicationRecord>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM applications
         WHERE date_discovered >= ?
         ORDER BY date_discovered DESC, id DESC"
    ))
    .bind(format_date(since))
    .fetch_all(pool)
    .await?;

    from_rows(&rows)
}

/// Look up a single row by URL.
pub async fn get_by_url(pool: &Pool<Sqlite>, url: &str) -> Result<Option<ApplicationRecord>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM applications WHERE job_url = ?"))
        .bind(url)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn listing(id: u32, discovered: NaiveDate) -> ListingRecord {
        ListingRecord::new("Engineer", "Acme", "Remote", &format!("https://x/job/{id}"))
            .with_discovered_date(discovered)
    }

    async fn db() -> Database {
        let db = Database::in_memory().await.expect("memory db");
        db.run_migrations().await.expect("migrations");
        db
    }

    #[tokio::test]
    async fn test_upsert_if_absent_rejects_duplicate_url() {
        let db = db().await;
        let today = date(2025, 3, 1);

        let first = upsert_if_absent(db.pool(), &listing(1, today), today, 7)
            .await
            .expect("insert");
        assert!(first.is_some());

        let again = upsert_if_absent(db.pool(), &listing(1, today), today, 7)
            .await
            .expect("insert duplicate");
        assert_eq!(again, None);

        let record = get_by_url(db.pool(), "https://x/job/1")
            .await
            .expect("get")
            .expect("stored");
        assert_eq!(record.status, ApplicationStatus::Discovered);
        assert_eq!(record.follow_up_date, Some(date(2025, 3, 8)));
        assert_eq!(record.salary_range, "Not specified");
    }

    #[tokio::test]
    async fn test_set_status_and_evidence() {
        let db = db().await;
        let today = date(2025, 3, 1);
        upsert_if_absent(db.pool(), &listing(1, today), today, 7)
            .await
            .expect("insert");

        let later = date(2025, 3, 2);
        assert!(set_status(db.pool(), "https://x/job/1", ApplicationStatus::ManualReviewNeeded, Some("2 fields"), later)
            .await
            .expect("update"));
        assert!(set_evidence(db.pool(), "https://x/job/1", "/shots/manual_input_Acme.png")
            .await
            .expect("evidence"));
        assert!(!set_status(db.pool(), "https://x/job/404", ApplicationStatus::Applied, None, later)
            .await
            .expect("update missing"));

        let record = get_by_url(db.pool(), "https://x/job/1")
            .await
            .expect("get")
            .expect("stored");
        assert_eq!(record.status, ApplicationStatus::ManualReviewNeeded);
        assert_eq!(record.status_updated, later);
        assert_eq!(record.notes.as_deref(), Some("2 fields"));
        assert_eq!(record.screenshot_path.as_deref(), Some("/shots/manual_input_Acme.png"));
    }

    #[tokio::test]
    async fn test_due_followups_filter_and_order() {
        let db = db().await;
        let pool = db.pool();
        // Follow-ups fall due on 03-04, 03-08, 03-03 respectively
        upsert_if_absent(pool, &listing(1, date(2025, 3, 1)), date(2025, 3, 1), 3).await.expect("1");
        upsert_if_absent(pool, &listing(2, date(2025, 3, 1)), date(2025, 3, 1), 7).await.expect("2");
        upsert_if_absent(pool, &listing(3, date(2025, 3, 1)), date(2025, 3, 1), 2).await.expect("3");
        upsert_if_absent(pool, &listing(4, date(2025, 3, 1)), date(2025, 3, 1), 1).await.expect("4");

        let today = date(2025, 3, 5);
        set_status(pool, "https://x/job/1", ApplicationStatus::Applied, None, today).await.expect("s1");
        set_status(pool, "https://x/job/2", ApplicationStatus::Applied, None, today).await.expect("s2");
        set_status(pool, "https://x/job/3", ApplicationStatus::InterviewScheduled, None, today).await.expect("s3");
        // Job 4 is due but still only discovered

        let due = query_due_followups(pool, today).await.expect("query");
        let urls: Vec<_> = due.iter().map(|r| r.job_url.as_str()).collect();
        assert_eq!(urls, vec!["https://x/job/3", "https://x/job/1"]);
    }

    #[tokio::test]
    async fn test_upcoming_interviews_window() {
        let db = db().await;
        let pool = db.pool();
        let today = date(2025, 3, 10);
        for id in 1..=4 {
            upsert_if_absent(pool, &listing(id, today), today, 7).await.expect("insert");
        }
        schedule_interview(pool, "https://x/job/1", date(2025, 3, 12), Some("Zoom"), today).await.expect("i1");
        schedule_interview(pool, "https://x/job/2", date(2025, 3, 10), None, today).await.expect("i2");
        schedule_interview(pool, "https://x/job/3", date(2025, 3, 20), None, today).await.expect("i3");
        schedule_interview(pool, "https://x/job/4", date(2025, 3, 9), None, today).await.expect("i4");

        let upcoming = query_upcoming_interviews(pool, today, 7).await.expect("query");
        let urls: Vec<_> = upcoming.iter().map(|r| r.job_url.as_str()).collect();
        assert_eq!(urls, vec!["https://x/job/2", "https://x/job/1"]);
        assert_eq!(upcoming[1].notes.as_deref(), Some("Zoom"));
    }

    #[tokio::test]
    async fn test_listing_queries() {
        let db = db().await;
        let pool = db.pool();
        upsert_if_absent(pool, &listing(1, date(2025, 2, 1)), date(2025, 2, 1), 7).await.expect("1");
        upsert_if_absent(pool, &listing(2, date(2025, 3, 1)), date(2025, 3, 1), 7).await.expect("2");
        upsert_if_absent(pool, &listing(3, date(2025, 3, 5)), date(2025, 3, 5), 7).await.expect("3");
        set_status(pool, "https://x/job/2", ApplicationStatus::Rejected, None, date(2025, 3, 6)).await.expect("s");

        let recent = list_recent(pool, 2).await.expect("recent");
        let urls: Vec<_> = recent.iter().map(|r| r.job_url.as_str()).collect();
        assert_eq!(urls, vec!["https://x/job/3", "https://x/job/2"]);

        let rejected = list_by_status(pool, ApplicationStatus::Rejected).await.expect("by status");
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].job_url, "https://x/job/2");

        let since = applications_since(pool, date(2025, 3, 1)).await.expect("since");
        assert_eq!(since.len(), 2);
    }
}
