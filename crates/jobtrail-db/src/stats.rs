//! Daily counters and windowed summaries.

use crate::applications::{format_date, parse_date};
use crate::error::Result;
use chrono::{Days, NaiveDate};
use jobtrail_core::ApplicationStatus;
use serde::Serialize;
use sqlx::{Pool, Row, Sqlite};

/// Counters for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub applications_sent: i64,
    pub interviews_scheduled: i64,
    pub rejections_received: i64,
    pub offers_received: i64,
}

/// Increments added to a day's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsDelta {
    pub applications_sent: i64,
    pub interviews_scheduled: i64,
    pub rejections_received: i64,
    pub offers_received: i64,
}

impl StatsDelta {
    #[must_use]
    pub fn applications(count: i64) -> Self {
        Self {
            applications_sent: count,
            ..Self::default()
        }
    }
}

/// Status counts over the last `window_days` of discoveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub window_days: u32,
    /// Every listing tracked in the window
    pub total_tracked: i64,
    /// Listings past the `Discovered` stage
    pub applications: i64,
    pub interviews: i64,
    pub rejections: i64,
    pub offers: i64,
}

impl StatsSummary {
    /// Interviews as a percentage of applications; 0 with no applications.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn interview_rate(&self) -> f64 {
        if self.applications == 0 {
            0.0
        } else {
            self.interviews as f64 / self.applications as f64 * 100.0
        }
    }
}

/// Counters stored for `date`, if any.
pub async fn daily_stats(pool: &Pool<Sqlite>, date: NaiveDate) -> Result<Option<DailyStats>> {
    let row = sqlx::query(
        "SELECT date, applications_sent, interviews_scheduled, rejections_received, offers_received
         FROM daily_stats WHERE date = ?",
    )
    .bind(format_date(date))
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    Ok(Some(DailyStats {
        date: parse_date(&row.try_get::<String, _>("date")?)?,
        applications_sent: row.try_get("applications_sent")?,
        interviews_scheduled: row.try_get("interviews_scheduled")?,
        rejections_received: row.try_get("rejections_received")?,
        offers_received: row.try_get("offers_received")?,
    }))
}

/// Add `delta` to the counters of `date`, creating the day if needed.
pub async fn record_daily_stats(pool: &Pool<Sqlite>, date: NaiveDate, delta: StatsDelta) -> Result<()> {
    sqlx::query(
        "INSERT INTO daily_stats (date, applications_sent, interviews_scheduled,
                                  rejections_received, offers_received)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(date) DO UPDATE SET
             applications_sent = applications_sent + excluded.applications_sent,
             interviews_scheduled = interviews_scheduled + excluded.interviews_scheduled,
             rejections_received = rejections_received + excluded.rejections_received,
             offers_received = offers_received + excluded.offers_received",
    )
    .bind(format_date(date))
    .bind(delta.applications_sent)
    .bind(delta.interviews_scheduled)
    .bind(delta.rejections_received)
    .bind(delta.offers_received)
    .execute(pool)
    .await?;

    Ok(())
}

/// Summarize listings discovered from `today - window_days` onwards.
pub async fn stats_summary(pool: &Pool<Sqlite>, today: NaiveDate, window_days: u32) -> Result<StatsSummary> {
    let start = today
        .checked_sub_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MIN);

    let row = sqlx::query(
        "SELECT
             COUNT(*) AS total_tracked,
             COALESCE(SUM(CASE WHEN application_status != ? THEN 1 ELSE 0 END), 0) AS applications,
             COALESCE(SUM(CASE WHEN application_status = ? THEN 1 ELSE 0 END), 0) AS interviews,
             COALESCE(SUM(CASE WHEN application_status = ? THEN 1 ELSE 0 END), 0) AS rejections,
             COALESCE(SUM(CASE WHEN application_status = ? THEN 1 ELSE 0 END), 0) AS offers
         FROM applications
         WHERE date_discovered >= ?",
    )
    .bind(ApplicationStatus::Discovered.as_str())
    .bind(ApplicationStatus::InterviewScheduled.as_str())
    .bind(ApplicationStatus::Rejected.as_str())
    .bind(ApplicationStatus::Offer.as_str())
    .bind(format_date(start))
    .fetch_one(pool)
    .await?;

    Ok(StatsSummary {
        window_days,
        total_tracked: row.try_get("total_tracked")?,
        applications: row.try_get("applications")?,
        interviews: row.try_get("interviews")?,
        rejections: row.try_get("rejections")?,
        offers: row.try_get("offers")?,
    })
}
