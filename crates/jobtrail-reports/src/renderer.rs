//! Daily and weekly report generation.

use crate::csv_export::to_csv;
use crate::error::{ReportError, Result};
use crate::html::{rows, ReportTemplate, StatCards};
use askama::Template;
use chrono::{Days, Local, NaiveDate};
use jobtrail_db::{applications, stats, Database};
use std::path::{Path, PathBuf};

/// Days of upcoming interviews listed in the daily report.
pub const INTERVIEW_WINDOW_DAYS: u32 = 7;

/// Days covered by the weekly report.
pub const WEEK_DAYS: u32 = 7;

/// Renders reports from the record store into one directory.
pub struct ReportRenderer {
    db: Database,
    dir: PathBuf,
}

impl ReportRenderer {
    pub fn new(db: Database, dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            dir: dir.into(),
        }
    }

    /// Today's applications, today's counters, due follow-ups and the
    /// coming week's interviews. Returns the HTML path.
    pub async fn render_daily(&self, today: NaiveDate) -> Result<PathBuf> {
        let pool = self.db.pool();
        let todays = applications::applications_since(pool, today).await?;
        let counters = stats::daily_stats(pool, today).await?;
        let followups = applications::query_due_followups(pool, today).await?;
        let interviews =
            applications::query_upcoming_interviews(pool, today, INTERVIEW_WINDOW_DAYS).await?;

        let title = format!("Daily Report - {today}");
        let html = ReportTemplate {
            title: &title,
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            stats: counters.as_ref().map(StatCards::from),
            applications: rows(&todays),
            followups: rows(&followups),
            interviews: rows(&interviews),
        }
        .render()?;

        let path = self.dir.join(format!("daily_report_{today}.html"));
        self.write(&path, html.as_bytes()).await?;
        tracing::info!("Daily report generated: {}", path.display());
        Ok(path)
    }

    /// The last week's applications and summary, as HTML plus a CSV
    /// export. Returns the HTML path.
    pub async fn render_weekly(&self, today: NaiveDate) -> Result<PathBuf> {
        let pool = self.db.pool();
        let week_ago = today
            .checked_sub_days(Days::new(u64::from(WEEK_DAYS)))
            .unwrap_or(NaiveDate::MIN);
        let weeks = applications::applications_since(pool, week_ago).await?;
        let summary = stats::stats_summary(pool, today, WEEK_DAYS).await?;

        let title = format!("Weekly Report - {week_ago} to {today}");
        let html = ReportTemplate {
            title: &title,
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            stats: Some(StatCards::from(&summary)),
            applications: rows(&weeks),
            followups: Vec::new(),
            interviews: Vec::new(),
        }
        .render()?;

        let html_path = self.dir.join(format!("weekly_report_{today}.html"));
        let csv_path = self.dir.join(format!("weekly_report_{today}.csv"));
        self.write(&html_path, html.as_bytes()).await?;
        self.write(&csv_path, &to_csv(&weeks)?).await?;

        tracing::info!(
            html = %html_path.display(),
            csv = %csv_path.display(),
            "Weekly reports generated"
        );
        Ok(html_path)
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ReportError::Write {
                path: self.dir.clone(),
                source,
            })?;
        tokio::fs::write(path, contents)
            .await
            .map_err(|source| ReportError::Write {
                path: path.to_path_buf(),
                source,
            })
    }
}
