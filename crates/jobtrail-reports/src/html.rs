//! Askama view models for the HTML report.

use askama::Template;
use jobtrail_db::{ApplicationRecord, DailyStats, StatsSummary};

/// One application row, pre-formatted for display.
pub struct ReportRow {
    pub date: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub status: &'static str,
    pub status_class: String,
    pub follow_up: String,
    pub interview: String,
    pub notes: String,
}

impl From<&ApplicationRecord> for ReportRow {
    fn from(record: &ApplicationRecord) -> Self {
        let status = record.status.as_str();
        Self {
            date: record.date_discovered.to_string(),
            title: record.job_title.clone(),
            company: record.company_name.clone(),
            location: record.location.clone(),
            status,
            status_class: status.to_lowercase().replace(' ', "-"),
            follow_up: record
                .follow_up_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            interview: record
                .interview_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            notes: record
                .notes
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// The four headline counters.
pub struct StatCards {
    pub applications: i64,
    pub interviews: i64,
    pub rejections: i64,
    pub offers: i64,
}

impl From<&DailyStats> for StatCards {
    fn from(stats: &DailyStats) -> Self {
        Self {
            applications: stats.applications_sent,
            interviews: stats.interviews_scheduled,
            rejections: stats.rejections_received,
            offers: stats.offers_received,
        }
    }
}

impl From<&StatsSummary> for StatCards {
    fn from(summary: &StatsSummary) -> Self {
        Self {
            applications: summary.applications,
            interviews: summary.interviews,
            rejections: summary.rejections,
            offers: summary.offers,
        }
    }
}

#[derive(Template)]
#[template(path = "report.html")]
pub struct ReportTemplate<'a> {
    pub title: &'a str,
    pub generated_at: String,
    pub stats: Option<StatCards>,
    pub applications: Vec<ReportRow>,
    pub followups: Vec<ReportRow>,
    pub interviews: Vec<ReportRow>,
}

pub(crate) fn rows(records: &[ApplicationRecord]) -> Vec<ReportRow> {
    records.iter().map(ReportRow::from).collect()
}
