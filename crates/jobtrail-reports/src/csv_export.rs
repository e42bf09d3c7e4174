//! Spreadsheet-friendly export of application rows.

use crate::error::{ReportError, Result};
use jobtrail_db::ApplicationRecord;
use serde::Serialize;

const HEADERS: [&str; 10] = [
    "Date Discovered",
    "Job Title",
    "Company",
    "Location",
    "Status",
    "Salary Range",
    "Follow-up Date",
    "Interview Date",
    "Notes",
    "Job URL",
];

#[derive(Serialize)]
struct CsvRow<'a> {
    date_discovered: String,
    job_title: &'a str,
    company: &'a str,
    location: &'a str,
    status: &'static str,
    salary_range: &'a str,
    follow_up_date: String,
    interview_date: String,
    notes: &'a str,
    job_url: &'a str,
}

impl<'a> From<&'a ApplicationRecord> for CsvRow<'a> {
    fn from(record: &'a ApplicationRecord) -> Self {
        Self {
            date_discovered: record.date_discovered.to_string(),
            job_title: &record.job_title,
            company: &record.company_name,
            location: &record.location,
            status: record.status.as_str(),
            salary_range: &record.salary_range,
            follow_up_date: record
                .follow_up_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            interview_date: record
                .interview_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            notes: record.notes.as_deref().unwrap_or_default(),
            job_url: &record.job_url,
        }
    }
}

/// Encode `records` as CSV. The header row is always present.
pub fn to_csv(records: &[ApplicationRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADERS)?;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }

    writer
        .into_inner()
        .map_err(|e| ReportError::Csv(e.into_error().into()))
}
