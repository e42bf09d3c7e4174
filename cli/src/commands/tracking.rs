//! Tracker commands: follow-ups, interviews, statistics and manual updates.

use crate::error::CommandError;
use crate::routine;
use crate::state::AppState;
use chrono::{Local, NaiveDate};
use jobtrail_core::{ApplicationStatus, ListingRecord};
use jobtrail_db::{applications, stats, ApplicationRecord};

/// Print applications due for a follow-up.
pub async fn cmd_followups(state: &AppState) -> anyhow::Result<()> {
    let due = routine::due_followups(state, Local::now().date_naive()).await?;

    if due.is_empty() {
        println!("No follow-ups needed at this time");
        return Ok(());
    }

    println!("{} follow-ups needed:", due.len());
    for record in &due {
        println!("  - {} at {}", record.job_title, record.company_name);
        println!(
            "    Tracked since: {} | Follow-up: {}",
            record.date_discovered,
            format_optional_date(record.follow_up_date)
        );
    }
    Ok(())
}

/// Remind about interviews in the next two days.
pub async fn cmd_interviews(state: &AppState) -> anyhow::Result<()> {
    let upcoming = routine::monitor_interviews(state, Local::now().date_naive()).await?;

    if upcoming.is_empty() {
        println!(
            "No interviews scheduled in the next {} days",
            routine::INTERVIEW_REMINDER_DAYS
        );
        return Ok(());
    }

    println!("{} upcoming interviews:", upcoming.len());
    for record in &upcoming {
        println!("  - {} at {}", record.job_title, record.company_name);
        println!("    Date: {}", format_optional_date(record.interview_date));
    }
    Ok(())
}

/// Print the status summary for the last `days` days.
pub async fn cmd_stats(state: &AppState, days: u32) -> anyhow::Result<()> {
    print_stats(state, days).await
}

pub(crate) async fn print_stats(state: &AppState, days: u32) -> anyhow::Result<()> {
    let summary = stats::stats_summary(state.db.pool(), Local::now().date_naive(), days).await?;

    println!("Statistics for the last {days} days:");
    println!("  Jobs tracked: {}", summary.total_tracked);
    println!("  Total Applications: {}", summary.applications);
    println!("  Interviews: {}", summary.interviews);
    println!("  Rejections: {}", summary.rejections);
    println!("  Offers: {}", summary.offers);
    if summary.applications > 0 {
        println!("  Interview Rate: {:.1}%", summary.interview_rate());
    }
    Ok(())
}

/// List recent applications, or those with one status.
pub async fn cmd_list(
    state: &AppState,
    limit: u32,
    status: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let records = match status {
        Some(raw) => {
            let status =
                ApplicationStatus::parse(raw).ok_or_else(|| CommandError::InvalidStatus(raw.to_string()))?;
            applications::list_by_status(state.db.pool(), status).await?
        }
        None => applications::list_recent(state.db.pool(), limit).await?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    match status {
        Some(raw) => println!("Applications with status '{raw}':"),
        None => println!("Recent applications (limit {limit}):"),
    }
    if records.is_empty() {
        println!("  No applications found");
        return Ok(());
    }
    for record in &records {
        print_record(record);
    }
    Ok(())
}

fn print_record(record: &ApplicationRecord) {
    println!("  - {} at {}", record.job_title, record.company_name);
    println!(
        "    Status: {} | Updated: {}",
        record.status, record.status_updated
    );
    println!("    URL: {}", record.job_url);
}

/// Track an application made by hand.
pub async fn cmd_add(
    state: &AppState,
    title: &str,
    company: &str,
    location: &str,
    url: Option<&str>,
    salary: Option<&str>,
) -> anyhow::Result<()> {
    let now = Local::now();
    let today = now.date_naive();
    let url = url.map_or_else(|| manual_url(now.timestamp()), ToString::to_string);

    let mut listing = ListingRecord::new(title, company, location, &url);
    if let Some(salary) = salary.filter(|s| !s.trim().is_empty()) {
        listing = listing.with_salary(salary.trim());
    }

    let follow_up_days = state.config.application.follow_up_days;
    match applications::upsert_if_absent(state.db.pool(), &listing, today, follow_up_days).await? {
        Some(id) => {
            applications::set_status(
                state.db.pool(),
                listing.url(),
                ApplicationStatus::Applied,
                Some("Added manually"),
                today,
            )
            .await?;
            println!("Application saved (ID: {id})");
            println!(
                "Follow-up reminder set for: {}",
                today + chrono::Duration::days(i64::from(follow_up_days))
            );
        }
        None => println!("Already tracking {}", listing.url()),
    }
    Ok(())
}

fn manual_url(timestamp: i64) -> String {
    format!("https://www.linkedin.com/jobs/manual_{timestamp}")
}

/// Set a tracker status by hand.
pub async fn cmd_set_status(
    state: &AppState,
    url: &str,
    status: &str,
    notes: Option<&str>,
) -> anyhow::Result<()> {
    let status = parse_tracker_status(status)?;
    let today = Local::now().date_naive();

    if !applications::set_status(state.db.pool(), url, status, notes, today).await? {
        return Err(CommandError::UnknownApplication(url.to_string()).into());
    }
    println!("Updated status to: {status}");
    Ok(())
}

/// Record an interview date; the status becomes Interview Scheduled.
pub async fn cmd_schedule_interview(
    state: &AppState,
    url: &str,
    date: &str,
    notes: Option<&str>,
) -> anyhow::Result<()> {
    let date = parse_date(date)?;
    let today = Local::now().date_naive();

    if !applications::schedule_interview(state.db.pool(), url, date, notes, today).await? {
        return Err(CommandError::UnknownApplication(url.to_string()).into());
    }
    println!("Interview scheduled for: {date}");
    Ok(())
}

/// Only the statuses a user may set by hand.
pub(crate) fn parse_tracker_status(raw: &str) -> Result<ApplicationStatus, CommandError> {
    ApplicationStatus::parse(raw.trim())
        .filter(|status| status.is_tracker_status())
        .ok_or_else(|| CommandError::InvalidStatus(raw.to_string()))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| CommandError::InvalidDate(raw.to_string()))
}

fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_status_accepts_subset_only() {
        assert_eq!(
            parse_tracker_status("Interview Scheduled").expect("tracker status"),
            ApplicationStatus::InterviewScheduled
        );
        assert_eq!(
            parse_tracker_status(" Offer ").expect("tracker status"),
            ApplicationStatus::Offer
        );
        assert!(matches!(
            parse_tracker_status("Manual Review Needed"),
            Err(CommandError::InvalidStatus(_))
        ));
        assert!(matches!(
            parse_tracker_status("Ghosted"),
            Err(CommandError::InvalidStatus(_))
        ));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-03-14").expect("valid date"),
            NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
        );
        assert!(matches!(parse_date("14/03/2025"), Err(CommandError::InvalidDate(_))));
    }

    #[test]
    fn test_manual_url_is_unique_per_timestamp() {
        assert_eq!(
            manual_url(1_700_000_000),
            "https://www.linkedin.com/jobs/manual_1700000000"
        );
        assert_ne!(manual_url(1), manual_url(2));
    }
}
