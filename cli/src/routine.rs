//! The daily routine and the maintenance jobs around it.
//!
//! Every step is sequential. Scrape and apply each own their browser for
//! the length of their run and release it on every exit path.

use crate::state::AppState;
use chrono::NaiveDate;
use jobtrail_apply::{ApplicationOutcome, EasyApplier};
use jobtrail_auth::{ChallengeResolver, LoginFlow};
use jobtrail_browser::{BrowserActions, Pacing};
use jobtrail_core::{ApplicationStatus, Credentials, ListingRecord};
use jobtrail_db::{applications, stats, ApplicationRecord, Database, StatsDelta, StatsSummary};
use jobtrail_mail::Notification;
use jobtrail_scanner::{DriverFactory, ScrapePipeline};
use std::path::PathBuf;

/// Interviews closer than this many days trigger a reminder.
pub const INTERVIEW_REMINDER_DAYS: u32 = 2;

/// Window of the weekly review statistics.
pub const WEEKLY_STATS_DAYS: u32 = 7;

/// Counts reported at the end of a daily routine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoutineSummary {
    pub scraped: usize,
    pub saved: usize,
    pub applied: usize,
}

/// Scrape, save, apply, record stats, then run maintenance.
///
/// A scrape that fails even after retries counts as finding nothing; the
/// maintenance steps still run.
pub async fn daily_routine<F, R, A, AR>(
    state: &AppState,
    pipeline: &ScrapePipeline<F, R>,
    apply_factory: &A,
    apply_resolver: AR,
    today: NaiveDate,
) -> anyhow::Result<RoutineSummary>
where
    F: DriverFactory,
    R: ChallengeResolver,
    A: DriverFactory,
    AR: ChallengeResolver,
{
    tracing::info!("[1/5] Scraping new jobs");
    let listings = match pipeline.run().await {
        Ok(listings) => listings,
        Err(e) => {
            tracing::error!("Scrape failed after retries: {}", e);
            Vec::new()
        }
    };
    let mut summary = RoutineSummary {
        scraped: listings.len(),
        ..RoutineSummary::default()
    };

    if listings.is_empty() {
        tracing::info!("No new jobs found, skipping application step");
    } else {
        tracing::info!("[2/5] Saving {} jobs to database", listings.len());
        let fresh = save_listings(state, &listings, today).await?;
        summary.saved = fresh.len();

        tracing::info!(
            auto_apply = state.config.application.auto_apply,
            "[3/5] Processing applications"
        );
        if state.config.application.auto_apply {
            summary.applied = apply_to_listings(state, apply_factory, apply_resolver, &fresh, today).await?;
        } else {
            tracing::info!("Auto-apply disabled, jobs saved for manual review");
        }

        stats::record_daily_stats(
            state.db.pool(),
            today,
            StatsDelta::applications(i64::try_from(summary.applied)?),
        )
        .await?;
    }

    run_maintenance(state, today).await?;

    tracing::info!(
        scraped = summary.scraped,
        saved = summary.saved,
        applied = summary.applied,
        "Daily routine completed"
    );
    Ok(summary)
}

/// Insert listings not yet tracked; returns the ones that were new.
pub async fn save_listings(
    state: &AppState,
    listings: &[ListingRecord],
    today: NaiveDate,
) -> anyhow::Result<Vec<ListingRecord>> {
    let follow_up_days = state.config.application.follow_up_days;
    let mut fresh = Vec::new();

    for listing in listings {
        match applications::upsert_if_absent(state.db.pool(), listing, today, follow_up_days).await? {
            Some(id) => {
                tracing::debug!(id, url = listing.url(), "Saved listing");
                fresh.push(listing.clone());
            }
            None => tracing::debug!(url = listing.url(), "Listing already tracked"),
        }
    }

    tracing::info!("Saved {} new jobs ({} already tracked)", fresh.len(), listings.len() - fresh.len());
    Ok(fresh)
}

/// Apply to at most `max_applications_per_day` listings on a browser of
/// their own. Returns how many were submitted.
pub async fn apply_to_listings<A, R>(
    state: &AppState,
    factory: &A,
    resolver: R,
    listings: &[ListingRecord],
    today: NaiveDate,
) -> anyhow::Result<usize>
where
    A: DriverFactory,
    R: ChallengeResolver,
{
    if listings.is_empty() {
        return Ok(0);
    }
    let Some(credentials) = state.config.credentials.as_ref() else {
        tracing::warn!("Credentials not found; skipping applications");
        return Ok(0);
    };

    let driver = match factory.launch().await {
        Ok(driver) => driver,
        Err(e) => {
            tracing::error!("Could not start browser for applications: {}", e);
            return Ok(0);
        }
    };
    let result = apply_with_driver(state, &driver, credentials, resolver, listings, today).await;
    factory.release(driver).await;
    result
}

async fn apply_with_driver<B, R>(
    state: &AppState,
    driver: &B,
    credentials: &Credentials,
    resolver: R,
    listings: &[ListingRecord],
    today: NaiveDate,
) -> anyhow::Result<usize>
where
    B: BrowserActions,
    R: ChallengeResolver,
{
    let config = &state.config;
    let pacing = Pacing::new(config.pacing.clone());
    let login = LoginFlow::new(
        config.auth.clone(),
        config.search.base_url.clone(),
        config.browser.timeout(),
        pacing.clone(),
        resolver,
    )
    .with_session_store(state.session_store.clone());

    let prior = state.session_store.load();
    if !login.login(driver, credentials, prior.as_ref()).await {
        tracing::error!("Not logged in; skipping applications");
        return Ok(0);
    }

    let applier = EasyApplier::from_config(config)?;
    let max = config.application.max_applications_per_day;
    let mut applied = 0;

    for (idx, listing) in listings.iter().take(max).enumerate() {
        tracing::info!("Application {}/{}", idx + 1, max.min(listings.len()));
        let outcome = applier.apply(driver, listing).await;
        let status = record_outcome(&state.db, listing.url(), &outcome, today).await?;

        state
            .notifier
            .notify(&Notification::ApplicationUpdate {
                job_title: listing.title().to_string(),
                company: listing.company().to_string(),
                location: listing.location().to_string(),
                status,
            })
            .await;

        if outcome.is_applied() {
            applied += 1;
            tracing::info!(url = listing.url(), "Successfully applied");
            pacing.pause(config.pacing.after_applied_ms).await;
        }
        pacing.pause(config.pacing.between_applications_ms).await;
    }

    Ok(applied)
}

/// Store the status, notes and evidence of one application attempt.
pub async fn record_outcome(
    db: &Database,
    url: &str,
    outcome: &ApplicationOutcome,
    today: NaiveDate,
) -> anyhow::Result<ApplicationStatus> {
    let status = outcome.status();
    let notes = outcome.notes();

    if !applications::set_status(db.pool(), url, status, notes.as_deref(), today).await? {
        tracing::warn!(url, "Outcome for an untracked listing");
    }
    if let Some(path) = outcome.evidence() {
        applications::set_evidence(db.pool(), url, &path.to_string_lossy()).await?;
    }

    Ok(status)
}

/// Follow-up reminders, then the daily report and its notification.
pub async fn run_maintenance(state: &AppState, today: NaiveDate) -> anyhow::Result<Option<PathBuf>> {
    tracing::info!("[4/5] Checking for follow-ups");
    for record in due_followups(state, today).await? {
        state.notifier.notify(&followup_notification(&record)).await;
    }

    tracing::info!("[5/5] Generating daily report");
    let report = match state.reports.render_daily(today).await {
        Ok(path) => path,
        Err(e) => {
            tracing::error!("Daily report failed: {}", e);
            return Ok(None);
        }
    };
    state
        .notifier
        .notify(&Notification::DailyReport {
            date: today,
            report_path: report.clone(),
        })
        .await;

    Ok(Some(report))
}

/// Applications whose follow-up date has arrived.
pub async fn due_followups(state: &AppState, today: NaiveDate) -> anyhow::Result<Vec<ApplicationRecord>> {
    let due = applications::query_due_followups(state.db.pool(), today).await?;
    tracing::info!("{} follow-ups needed", due.len());
    Ok(due)
}

/// Send a reminder for every interview in the next two days.
pub async fn monitor_interviews(state: &AppState, today: NaiveDate) -> anyhow::Result<Vec<ApplicationRecord>> {
    let upcoming =
        applications::query_upcoming_interviews(state.db.pool(), today, INTERVIEW_REMINDER_DAYS).await?;

    for record in &upcoming {
        let Some(date) = record.interview_date else {
            continue;
        };
        state
            .notifier
            .notify(&Notification::InterviewReminder {
                job_title: record.job_title.clone(),
                company: record.company_name.clone(),
                date,
                notes: record.notes.clone(),
            })
            .await;
    }

    tracing::info!("Interview check completed ({} upcoming)", upcoming.len());
    Ok(upcoming)
}

/// Render the weekly report, send it, and return it with the week's stats.
pub async fn weekly_review(state: &AppState, today: NaiveDate) -> anyhow::Result<(PathBuf, StatsSummary)> {
    let report = state.reports.render_weekly(today).await?;
    state
        .notifier
        .notify(&Notification::WeeklyReport {
            date: today,
            report_path: report.clone(),
        })
        .await;

    let summary = stats::stats_summary(state.db.pool(), today, WEEKLY_STATS_DAYS).await?;
    Ok((report, summary))
}

fn followup_notification(record: &ApplicationRecord) -> Notification {
    Notification::FollowUpReminder {
        job_title: record.job_title.clone(),
        company: record.company_name.clone(),
        discovered: record.date_discovered,
        status: record.status,
        url: record.job_url.clone(),
    }
}
