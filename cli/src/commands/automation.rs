//! Browser-driving commands: scrape, the daily routine and the scheduler.

use crate::routine::{self, RoutineSummary};
use crate::state::AppState;
use chrono::Local;
use jobtrail_auth::ConsoleResolver;
use jobtrail_scanner::{ChromeFactory, ScrapePipeline};
use jobtrail_scheduler::{default_jobs, run_forever, JobType};

fn pipeline(state: &AppState) -> ScrapePipeline<ChromeFactory, ConsoleResolver> {
    ScrapePipeline::new(
        &state.config,
        ChromeFactory::new(state.config.browser.clone()),
        ConsoleResolver,
        state.session_store.clone(),
    )
}

/// Scrape and save, no applications.
pub async fn cmd_scrape(state: &AppState) -> anyhow::Result<()> {
    let listings = pipeline(state).run().await?;
    println!("Found {} jobs", listings.len());

    if !listings.is_empty() {
        let today = Local::now().date_naive();
        let saved = routine::save_listings(state, &listings, today).await?;
        println!("Scraped and saved {} new jobs", saved.len());
    }
    Ok(())
}

/// The full daily routine.
pub async fn cmd_apply(state: &AppState) -> anyhow::Result<()> {
    let summary = run_daily(state).await?;
    println!("Daily routine completed");
    println!("  Jobs scraped: {}", summary.scraped);
    println!("  Jobs saved: {}", summary.saved);
    println!("  Applications sent: {}", summary.applied);
    Ok(())
}

async fn run_daily(state: &AppState) -> anyhow::Result<RoutineSummary> {
    let apply_factory = ChromeFactory::new(state.config.browser.clone());
    routine::daily_routine(
        state,
        &pipeline(state),
        &apply_factory,
        ConsoleResolver,
        Local::now().date_naive(),
    )
    .await
}

/// Run the timetable until the process is stopped.
pub async fn cmd_scheduler(state: &AppState) -> anyhow::Result<()> {
    let jobs = default_jobs();
    println!("Scheduler started. Press Ctrl+C to exit.");
    println!("Scheduled tasks:");
    for job in &jobs {
        println!("  - {job}");
    }

    run_forever(&jobs, |job| run_scheduled(state, job)).await;
    Ok(())
}

/// A failing job is logged and the schedule carries on.
async fn run_scheduled(state: &AppState, job: JobType) {
    let today = Local::now().date_naive();
    let result = match job {
        JobType::DailyRoutine => run_daily(state).await.map(|_| ()),
        JobType::InterviewCheck => routine::monitor_interviews(state, today).await.map(|_| ()),
        JobType::WeeklyReview => routine::weekly_review(state, today).await.map(|_| ()),
    };

    if let Err(e) = result {
        tracing::error!(job = %job, "Scheduled job failed: {:#}", e);
    }
}
