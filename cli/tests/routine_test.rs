//! Integration tests for the daily routine and the maintenance jobs.
//!
//! A scripted in-memory browser stands in for Chrome, the record store is
//! SQLite in memory and mail goes to a recording transport.

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate};
use jobtrail_apply::{ApplicationOutcome, ManualReason};
use jobtrail_auth::login::selectors as login_selectors;
use jobtrail_auth::{ChannelResolver, SessionStore};
use jobtrail_browser::fake::{FakeBrowser, FakeNode};
use jobtrail_browser::BrowserError;
use jobtrail_cli::error::CommandError;
use jobtrail_cli::routine;
use jobtrail_cli::state::AppState;
use jobtrail_core::{AppConfig, ApplicationStatus, Credentials, ListingRecord, PacingConfig, SearchQuery};
use jobtrail_db::{applications, stats, Database};
use jobtrail_mail::{MailTransport, Notifier};
use jobtrail_reports::ReportRenderer;
use jobtrail_scanner::collector::selectors;
use jobtrail_scanner::{build_search_url, DriverFactory, ScrapePipeline};
use lettre::Message;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const BASE: &str = "https://jobs.test";
const EASY_APPLY: &str = "button.jobs-apply-button[aria-label*='Easy Apply']";
const SUBMIT: &str = "button[aria-label*='Submit application']:not([disabled])";

/// Hands out scripted browsers, one per launch.
struct ScriptedFactory {
    launches: Mutex<VecDeque<Result<FakeBrowser, BrowserError>>>,
    launched: AtomicU32,
    released: AtomicU32,
}

impl ScriptedFactory {
    fn new(launches: Vec<Result<FakeBrowser, BrowserError>>) -> Self {
        Self {
            launches: Mutex::new(launches.into()),
            launched: AtomicU32::new(0),
            released: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl DriverFactory for ScriptedFactory {
    type Driver = FakeBrowser;

    async fn launch(&self) -> Result<FakeBrowser, BrowserError> {
        self.launched.fetch_add(1, Ordering::SeqCst);
        self.launches
            .lock()
            .expect("launch queue")
            .pop_front()
            .unwrap_or_else(|| Err(BrowserError::Launch("no more scripted browsers".to_string())))
    }

    async fn release(&self, _driver: FakeBrowser) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Keeps the subject line of every sent message.
#[derive(Clone, Default)]
struct Outbox {
    subjects: Arc<Mutex<Vec<String>>>,
}

impl Outbox {
    fn subjects(&self) -> Vec<String> {
        self.subjects.lock().expect("outbox lock").clone()
    }
}

#[async_trait]
impl MailTransport for Outbox {
    async fn deliver(&self, message: Message) -> jobtrail_mail::Result<()> {
        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();
        if let Some(subject) = raw.lines().find_map(|l| l.strip_prefix("Subject: ")) {
            self.subjects
                .lock()
                .expect("outbox lock")
                .push(subject.to_string());
        }
        Ok(())
    }
}

struct Harness {
    state: AppState,
    outbox: Outbox,
    tmp: TempDir,
}

impl Harness {
    async fn new(auto_apply: bool) -> Self {
        let tmp = TempDir::new().expect("temp dir");

        let mut config = AppConfig::default();
        config.search.base_url = BASE.to_string();
        config.search.keywords = vec!["Engineer".to_string()];
        config.search.locations = vec!["Remote".to_string()];
        config.application.auto_apply = auto_apply;
        config.application.max_applications_per_day = 1;
        config.pacing = PacingConfig::none();
        config.paths.data_dir = Some(tmp.path().to_path_buf());
        config.paths.screenshots_dir = Some(tmp.path().join("screenshots"));
        config.credentials = Some(Credentials::new("me@example.com", "hunter2"));

        let db = Database::in_memory().await.expect("open db");
        db.run_migrations().await.expect("migrate");

        let outbox = Outbox::default();
        let notifier = Notifier::with_transport("me@example.com", Box::new(outbox.clone()))
            .expect("valid mailbox");
        let reports = ReportRenderer::new(db.clone(), tmp.path().join("reports"));
        let session_store = SessionStore::new(tmp.path().join("session.json"));

        Self {
            state: AppState::from_parts(config, db, notifier, reports, session_store),
            outbox,
            tmp,
        }
    }

    fn pipeline(&self, factory: ScriptedFactory) -> ScrapePipeline<ScriptedFactory, ChannelResolver> {
        let (resolver, _tx) = ChannelResolver::new();
        ScrapePipeline::new(
            &self.state.config,
            factory,
            resolver,
            self.state.session_store.clone(),
        )
    }

    async fn status_of(&self, url: &str) -> ApplicationStatus {
        applications::get_by_url(self.state.db.pool(), url)
            .await
            .expect("query")
            .expect("tracked")
            .status
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn login_pages(browser: FakeBrowser) -> FakeBrowser {
    let feed = format!("{BASE}/feed/");
    browser
        .page(
            format!("{BASE}/login"),
            vec![
                FakeNode::new(login_selectors::USERNAME),
                FakeNode::new(login_selectors::PASSWORD),
                FakeNode::new(login_selectors::SUBMIT).navigates_to(&feed),
            ],
        )
        .page(&feed, vec![FakeNode::new(login_selectors::AUTH_MARKER)])
}

fn card(id: u32, company: &str) -> FakeNode {
    FakeNode::new(selectors::CARD)
        .child(FakeNode::new(selectors::TITLE).text("Engineer"))
        .child(FakeNode::new(selectors::COMPANY).text(company))
        .child(FakeNode::new(selectors::LOCATION).text("Remote"))
        .child(FakeNode::new(selectors::LINK).attr("href", format!("https://x/job/{id}?trk=s")))
}

fn search_site() -> FakeBrowser {
    let remote = build_search_url(BASE, &SearchQuery::new("Engineer", "Remote"));
    login_pages(FakeBrowser::new()).page(
        remote,
        vec![
            FakeNode::new(selectors::RESULTS_CONTAINER),
            card(1, "Acme"),
            card(2, "Initech"),
        ],
    )
}

fn apply_site() -> FakeBrowser {
    login_pages(FakeBrowser::new())
        .page(
            "https://x/job/1",
            vec![FakeNode::new(EASY_APPLY).text("Easy Apply").navigates_to("form/1")],
        )
        .page("form/1", vec![FakeNode::new(SUBMIT).text("Submit application")])
}

#[tokio::test]
async fn test_daily_routine_scrapes_saves_and_applies() {
    let harness = Harness::new(true).await;
    let scrape = ScriptedFactory::new(vec![Ok(search_site())]);
    let apply = ScriptedFactory::new(vec![Ok(apply_site())]);
    let (resolver, _tx) = ChannelResolver::new();

    let summary = routine::daily_routine(
        &harness.state,
        &harness.pipeline(scrape),
        &apply,
        resolver,
        today(),
    )
    .await
    .expect("routine");

    assert_eq!(summary.scraped, 2);
    assert_eq!(summary.saved, 2);
    // Capped at one application per day
    assert_eq!(summary.applied, 1);
    assert_eq!(apply.launched.load(Ordering::SeqCst), 1);
    assert_eq!(apply.released.load(Ordering::SeqCst), 1);

    assert_eq!(harness.status_of("https://x/job/1").await, ApplicationStatus::Applied);
    assert_eq!(harness.status_of("https://x/job/2").await, ApplicationStatus::Discovered);

    let record = applications::get_by_url(harness.state.db.pool(), "https://x/job/1")
        .await
        .expect("query")
        .expect("tracked");
    let evidence = record.screenshot_path.expect("evidence path stored");
    assert!(evidence.contains("success_Acme_"));

    let counters = stats::daily_stats(harness.state.db.pool(), today())
        .await
        .expect("stats")
        .expect("row for today");
    assert_eq!(counters.applications_sent, 1);

    let report = harness
        .tmp
        .path()
        .join("reports")
        .join(format!("daily_report_{}.html", today()));
    assert!(report.exists());

    assert_eq!(
        harness.outbox.subjects(),
        vec![
            "Application Applied: Engineer".to_string(),
            format!("Daily Job Application Report - {}", today()),
        ]
    );
}

#[tokio::test]
async fn test_auto_apply_disabled_records_only() {
    let harness = Harness::new(false).await;
    let scrape = ScriptedFactory::new(vec![Ok(search_site())]);
    let apply = ScriptedFactory::new(vec![Ok(apply_site())]);
    let (resolver, _tx) = ChannelResolver::new();

    let summary = routine::daily_routine(
        &harness.state,
        &harness.pipeline(scrape),
        &apply,
        resolver,
        today(),
    )
    .await
    .expect("routine");

    assert_eq!(summary.saved, 2);
    assert_eq!(summary.applied, 0);
    assert_eq!(apply.launched.load(Ordering::SeqCst), 0);
    assert_eq!(harness.status_of("https://x/job/1").await, ApplicationStatus::Discovered);

    let counters = stats::daily_stats(harness.state.db.pool(), today())
        .await
        .expect("stats")
        .expect("row for today");
    assert_eq!(counters.applications_sent, 0);
}

#[tokio::test]
async fn test_failed_scrape_still_runs_maintenance() {
    let harness = Harness::new(true).await;
    let scrape = ScriptedFactory::new(vec![Err(BrowserError::Launch("chrome missing".to_string()))]);
    let apply = ScriptedFactory::new(vec![]);
    let (resolver, _tx) = ChannelResolver::new();

    let summary = routine::daily_routine(
        &harness.state,
        &harness.pipeline(scrape),
        &apply,
        resolver,
        today(),
    )
    .await
    .expect("routine");

    assert_eq!(summary, routine::RoutineSummary::default());
    assert_eq!(apply.launched.load(Ordering::SeqCst), 0);
    assert!(stats::daily_stats(harness.state.db.pool(), today())
        .await
        .expect("stats")
        .is_none());
    assert_eq!(
        harness.outbox.subjects(),
        vec![format!("Daily Job Application Report - {}", today())]
    );
}

#[tokio::test]
async fn test_failed_apply_login_skips_applications() {
    let harness = Harness::new(true).await;
    let listing = ListingRecord::new("Engineer", "Acme", "Remote", "https://x/job/1");
    let fresh = routine::save_listings(&harness.state, &[listing], today())
        .await
        .expect("save");

    // No login form on this site
    let apply = ScriptedFactory::new(vec![Ok(FakeBrowser::new())]);
    let (resolver, _tx) = ChannelResolver::new();
    let applied = routine::apply_to_listings(&harness.state, &apply, resolver, &fresh, today())
        .await
        .expect("apply run");

    assert_eq!(applied, 0);
    assert_eq!(apply.released.load(Ordering::SeqCst), 1);
    assert_eq!(harness.status_of("https://x/job/1").await, ApplicationStatus::Discovered);
}

#[tokio::test]
async fn test_save_listings_skips_tracked() {
    let harness = Harness::new(false).await;
    let listings = vec![
        ListingRecord::new("Engineer", "Acme", "Remote", "https://x/job/1"),
        ListingRecord::new("Engineer", "Initech", "Remote", "https://x/job/2"),
    ];

    let first = routine::save_listings(&harness.state, &listings, today())
        .await
        .expect("save");
    assert_eq!(first.len(), 2);

    let again = routine::save_listings(&harness.state, &listings[..1], today())
        .await
        .expect("save again");
    assert!(again.is_empty());
}

#[tokio::test]
async fn test_record_outcome_stores_status_notes_and_evidence() {
    let harness = Harness::new(false).await;
    let listing = ListingRecord::new("Engineer", "Acme", "Remote", "https://x/job/1");
    routine::save_listings(&harness.state, &[listing], today())
        .await
        .expect("save");

    let outcome = ApplicationOutcome::ManualRequired {
        reason: ManualReason::RequiredFields(2),
        evidence: Some(PathBuf::from("/shots/manual_input_Acme_20250314_101500.png")),
    };
    let status = routine::record_outcome(&harness.state.db, "https://x/job/1", &outcome, today())
        .await
        .expect("record");
    assert_eq!(status, ApplicationStatus::ManualReviewNeeded);

    let record = applications::get_by_url(harness.state.db.pool(), "https://x/job/1")
        .await
        .expect("query")
        .expect("tracked");
    assert_eq!(record.status, ApplicationStatus::ManualReviewNeeded);
    assert_eq!(record.notes, outcome.notes());
    assert_eq!(
        record.screenshot_path.as_deref(),
        Some("/shots/manual_input_Acme_20250314_101500.png")
    );
}

#[tokio::test]
async fn test_maintenance_sends_due_followups() {
    let harness = Harness::new(false).await;
    let ten_days_ago = today() - Duration::days(10);
    let listing = ListingRecord::new("Engineer", "Acme", "Remote", "https://x/job/1")
        .with_discovered_date(ten_days_ago);
    routine::save_listings(&harness.state, &[listing], ten_days_ago)
        .await
        .expect("save");
    applications::set_status(
        harness.state.db.pool(),
        "https://x/job/1",
        ApplicationStatus::Applied,
        None,
        ten_days_ago,
    )
    .await
    .expect("set status");

    let report = routine::run_maintenance(&harness.state, today())
        .await
        .expect("maintenance")
        .expect("report rendered");

    assert!(report.exists());
    assert_eq!(
        harness.outbox.subjects(),
        vec![
            "Follow-up Reminder: Engineer".to_string(),
            format!("Daily Job Application Report - {}", today()),
        ]
    );
}

#[tokio::test]
async fn test_interview_reminders_cover_two_days() {
    let harness = Harness::new(false).await;
    let listings = vec![
        ListingRecord::new("Soon", "Acme", "Remote", "https://x/job/1"),
        ListingRecord::new("Later", "Initech", "Remote", "https://x/job/2"),
    ];
    routine::save_listings(&harness.state, &listings, today())
        .await
        .expect("save");

    let pool = harness.state.db.pool();
    applications::schedule_interview(pool, "https://x/job/1", today() + Duration::days(1), None, today())
        .await
        .expect("schedule");
    applications::schedule_interview(pool, "https://x/job/2", today() + Duration::days(5), None, today())
        .await
        .expect("schedule");

    let upcoming = routine::monitor_interviews(&harness.state, today())
        .await
        .expect("interview check");

    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].job_title, "Soon");
    assert_eq!(harness.outbox.subjects(), vec!["Interview Reminder: Soon".to_string()]);
}

#[tokio::test]
async fn test_weekly_review_renders_and_notifies() {
    let harness = Harness::new(false).await;
    let listing = ListingRecord::new("Engineer", "Acme", "Remote", "https://x/job/1");
    routine::save_listings(&harness.state, &[listing], today())
        .await
        .expect("save");

    let (report, summary) = routine::weekly_review(&harness.state, today())
        .await
        .expect("weekly review");

    assert!(report.exists());
    assert!(report.with_extension("csv").exists());
    assert_eq!(summary.window_days, 7);
    assert_eq!(summary.total_tracked, 1);
    assert_eq!(
        harness.outbox.subjects(),
        vec![format!("Weekly Job Application Summary - {}", today())]
    );
}

#[test]
fn test_exit_codes_separate_credentials_from_bad_input() {
    assert_eq!(CommandError::MissingCredentials.exit_code(), 1);
    for error in [
        CommandError::InvalidStatus("Ghosted".to_string()),
        CommandError::InvalidDate("14/03/2025".to_string()),
        CommandError::UnknownApplication("https://x/job/404".to_string()),
    ] {
        assert_eq!(error.exit_code(), 2, "{error}");
    }
}
