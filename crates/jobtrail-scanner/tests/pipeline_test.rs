use async_trait::async_trait;
use jobtrail_auth::login::selectors as login_selectors;
use jobtrail_auth::{ChannelResolver, SessionStore};
use jobtrail_browser::fake::{FakeBrowser, FakeNode};
use jobtrail_browser::BrowserError;
use jobtrail_core::{AppConfig, Credentials, PacingConfig, SearchQuery};
use jobtrail_scanner::collector::selectors;
use jobtrail_scanner::{build_search_url, DriverFactory, ScrapePipeline};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

const BASE: &str = "https://jobs.test";

/// Hands out scripted outcomes, one per launch.
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

fn config(locations: &[&str]) -> AppConfig {
    let mut config = AppConfig::default();
    config.search.base_url = BASE.to_string();
    config.search.keywords = vec!["Engineer".to_string()];
    config.search.locations = locations.iter().map(ToString::to_string).collect();
    config.search.blacklist_companies = vec!["Blocked".to_string()];
    config.pacing = PacingConfig::none();
    config.credentials = Some(Credentials::new("me@example.com", "hunter2"));
    config
}

fn card(id: u32, company: &str) -> FakeNode {
    FakeNode::new(selectors::CARD)
        .child(FakeNode::new(selectors::TITLE).text("Engineer"))
        .child(FakeNode::new(selectors::COMPANY).text(company))
        .child(FakeNode::new(selectors::LOCATION).text("Remote"))
        .child(FakeNode::new(selectors::LINK).attr("href", format!("https://x/job/{id}?trk=s")))
}

fn results(cards: Vec<FakeNode>) -> Vec<FakeNode> {
    let mut nodes = vec![FakeNode::new(selectors::RESULTS_CONTAINER)];
    nodes.extend(cards);
    nodes
}

fn site() -> FakeBrowser {
    let feed = format!("{BASE}/feed/");
    let remote = build_search_url(BASE, &SearchQuery::new("Engineer", "Remote"));
    let onboard = build_search_url(BASE, &SearchQuery::new("Engineer", "Onboard"));

    FakeBrowser::new()
        .page(
            format!("{BASE}/login"),
            vec![
                FakeNode::new(login_selectors::USERNAME),
                FakeNode::new(login_selectors::PASSWORD),
                FakeNode::new(login_selectors::SUBMIT).navigates_to(&feed),
            ],
        )
        .page(&feed, vec![FakeNode::new(login_selectors::AUTH_MARKER)])
        .page(remote, results(vec![card(1, "Acme"), card(2, "Blocked Corp")]))
        .page(onboard, results(vec![card(3, "Initech"), card(1, "Acme")]))
}

#[tokio::test]
async fn test_shared_listing_appears_once() {
    let tmp = TempDir::new().expect("temp dir");
    let config = config(&["Remote", "Onboard"]);
    let factory = ScriptedFactory::new(vec![Ok(site())]);
    let (resolver, _tx) = ChannelResolver::new();
    let pipeline = ScrapePipeline::new(
        &config,
        factory,
        resolver,
        SessionStore::new(tmp.path().join("session.json")),
    );

    let listings = pipeline.run().await.expect("scrape");
    let urls: Vec<_> = listings.iter().map(|l| l.url().to_string()).collect();
    assert_eq!(urls, vec!["https://x/job/1", "https://x/job/3"]);
}

#[tokio::test]
async fn test_missing_credentials_returns_empty_without_launch() {
    let tmp = TempDir::new().expect("temp dir");
    let mut config = config(&["Remote"]);
    config.credentials = None;
    let (resolver, _tx) = ChannelResolver::new();
    let pipeline = ScrapePipeline::new(
        &config,
        ScriptedFactory::new(vec![]),
        resolver,
        SessionStore::new(tmp.path().join("session.json")),
    );

    assert!(pipeline.run().await.expect("scrape").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_transient_launch_failures_are_retried() {
    let tmp = TempDir::new().expect("temp dir");
    let config = config(&["Remote"]);
    let factory = ScriptedFactory::new(vec![
        Err(BrowserError::Connection("devtools socket closed".to_string())),
        Err(BrowserError::Timeout("launch".to_string())),
        Ok(site()),
    ]);
    let (resolver, _tx) = ChannelResolver::new();
    let pipeline = ScrapePipeline::new(
        &config,
        factory,
        resolver,
        SessionStore::new(tmp.path().join("session.json")),
    );

    let listings = pipeline.run().await.expect("third attempt succeeds");
    assert_eq!(listings.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_search_timeout_releases_browser_and_propagates() {
    let tmp = TempDir::new().expect("temp dir");
    let config = config(&["Remote"]);
    let remote = build_search_url(BASE, &SearchQuery::new("Engineer", "Remote"));
    let flaky =
        || site().failing_navigation(&remote, BrowserError::Timeout("results".to_string()));
    let factory = ScriptedFactory::new(vec![Ok(flaky()), Ok(flaky()), Ok(flaky())]);
    let (resolver, _tx) = ChannelResolver::new();
    let pipeline = ScrapePipeline::new(
        &config,
        factory,
        resolver,
        SessionStore::new(tmp.path().join("session.json")),
    );

    let err = pipeline.run().await.expect_err("every attempt times out");
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_permanent_launch_failure_is_empty_result() {
    let tmp = TempDir::new().expect("temp dir");
    let config = config(&["Remote"]);
    let factory = ScriptedFactory::new(vec![Err(BrowserError::Launch(
        "chrome not installed".to_string(),
    ))]);
    let (resolver, _tx) = ChannelResolver::new();
    let pipeline = ScrapePipeline::new(
        &config,
        factory,
        resolver,
        SessionStore::new(tmp.path().join("session.json")),
    );

    assert!(pipeline.run().await.expect("no error surfaced").is_empty());
}

#[tokio::test]
async fn test_failed_login_is_empty_result() {
    let tmp = TempDir::new().expect("temp dir");
    let config = config(&["Remote"]);
    let browser = FakeBrowser::new().page(format!("{BASE}/login"), vec![]);
    let (resolver, _tx) = ChannelResolver::new();
    let pipeline = ScrapePipeline::new(
        &config,
        ScriptedFactory::new(vec![Ok(browser)]),
        resolver,
        SessionStore::new(tmp.path().join("session.json")),
    );

    assert!(pipeline.run().await.expect("scrape").is_empty());
}
