use jobtrail_browser::{BrowserActions, BrowserEngine};
use jobtrail_core::BrowserConfig;
use std::time::Duration;

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_browser_engine_launch_and_shutdown() {
    let engine = BrowserEngine::launch(&BrowserConfig::default())
        .await
        .expect("launch browser");
    engine.shutdown().await.expect("shutdown browser");
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_navigation_and_query() {
    let engine = BrowserEngine::launch(&BrowserConfig::default())
        .await
        .expect("launch browser");

    engine
        .navigate("https://example.com", Duration::from_secs(30))
        .await
        .expect("navigate");
    assert!(engine
        .current_url()
        .await
        .expect("current url")
        .starts_with("https://example.com"));

    let heading = engine
        .wait_for("h1", Duration::from_secs(5))
        .await
        .expect("heading present");
    assert!(!engine.inner_text(&heading).await.expect("text").is_empty());
    assert!(engine
        .find("#definitely-not-here")
        .await
        .expect("query")
        .is_none());

    engine.shutdown().await.expect("shutdown browser");
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_screenshot_written() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let path = tmp.path().join("shots").join("page.png");
    let engine = BrowserEngine::launch(&BrowserConfig::default())
        .await
        .expect("launch browser");

    engine
        .navigate("https://example.com", Duration::from_secs(30))
        .await
        .expect("navigate");
    engine.screenshot(&path).await.expect("screenshot");
    assert!(path.exists());

    engine.shutdown().await.expect("shutdown browser");
}
