use crate::actions::{BrowserActions, StoredCookie};
use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, TimeSinceEpoch};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Element, Page};
use futures::StreamExt;
use jobtrail_core::BrowserConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Browser automation engine backed by a local Chrome/Chromium.
///
/// Owns one browser process and one page for the duration of a run. Call
/// [`shutdown`](Self::shutdown) on every exit path; dropping the engine
/// without it leaves chromiumoxide to kill the child process.
pub struct BrowserEngine {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl BrowserEngine {
    /// Launch a browser with a randomized fingerprint.
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let fingerprint = FingerprintConfig::randomized(config.window_width, config.window_height);
        Self::with_fingerprint(config, fingerprint).await
    }

    /// Launch a browser with a specific fingerprint.
    pub async fn with_fingerprint(
        config: &BrowserConfig,
        fingerprint: FingerprintConfig,
    ) -> Result<Self> {
        let mut builder = LaunchConfig::builder()
            .no_sandbox()
            .window_size(fingerprint.window_width, fingerprint.window_height)
            .arg(format!("--user-agent={}", fingerprint.user_agent));
        if !config.headless {
            builder = builder.with_head();
        }
        let launch_config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(launch_config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error: {}", e);
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        tracing::info!(
            headless = config.headless,
            width = fingerprint.window_width,
            height = fingerprint.window_height,
            "Browser launched"
        );

        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    /// Close the browser and wait for the CDP handler to finish.
    pub async fn shutdown(mut self) -> Result<()> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Browser process wait failed: {}", e);
        }
        self.handler.abort();
        let _ = self.handler.await;
        closed?;
        tracing::debug!("Browser shut down");
        Ok(())
    }

    async fn find_now(&self, selector: &str) -> Result<Option<Element>> {
        Ok(self.page.find_elements(selector).await?.into_iter().next())
    }

    async fn poll_for(&self, selector: &str) -> Result<Element> {
        loop {
            if let Some(element) = self.find_now(selector).await? {
                return Ok(element);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait::async_trait]
impl BrowserActions for BrowserEngine {
    type Element = Element;

    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        tracing::debug!("Navigating to {}", url);
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::Navigation(format!("{url}: {e}"))),
            Err(_) => Err(BrowserError::Timeout(format!(
                "navigation to {url} exceeded {}ms",
                timeout.as_millis()
            ))),
        }
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn find(&self, selector: &str) -> Result<Option<Element>> {
        self.find_now(selector).await
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Element>> {
        Ok(self.page.find_elements(selector).await?)
    }

    async fn find_within(&self, parent: &Element, selector: &str) -> Result<Option<Element>> {
        Ok(parent.find_elements(selector).await?.into_iter().next())
    }

    async fn find_by_text(&self, selector: &str, text: &str) -> Result<Option<Element>> {
        let needle = text.to_lowercase();
        for element in self.page.find_elements(selector).await? {
            let visible = element.inner_text().await?.unwrap_or_default();
            if visible.to_lowercase().contains(&needle) {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<Element> {
        tokio::time::timeout(timeout, self.poll_for(selector))
            .await
            .map_err(|_| {
                BrowserError::Timeout(format!(
                    "{selector} not present after {}ms",
                    timeout.as_millis()
                ))
            })?
    }

    async fn click(&self, element: &Element) -> Result<()> {
        element.click().await?;
        Ok(())
    }

    async fn fill(&self, element: &Element, value: &str) -> Result<()> {
        element
            .call_js_fn("function() { this.focus(); this.value = ''; }", false)
            .await?;
        element.type_str(value).await?;
        Ok(())
    }

    async fn input_value(&self, element: &Element) -> Result<String> {
        let returns = element
            .call_js_fn("function() { return this.value; }", false)
            .await?;
        Ok(returns
            .result
            .value
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default())
    }

    async fn inner_text(&self, element: &Element) -> Result<String> {
        Ok(element.inner_text().await?.unwrap_or_default())
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        Ok(element.attribute(name).await?)
    }

    async fn set_input_files(&self, element: &Element, files: &[PathBuf]) -> Result<()> {
        let files = files
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        let params = SetFileInputFilesParams::builder()
            .files(files)
            .backend_node_id(element.backend_node_id)
            .build()
            .map_err(BrowserError::Chromium)?;
        self.page.execute(params).await?;
        Ok(())
    }

    async fn scroll_by(&self, dx: i64, dy: i64) -> Result<()> {
        self.page
            .evaluate(format!("window.scrollBy({dx}, {dy})"))
            .await?;
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        self.page.save_screenshot(params, path).await?;
        tracing::debug!("Screenshot saved to {}", path.display());
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<StoredCookie>> {
        let cookies = self.page.get_cookies().await?;
        Ok(cookies
            .into_iter()
            .map(|c| StoredCookie {
                name: c.name,
                value: c.value,
                domain: c.domain,
                path: c.path,
                secure: c.secure,
                http_only: c.http_only,
                expires: (c.expires > 0.0).then_some(c.expires),
            })
            .collect())
    }

    async fn set_cookies(&self, cookies: &[StoredCookie]) -> Result<()> {
        let params = cookies.iter().map(cookie_param).collect::<Vec<_>>();
        if !params.is_empty() {
            self.page.set_cookies(params).await?;
        }
        Ok(())
    }
}

/// CDP form of a stored cookie; persistent cookies keep their expiry.
fn cookie_param(cookie: &StoredCookie) -> CookieParam {
    let mut param = CookieParam::new(cookie.name.clone(), cookie.value.clone());
    param.domain = Some(cookie.domain.clone());
    param.path = Some(cookie.path.clone());
    param.secure = Some(cookie.secure);
    param.http_only = Some(cookie.http_only);
    param.expires = cookie.expires.map(TimeSinceEpoch::new);
    param
}
