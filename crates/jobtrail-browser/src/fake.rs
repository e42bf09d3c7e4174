//! Scripted in-memory browser for tests.
//!
//! Pages are registered by URL and hold a flat list of [`FakeNode`]s. A node
//! answers to the exact selector strings it was registered with, so tests
//! describe screens using the same selector constants the code under test
//! queries. Clicking a node can navigate to another registered page, which
//! is how multi-step flows are scripted.

use crate::actions::{BrowserActions, StoredCookie};
use crate::error::{BrowserError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// One element on a scripted page.
#[derive(Debug, Clone, Default)]
pub struct FakeNode {
    selectors: Vec<String>,
    text: String,
    value: String,
    attributes: HashMap<String, String>,
    children: Vec<FakeNode>,
    navigates_to: Option<String>,
    fails_on_fill: bool,
}

impl FakeNode {
    /// A node answering to `selector`.
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selectors: vec![selector.into()],
            ..Self::default()
        }
    }

    /// Also answer to `selector`.
    #[must_use]
    pub fn matching(mut self, selector: impl Into<String>) -> Self {
        self.selectors.push(selector.into());
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: FakeNode) -> Self {
        self.children.push(child);
        self
    }

    /// Clicking this node loads the page registered at `url`.
    #[must_use]
    pub fn navigates_to(mut self, url: impl Into<String>) -> Self {
        self.navigates_to = Some(url.into());
        self
    }

    /// Filling this node fails with a driver error.
    #[must_use]
    pub fn failing_fill(mut self) -> Self {
        self.fails_on_fill = true;
        self
    }

    fn answers(&self, selector: &str) -> bool {
        self.selectors.iter().any(|s| s == selector)
    }
}

/// Handle to a node: page URL plus index path through the node tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeElement {
    page: String,
    path: Vec<usize>,
}

#[derive(Debug, Default)]
struct FakeState {
    pages: HashMap<String, Vec<FakeNode>>,
    failing_urls: HashMap<String, BrowserError>,
    current: String,
    cookies: Vec<StoredCookie>,
    navigations: Vec<String>,
    clicks: Vec<String>,
    fills: Vec<(String, String)>,
    uploads: Vec<PathBuf>,
    screenshots: Vec<PathBuf>,
    scrolls: u32,
}

impl FakeState {
    fn nodes(&self) -> &[FakeNode] {
        self.pages
            .get(&self.current)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn node(&self, element: &FakeElement) -> Result<&FakeNode> {
        let detached = || BrowserError::Chromium("element is detached from the page".to_string());
        if element.page != self.current {
            return Err(detached());
        }
        let (first, rest) = element.path.split_first().ok_or_else(detached)?;
        let mut node = self.nodes().get(*first).ok_or_else(detached)?;
        for idx in rest {
            node = node.children.get(*idx).ok_or_else(detached)?;
        }
        Ok(node)
    }

    fn node_mut(&mut self, element: &FakeElement) -> Result<&mut FakeNode> {
        let detached = || BrowserError::Chromium("element is detached from the page".to_string());
        if element.page != self.current {
            return Err(detached());
        }
        let (first, rest) = element.path.split_first().ok_or_else(detached)?;
        let mut node = self
            .pages
            .get_mut(&element.page)
            .and_then(|nodes| nodes.get_mut(*first))
            .ok_or_else(detached)?;
        for idx in rest {
            node = node.children.get_mut(*idx).ok_or_else(detached)?;
        }
        Ok(node)
    }

    fn matching(&self, selector: &str) -> Vec<FakeElement> {
        self.nodes()
            .iter()
            .enumerate()
            .filter(|(_, node)| node.answers(selector))
            .map(|(idx, _)| FakeElement {
                page: self.current.clone(),
                path: vec![idx],
            })
            .collect()
    }
}

/// Cloneable handle to a scripted browser; clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeBrowser {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBrowser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the page served at `url`.
    #[must_use]
    pub fn page(self, url: impl Into<String>, nodes: Vec<FakeNode>) -> Self {
        self.lock().pages.insert(url.into(), nodes);
        self
    }

    /// Navigating to `url` fails with `error`.
    #[must_use]
    pub fn failing_navigation(self, url: impl Into<String>, error: BrowserError) -> Self {
        self.lock().failing_urls.insert(url.into(), error);
        self
    }

    /// Jump to `url` without recording a navigation, as a human would.
    pub fn set_current(&self, url: impl Into<String>) {
        self.lock().current = url.into();
    }

    /// Selector of every clicked element, in order.
    #[must_use]
    pub fn clicks(&self) -> Vec<String> {
        self.lock().clicks.clone()
    }

    /// `(selector, value)` of every fill, in order.
    #[must_use]
    pub fn fills(&self) -> Vec<(String, String)> {
        self.lock().fills.clone()
    }

    /// Every URL passed to `navigate`, in order.
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.lock().navigations.clone()
    }

    #[must_use]
    pub fn uploads(&self) -> Vec<PathBuf> {
        self.lock().uploads.clone()
    }

    #[must_use]
    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.lock().screenshots.clone()
    }

    #[must_use]
    pub fn scrolls(&self) -> u32 {
        self.lock().scrolls
    }

    #[must_use]
    pub fn installed_cookies(&self) -> Vec<StoredCookie> {
        self.lock().cookies.clone()
    }

    /// Seed the cookie jar.
    #[must_use]
    pub fn with_cookies(self, cookies: Vec<StoredCookie>) -> Self {
        self.lock().cookies = cookies;
        self
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        // A panic in another test thread must not cascade
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn clone_error(err: &BrowserError) -> BrowserError {
    match err {
        BrowserError::Launch(m) => BrowserError::Launch(m.clone()),
        BrowserError::Chromium(m) => BrowserError::Chromium(m.clone()),
        BrowserError::Navigation(m) => BrowserError::Navigation(m.clone()),
        BrowserError::Connection(m) => BrowserError::Connection(m.clone()),
        BrowserError::SelectorNotFound(m) => BrowserError::SelectorNotFound(m.clone()),
        BrowserError::Timeout(m) => BrowserError::Timeout(m.clone()),
        BrowserError::Io(e) => BrowserError::Io(std::io::Error::new(e.kind(), e.to_string())),
    }
}

#[async_trait::async_trait]
impl BrowserActions for FakeBrowser {
    type Element = FakeElement;

    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<()> {
        let mut state = self.lock();
        state.navigations.push(url.to_string());
        if let Some(err) = state.failing_urls.get(url) {
            return Err(clone_error(err));
        }
        state.current = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.lock().current.clone())
    }

    async fn find(&self, selector: &str) -> Result<Option<FakeElement>> {
        Ok(self.lock().matching(selector).into_iter().next())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FakeElement>> {
        Ok(self.lock().matching(selector))
    }

    async fn find_within(
        &self,
        parent: &FakeElement,
        selector: &str,
    ) -> Result<Option<FakeElement>> {
        let state = self.lock();
        let node = state.node(parent)?;
        Ok(node
            .children
            .iter()
            .position(|child| child.answers(selector))
            .map(|idx| {
                let mut path = parent.path.clone();
                path.push(idx);
                FakeElement {
                    page: parent.page.clone(),
                    path,
                }
            }))
    }

    async fn find_by_text(&self, selector: &str, text: &str) -> Result<Option<FakeElement>> {
        let state = self.lock();
        let needle = text.to_lowercase();
        for element in state.matching(selector) {
            if state.node(&element)?.text.to_lowercase().contains(&needle) {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<FakeElement> {
        self.lock()
            .matching(selector)
            .into_iter()
            .next()
            .ok_or_else(|| BrowserError::Timeout(format!("{selector} never appeared")))
    }

    async fn click(&self, element: &FakeElement) -> Result<()> {
        let mut state = self.lock();
        let node = state.node(element)?;
        let label = node.selectors.first().cloned().unwrap_or_default();
        let target = node.navigates_to.clone();
        state.clicks.push(label);
        if let Some(url) = target {
            state.current = url;
        }
        Ok(())
    }

    async fn fill(&self, element: &FakeElement, value: &str) -> Result<()> {
        let mut state = self.lock();
        let node = state.node_mut(element)?;
        if node.fails_on_fill {
            return Err(BrowserError::Chromium("element is not editable".to_string()));
        }
        node.value = value.to_string();
        let label = node.selectors.first().cloned().unwrap_or_default();
        state.fills.push((label, value.to_string()));
        Ok(())
    }

    async fn input_value(&self, element: &FakeElement) -> Result<String> {
        Ok(self.lock().node(element)?.value.clone())
    }

    async fn inner_text(&self, element: &FakeElement) -> Result<String> {
        Ok(self.lock().node(element)?.text.clone())
    }

    async fn attribute(&self, element: &FakeElement, name: &str) -> Result<Option<String>> {
        Ok(self.lock().node(element)?.attributes.get(name).cloned())
    }

    async fn set_input_files(&self, element: &FakeElement, files: &[PathBuf]) -> Result<()> {
        let mut state = self.lock();
        state.node(element)?;
        state.uploads.extend(files.iter().cloned());
        Ok(())
    }

    async fn scroll_by(&self, _dx: i64, _dy: i64) -> Result<()> {
        self.lock().scrolls += 1;
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.lock().screenshots.push(path.to_path_buf());
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<StoredCookie>> {
        Ok(self.lock().cookies.clone())
    }

    async fn set_cookies(&self, cookies: &[StoredCookie]) -> Result<()> {
        self.lock().cookies.extend_from_slice(cookies);
        Ok(())
    }
}
