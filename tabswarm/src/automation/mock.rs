//! In-memory automation double for handler and pool tests.
//!
//! A [`MockDriver`] serves scripted elements keyed by the exact selector
//! string the code under test queries with. Elements record every
//! interaction and can redirect the driver's URL on click, which is enough
//! to drive the policy's navigate-and-wait sequences without a browser.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hashbrown::HashMap;

use super::{Automation, AutomationError, AutomationResult, Cookie, PageElement};

/// Shared URL cell; navigation clicks write the destination into it.
pub(crate) type UrlCell = Arc<Mutex<String>>;

struct MockElementInner {
    text: String,
    attrs: Mutex<HashMap<String, String>>,
    displayed: AtomicBool,
    enabled: AtomicBool,
    broken: AtomicBool,
    clicks: AtomicUsize,
    clears: AtomicUsize,
    typed: Mutex<Vec<String>>,
    children: Mutex<HashMap<String, Vec<MockElement>>>,
    navigate: Mutex<Option<(UrlCell, String)>>,
}

/// A scripted element inside a [`MockDriver`] page.
#[derive(Clone)]
pub(crate) struct MockElement {
    inner: Arc<MockElementInner>,
}

impl MockElement {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            inner: Arc::new(MockElementInner {
                text: text.to_string(),
                attrs: Mutex::new(HashMap::new()),
                displayed: AtomicBool::new(true),
                enabled: AtomicBool::new(true),
                broken: AtomicBool::new(false),
                clicks: AtomicUsize::new(0),
                clears: AtomicUsize::new(0),
                typed: Mutex::new(Vec::new()),
                children: Mutex::new(HashMap::new()),
                navigate: Mutex::new(None),
            }),
        }
    }

    pub(crate) fn with_attr(self, name: &str, value: &str) -> Self {
        self.inner
            .attrs
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        self
    }

    pub(crate) fn with_children(self, selector: &str, children: Vec<MockElement>) -> Self {
        self.inner
            .children
            .lock()
            .unwrap()
            .insert(selector.to_string(), children);
        self
    }

    /// Clicking this element rewrites the driver URL to `destination`.
    pub(crate) fn navigates(self, url: &UrlCell, destination: &str) -> Self {
        *self.inner.navigate.lock().unwrap() = Some((url.clone(), destination.to_string()));
        self
    }

    pub(crate) fn hidden(self) -> Self {
        self.inner.displayed.store(false, Ordering::SeqCst);
        self
    }

    pub(crate) fn disabled(self) -> Self {
        self.inner.enabled.store(false, Ordering::SeqCst);
        self
    }

    /// Every interaction with this element fails.
    pub(crate) fn broken(self) -> Self {
        self.inner.broken.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn clicks(&self) -> usize {
        self.inner.clicks.load(Ordering::SeqCst)
    }

    pub(crate) fn clears(&self) -> usize {
        self.inner.clears.load(Ordering::SeqCst)
    }

    pub(crate) fn typed(&self) -> Vec<String> {
        self.inner.typed.lock().unwrap().clone()
    }

    pub(crate) fn attr_value(&self, name: &str) -> Option<String> {
        self.inner.attrs.lock().unwrap().get(name).cloned()
    }

    fn refuse_if_broken(&self) -> AutomationResult<()> {
        if self.inner.broken.load(Ordering::SeqCst) {
            Err(AutomationError::Scripted("element refused the interaction"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PageElement for MockElement {
    async fn text(&self) -> AutomationResult<String> {
        Ok(self.inner.text.clone())
    }

    async fn attr(&self, name: &str) -> AutomationResult<Option<String>> {
        Ok(self.inner.attrs.lock().unwrap().get(name).cloned())
    }

    async fn is_displayed(&self) -> AutomationResult<bool> {
        Ok(self.inner.displayed.load(Ordering::SeqCst))
    }

    async fn is_enabled(&self) -> AutomationResult<bool> {
        Ok(self.inner.enabled.load(Ordering::SeqCst))
    }

    async fn click(&self) -> AutomationResult<()> {
        self.refuse_if_broken()?;
        self.inner.clicks.fetch_add(1, Ordering::SeqCst);
        let navigate = self.inner.navigate.lock().unwrap().clone();
        if let Some((url, destination)) = navigate {
            *url.lock().unwrap() = destination;
        }
        Ok(())
    }

    async fn clear(&self) -> AutomationResult<()> {
        self.refuse_if_broken()?;
        self.inner.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.attrs.lock().unwrap().remove("value");
        Ok(())
    }

    async fn type_text(&self, text: &str) -> AutomationResult<()> {
        self.refuse_if_broken()?;
        self.inner.typed.lock().unwrap().push(text.to_string());
        self.inner
            .attrs
            .lock()
            .unwrap()
            .entry("value".to_string())
            .or_default()
            .push_str(text);
        Ok(())
    }

    async fn query(&self, selector: &str) -> AutomationResult<Vec<Self>> {
        Ok(self
            .inner
            .children
            .lock()
            .unwrap()
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }
}

/// A scripted automation handle.
pub(crate) struct MockDriver {
    url: UrlCell,
    dom: Mutex<HashMap<String, Vec<MockElement>>>,
    cookies: Mutex<Vec<Cookie>>,
    visited: Mutex<Vec<String>>,
}

impl MockDriver {
    pub(crate) fn new(url: &str) -> Self {
        Self {
            url: Arc::new(Mutex::new(url.to_string())),
            dom: Mutex::new(HashMap::new()),
            cookies: Mutex::new(Vec::new()),
            visited: Mutex::new(Vec::new()),
        }
    }

    /// The cell navigation clicks write into.
    pub(crate) fn url_cell(&self) -> UrlCell {
        self.url.clone()
    }

    /// Serve `elements` for the exact selector string.
    pub(crate) fn install(&self, selector: &str, elements: Vec<MockElement>) {
        self.dom
            .lock()
            .unwrap()
            .insert(selector.to_string(), elements);
    }

    /// URLs passed to `goto`, in order.
    pub(crate) fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

#[async_trait]
impl Automation for MockDriver {
    type Element = MockElement;

    async fn goto(&self, url: &str) -> AutomationResult<()> {
        self.visited.lock().unwrap().push(url.to_string());
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> AutomationResult<String> {
        Ok(self.url.lock().unwrap().clone())
    }

    async fn query(&self, selector: &str) -> AutomationResult<Vec<Self::Element>> {
        Ok(self
            .dom
            .lock()
            .unwrap()
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn cookies(&self) -> AutomationResult<Vec<Cookie>> {
        Ok(self.cookies.lock().unwrap().clone())
    }

    async fn add_cookie(&self, cookie: Cookie) -> AutomationResult<()> {
        self.cookies.lock().unwrap().push(cookie);
        Ok(())
    }

    async fn quit(self) -> AutomationResult<()> {
        Ok(())
    }
}
