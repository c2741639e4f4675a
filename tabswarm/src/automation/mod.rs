//! The browser automation capability.
//!
//! Everything the simulator does to a page goes through the [`Automation`]
//! and [`PageElement`] traits; the production implementation drives a
//! `thirtyfour` WebDriver session, tests substitute the in-memory double in
//! [`mock`]. Each handle is owned by exactly one worker and is not safe to
//! share across workers.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use thirtyfour::common::capabilities::desiredcapabilities::Capabilities;
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;

use crate::configuration::{Browser, Configuration};

#[cfg(test)]
pub(crate) mod mock;

pub use thirtyfour::Cookie;

/// Errors surfaced by automation operations.
#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    /// A bounded wait elapsed before the URL matched the expected pattern.
    #[error("timed out waiting for {0}")]
    WaitTimeout(&'static str),
    /// The underlying WebDriver call failed.
    #[error(transparent)]
    WebDriver(#[from] WebDriverError),
    /// A scripted failure from a test double.
    #[error("{0}")]
    Scripted(&'static str),
}

/// Result alias for automation operations.
pub type AutomationResult<T> = Result<T, AutomationError>;

/// A handle onto one element of the currently loaded page.
#[async_trait]
pub trait PageElement: Clone + Send + Sync {
    /// Visible text of the element.
    async fn text(&self) -> AutomationResult<String>;
    /// Read an attribute value.
    async fn attr(&self, name: &str) -> AutomationResult<Option<String>>;
    /// Whether the element is rendered.
    async fn is_displayed(&self) -> AutomationResult<bool>;
    /// Whether the element accepts interaction.
    async fn is_enabled(&self) -> AutomationResult<bool>;
    /// Click the element.
    async fn click(&self) -> AutomationResult<()>;
    /// Clear the element's current value.
    async fn clear(&self) -> AutomationResult<()>;
    /// Type text into the element.
    async fn type_text(&self, text: &str) -> AutomationResult<()>;
    /// Find descendant elements by CSS selector.
    async fn query(&self, selector: &str) -> AutomationResult<Vec<Self>>;
}

/// One browser automation handle, owned by a single worker for its life.
#[async_trait]
pub trait Automation: Send + Sync {
    /// The element handle type produced by queries.
    type Element: PageElement;

    /// Navigate to a URL.
    async fn goto(&self, url: &str) -> AutomationResult<()>;
    /// The URL currently loaded.
    async fn current_url(&self) -> AutomationResult<String>;
    /// Find elements by CSS selector.
    async fn query(&self, selector: &str) -> AutomationResult<Vec<Self::Element>>;
    /// Snapshot the cookies of the current session.
    async fn cookies(&self) -> AutomationResult<Vec<Cookie>>;
    /// Restore one cookie into the session.
    async fn add_cookie(&self, cookie: Cookie) -> AutomationResult<()>;
    /// Release the handle and close the browser session.
    async fn quit(self) -> AutomationResult<()>;
}

/// Block until the handle's URL matches `pattern`, polling within the
/// configured wait budget. Returns the matching URL, or
/// [`AutomationError::WaitTimeout`] once the budget is spent.
pub async fn wait_until_url_matches<A: Automation>(
    handle: &A,
    pattern: &Regex,
    expected: &'static str,
    timeout: Duration,
    poll: Duration,
) -> AutomationResult<String> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let url = handle.current_url().await?;
        if pattern.is_match(&url) {
            return Ok(url);
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(AutomationError::WaitTimeout(expected));
        }
        tokio::time::sleep(poll).await;
    }
}

/// A `thirtyfour`-backed automation handle with interaction pacing.
pub struct WebDriverHandle {
    driver: WebDriver,
    pause: Duration,
}

impl WebDriverHandle {
    /// Wrap a connected WebDriver session.
    pub fn new(driver: WebDriver, pause: Duration) -> Self {
        Self { driver, pause }
    }

    /// Access the underlying thirtyfour session.
    pub fn driver(&self) -> &WebDriver {
        &self.driver
    }
}

/// An element handle scoped to a [`WebDriverHandle`].
#[derive(Clone)]
pub struct WebDriverElement {
    element: WebElement,
    pause: Duration,
}

#[async_trait]
impl PageElement for WebDriverElement {
    async fn text(&self) -> AutomationResult<String> {
        Ok(self.element.text().await?)
    }

    async fn attr(&self, name: &str) -> AutomationResult<Option<String>> {
        Ok(self.element.attr(name).await?)
    }

    async fn is_displayed(&self) -> AutomationResult<bool> {
        Ok(self.element.is_displayed().await?)
    }

    async fn is_enabled(&self) -> AutomationResult<bool> {
        Ok(self.element.is_enabled().await?)
    }

    async fn click(&self) -> AutomationResult<()> {
        // settle scroll and animation before the click lands
        if let Err(e) = self.element.scroll_into_view().await {
            log::debug!("scroll into view failed: {e}");
        }
        tokio::time::sleep(self.pause).await;
        Ok(self.element.click().await?)
    }

    async fn clear(&self) -> AutomationResult<()> {
        Ok(self.element.clear().await?)
    }

    async fn type_text(&self, text: &str) -> AutomationResult<()> {
        Ok(self.element.send_keys(text).await?)
    }

    async fn query(&self, selector: &str) -> AutomationResult<Vec<Self>> {
        let found = self.element.find_all(By::Css(selector)).await?;
        let pause = self.pause;
        Ok(found
            .into_iter()
            .map(|element| Self { element, pause })
            .collect())
    }
}

#[async_trait]
impl Automation for WebDriverHandle {
    type Element = WebDriverElement;

    async fn goto(&self, url: &str) -> AutomationResult<()> {
        Ok(self.driver.goto(url).await?)
    }

    async fn current_url(&self) -> AutomationResult<String> {
        Ok(self.driver.current_url().await?.to_string())
    }

    async fn query(&self, selector: &str) -> AutomationResult<Vec<Self::Element>> {
        let found = self.driver.find_all(By::Css(selector)).await?;
        let pause = self.pause;
        Ok(found
            .into_iter()
            .map(|element| WebDriverElement { element, pause })
            .collect())
    }

    async fn cookies(&self) -> AutomationResult<Vec<Cookie>> {
        Ok(self.driver.get_all_cookies().await?)
    }

    async fn add_cookie(&self, cookie: Cookie) -> AutomationResult<()> {
        Ok(self.driver.add_cookie(cookie).await?)
    }

    async fn quit(self) -> AutomationResult<()> {
        Ok(self.driver.quit().await?)
    }
}

/// Connect a new WebDriver session for a worker, retrying while the
/// WebDriver server comes up. Handle creation is expensive; workers call
/// this once and keep the handle for their entire life.
pub async fn launch_handle(configuration: &Configuration) -> Option<WebDriverHandle> {
    let caps = build_capabilities(configuration)?;

    let mut attempts = 0;
    let max_retries = 10;
    let mut driver: Option<WebDriver> = None;

    while attempts <= max_retries {
        match WebDriver::new(&configuration.webdriver_url, caps.clone()).await {
            Ok(d) => {
                driver = Some(d);
                break;
            }
            Err(err) => {
                log::error!("WebDriver connection error: {:?}", err);
                attempts += 1;
                if attempts > max_retries {
                    log::error!("exceeded maximum retry attempts for WebDriver connection");
                    break;
                }
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }

    Some(WebDriverHandle::new(
        driver?,
        configuration.interaction_pause,
    ))
}

/// Build browser capabilities for the configured browser.
fn build_capabilities(configuration: &Configuration) -> Option<Capabilities> {
    match configuration.browser {
        Browser::Chrome => {
            let mut caps = DesiredCapabilities::chrome();
            let mut args: Vec<String> = Vec::new();

            if configuration.headless {
                args.push("--headless=new".to_string());
            }
            if let Some(ref ua) = configuration.user_agent {
                args.push(format!("--user-agent={}", ua));
            }

            for arg in args {
                if let Err(e) = caps.add_arg(&arg) {
                    log::warn!("failed to add Chrome arg '{}': {:?}", arg, e);
                }
            }
            Some(caps.into())
        }
        Browser::Firefox => {
            let mut caps = DesiredCapabilities::firefox();
            let mut args: Vec<String> = Vec::new();

            if configuration.headless {
                args.push("-headless".to_string());
            }

            for arg in args {
                if let Err(e) = caps.add_arg(&arg) {
                    log::warn!("failed to add Firefox arg '{}': {:?}", arg, e);
                }
            }
            Some(caps.into())
        }
    }
}
