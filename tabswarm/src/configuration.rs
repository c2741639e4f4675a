use std::time::Duration;

/// The browser engine worker handles are requested as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::EnumString, strum::Display)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Browser {
    /// Google Chrome or Chromium.
    #[default]
    Chrome,
    /// Mozilla Firefox.
    Firefox,
}

/// How the pool schedules its workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::EnumString, strum::Display)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum WorkerMode {
    /// Tokio tasks on the shared runtime.
    #[default]
    Tasks,
    /// Dedicated OS threads, one single-threaded runtime per worker.
    Threads,
}

/// Runtime settings for a participant swarm.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Base URL of the tab server under load.
    pub server_url: String,
    /// The WebDriver endpoint workers lease their browsers from.
    pub webdriver_url: String,
    /// The browser to request from the WebDriver server.
    pub browser: Browser,
    /// Run browsers headless.
    pub headless: bool,
    /// User agent override for the browser sessions.
    pub user_agent: Option<String>,
    /// Number of pooled workers, each owning one automation handle.
    pub workers: usize,
    /// Simulated steps to run per session dequeue.
    pub steps_per_visit: usize,
    /// Upper bound for URL waits after navigation clicks.
    pub wait_timeout: Duration,
    /// Poll interval inside URL waits.
    pub wait_poll: Duration,
    /// Settle pause before each UI interaction.
    pub interaction_pause: Duration,
    /// Worker scheduling mode.
    pub worker_mode: WorkerMode,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            server_url: Default::default(),
            webdriver_url: "http://localhost:4444".to_string(),
            browser: Browser::Chrome,
            headless: true,
            user_agent: None,
            workers: 10,
            steps_per_visit: 10,
            wait_timeout: Duration::from_secs(2),
            wait_poll: Duration::from_millis(200),
            interaction_pause: Duration::from_millis(500),
            worker_mode: WorkerMode::Tasks,
        }
    }
}

impl Configuration {
    /// Setup a configuration against a tab server base URL.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Default::default()
        }
    }

    /// Set the WebDriver endpoint.
    pub fn with_webdriver_url(mut self, webdriver_url: impl Into<String>) -> Self {
        self.webdriver_url = webdriver_url.into();
        self
    }

    /// Set the browser type.
    pub fn with_browser(mut self, browser: Browser) -> Self {
        self.browser = browser;
        self
    }

    /// Set whether browsers run headless.
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the worker pool size.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the number of simulated steps per session dequeue.
    pub fn with_steps_per_visit(mut self, steps_per_visit: usize) -> Self {
        self.steps_per_visit = steps_per_visit;
        self
    }

    /// Set the upper bound for URL waits.
    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    /// Set the poll interval inside URL waits.
    pub fn with_wait_poll(mut self, wait_poll: Duration) -> Self {
        self.wait_poll = wait_poll;
        self
    }

    /// Set the settle pause before UI interactions.
    pub fn with_interaction_pause(mut self, interaction_pause: Duration) -> Self {
        self.interaction_pause = interaction_pause;
        self
    }

    /// Set the worker scheduling mode.
    pub fn with_worker_mode(mut self, worker_mode: WorkerMode) -> Self {
        self.worker_mode = worker_mode;
        self
    }
}
