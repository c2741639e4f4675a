use clap::Subcommand;
use tabswarm::configuration::Browser;

#[derive(Subcommand)]
pub enum Commands {
    /// drive the full participant fleet from the tab database.
    RUN {
        /// The base URL of the tab server under load.
        server_url: String,
        /// Path to the sqlite tab database holding the participants.
        database: String,
        /// The tournament this run is labelled with.
        tournament: String,
        /// Use dedicated OS threads for workers instead of tasks.
        #[clap(long)]
        threads: bool,
        /// Number of pooled workers, each owning one browser.
        #[clap(short, long, default_value_t = 10)]
        workers: usize,
        /// Simulated steps per session dequeue.
        #[clap(short, long, default_value_t = 10)]
        steps: usize,
        /// The WebDriver endpoint to lease browsers from.
        #[clap(long, default_value = "http://localhost:4444")]
        webdriver_url: String,
        /// Browser to request from the WebDriver server.
        #[clap(short, long, default_value_t = Browser::Chrome)]
        browser: Browser,
        /// Show browser windows instead of running headless.
        #[clap(long)]
        headed: bool,
        /// User-Agent
        #[clap(short, long)]
        agent: Option<String>,
    },
    /// drive a single registration link for debugging.
    SOLO {
        /// The registration URL of one participant.
        register_url: String,
        /// Steps to simulate before quitting.
        #[clap(short, long, default_value_t = 100)]
        steps: usize,
        /// The WebDriver endpoint to lease the browser from.
        #[clap(long, default_value = "http://localhost:4444")]
        webdriver_url: String,
        /// Browser to request from the WebDriver server.
        #[clap(short, long, default_value_t = Browser::Chrome)]
        browser: Browser,
        /// Show the browser window instead of running headless.
        #[clap(long)]
        headed: bool,
    },
}
