//! Page-state classification.
//!
//! A step starts by mapping the handle's URL onto a [`PageKind`] through an
//! ordered first-match-wins rule table; home pages are additionally scraped
//! into a [`HomePageState`] describing what the participant can act on.
//! Classification never fails: URLs the rules do not cover are
//! [`PageKind::Unknown`], and scraping degrades to empty collections.

use regex::Regex;

use crate::automation::{Automation, PageElement};

lazy_static! {
    /// Registration links and the login confirmation page.
    pub static ref LOGIN_URL: Regex =
        Regex::new(r"^.*/register/.*").expect("login url pattern");
    /// Per-tournament participant home pages.
    pub static ref HOME_URL: Regex =
        Regex::new(r"^.*/tournament/[a-z0-9-]+/home/[a-z0-9-]+").expect("home url pattern");
    /// Feedback submission forms.
    pub static ref FEEDBACK_URL: Regex = Regex::new(
        r"^.*/[a-f0-9-]+/feedback/[a-f0-9-]+/\w+/\w+/debate/[a-f0-9-]+/for/[a-f0-9-]+/from/[a-f0-9-]+"
    )
    .expect("feedback url pattern");
    /// Ballot scoring forms; group 1 captures the ballot id.
    pub static ref BALLOT_URL: Regex =
        Regex::new(r"^.*/[a-f0-9-]+/debate/([a-f0-9-]+)").expect("ballot url pattern");
    /// The settings sub-page of a home page.
    pub static ref SETTINGS_URL: Regex =
        Regex::new(r"^.*/tournament/[a-f0-9-]+/home/[a-f0-9-]+/settings")
            .expect("settings url pattern");
    /// Either page a registration link may land on.
    pub static ref ENTRY_URL: Regex =
        Regex::new(&format!("{}|{}", HOME_URL.as_str(), LOGIN_URL.as_str()))
            .expect("entry url pattern");

    static ref BALLOT_LINK: Regex =
        Regex::new(r"(?i)^submit\s+ballot").expect("ballot link pattern");
    static ref FEEDBACK_LINK: Regex =
        Regex::new(r"(?i)^submit\s+feedback").expect("feedback link pattern");

    /// Ordered classification rules, evaluated top-down.
    static ref PAGE_RULES: [(&'static Regex, PageKind); 5] = [
        (&*LOGIN_URL, PageKind::Login),
        (&*HOME_URL, PageKind::Home),
        (&*FEEDBACK_URL, PageKind::Feedback),
        (&*BALLOT_URL, PageKind::Ballot),
        (&*SETTINGS_URL, PageKind::Settings),
    ];
}

/// The symbolic kind of the currently loaded page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum PageKind {
    /// Registration/login confirmation page.
    Login,
    /// Participant home dashboard.
    Home,
    /// A feedback submission form.
    Feedback,
    /// A ballot scoring form.
    Ballot,
    /// The settings sub-page.
    Settings,
    /// Anything the rules do not cover.
    Unknown,
}

/// Classify a URL through the ordered rule table. First match wins.
pub fn classify_url(url: &str) -> PageKind {
    for (pattern, kind) in PAGE_RULES.iter() {
        if pattern.is_match(url) {
            return *kind;
        }
    }
    PageKind::Unknown
}

/// Extract the ballot id from a ballot page URL or link href.
pub fn ballot_id(url: &str) -> Option<String> {
    BALLOT_URL
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
}

/// The participant's role in a round as announced on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Role {
    /// Chairing the judging panel; owes a ballot.
    Chair,
    /// Wing judge on the panel.
    Wing,
    /// Speaking on the government or opposition bench.
    Team,
    /// Non-aligned speaker.
    NonAligned,
    /// The announcement matched no known phrase.
    #[default]
    Unknown,
}

impl Role {
    /// Parse the role from lowercased round announcement text.
    pub fn from_round_text(text: &str) -> Self {
        if text.contains("you are chair") {
            Role::Chair
        } else if text.contains("you are wing") {
            Role::Wing
        } else if text.contains("you are government") || text.contains("you are opposition") {
            Role::Team
        } else if text.contains("you are non-aligned") {
            Role::NonAligned
        } else {
            Role::Unknown
        }
    }
}

/// Links and role parsed from one round container.
pub struct HomeRoundInfo<E> {
    /// The announced role.
    pub role: Role,
    /// Ballot submission link, when the round offers one.
    pub ballot_link: Option<E>,
    /// Feedback submission links, possibly empty.
    pub feedback_links: Vec<E>,
}

/// Actionable structure scraped from the home page.
pub struct HomePageState<E> {
    /// Links inside the overdue-feedback box.
    pub overdue_feedback_links: Vec<E>,
    /// One entry per active round container.
    pub rounds: Vec<HomeRoundInfo<E>>,
}

/// Scrape the home page into its actionable parts.
///
/// Absent containers yield empty collections and scraping failures degrade
/// to empty results; this never errors.
pub async fn analyze_homepage<A: Automation>(handle: &A) -> HomePageState<A::Element> {
    let mut overdue_feedback_links = Vec::new();
    if let Ok(boxes) = handle.query("div.box").await {
        for container in boxes {
            let text = container.text().await.unwrap_or_default();
            if !text.contains("Overdue Feedback") {
                continue;
            }
            overdue_feedback_links = container.query("a").await.unwrap_or_default();
            break;
        }
    }

    let mut rounds = Vec::new();
    if let Ok(containers) = handle.query("div.round-box").await {
        for container in containers {
            let text = container.text().await.unwrap_or_default();
            if !text.contains("Round") {
                continue;
            }
            let role = Role::from_round_text(&text.to_lowercase());

            let mut ballot_link = None;
            let mut feedback_links = Vec::new();
            for link in container.query("a").await.unwrap_or_default() {
                let label = link.text().await.unwrap_or_default();
                if BALLOT_LINK.is_match(&label) {
                    ballot_link = Some(link);
                } else if FEEDBACK_LINK.is_match(&label) {
                    feedback_links.push(link);
                }
            }

            rounds.push(HomeRoundInfo {
                role,
                ballot_link,
                feedback_links,
            });
        }
    }

    HomePageState {
        overdue_feedback_links,
        rounds,
    }
}
