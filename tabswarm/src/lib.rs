#![warn(missing_docs)]

//! Simulated-participant load driver for debate tab servers.
//!
//! `tabswarm` impersonates a tournament's worth of participants against a
//! live tab server: every simulated user logs in through their registration
//! link, reads their home dashboard, submits the ballots they owe as chair,
//! files feedback, and wanders the navigation, all through real browser
//! sessions driven over WebDriver.
//!
//! Sessions vastly outnumber browsers. A small fixed pool of workers, each
//! owning one automation handle for its whole life, pulls suspended
//! sessions (cookies + current URL + user memory) from a shared queue, runs
//! a bounded burst of simulated steps, suspends the session again and
//! requeues it. The queue is the only coordination point, so hundreds of
//! participants interleave over a handful of browsers.
//!
//! # Basic usage
//!
//! Load the participants from the tab database, seed a [`worker::Swarm`]
//! and launch it:
//!
//! ```no_run
//! use tabswarm::configuration::Configuration;
//! use tabswarm::worker::Swarm;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let participants = tabswarm::participants::load_participants("tab.db").await?;
//! let mut swarm = Swarm::new(Configuration::new("http://localhost:3000"));
//! swarm.seed(participants);
//! swarm.launch();
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate lazy_static;
#[macro_use]
pub extern crate string_concat;

pub extern crate fastrand;
pub extern crate hashbrown;
pub extern crate thirtyfour;
pub extern crate tokio;

/// The browser automation capability consumed by the simulator.
pub mod automation;
/// Per-step decision policy for a simulated participant.
pub mod behavior;
/// Synthetic feedback commentary.
pub mod commentary;
/// Configuration structure for a `Swarm`.
pub mod configuration;
/// Form-filling strategies for feedback, ballot and settings pages.
pub mod forms;
/// Page-state classification.
pub mod page;
/// Participant identities from the tab database.
pub mod participants;
/// Per-participant session state and registration secrets.
pub mod session;
/// Application utils.
pub mod utils;
/// The work queue and worker pool circulating sessions.
pub mod worker;
