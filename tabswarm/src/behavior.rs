//! The per-step participant policy.
//!
//! Each step performs exactly one transition: classify the current page,
//! take the single highest-priority action available, wait for the expected
//! navigation. Priority on the home page is fixed (overdue feedback, then
//! owed ballots, then fresh feedback, then free navigation) and must not
//! be reordered.

use crate::automation::{wait_until_url_matches, Automation, AutomationResult, PageElement};
use crate::configuration::Configuration;
use crate::forms;
use crate::page::{self, analyze_homepage, PageKind, Role};
use crate::session::UserMemory;
use crate::utils;

/// Run one simulated participant step against the handle's current page.
///
/// Errors are step-local: the caller logs them and moves on, the session
/// continues from wherever the browser ended up.
pub async fn run_step<A: Automation>(
    memory: &mut UserMemory,
    handle: &A,
    configuration: &Configuration,
) -> AutomationResult<()> {
    let url = handle.current_url().await?;
    match page::classify_url(&url) {
        PageKind::Login => login(handle, configuration).await,
        PageKind::Home => home(memory, handle, configuration).await,
        kind => {
            utils::log("re-entering through registration link from", kind.to_string());
            handle.goto(&memory.registration_url).await?;
            wait_until_url_matches(
                handle,
                &page::ENTRY_URL,
                "home or login page",
                configuration.wait_timeout,
                configuration.wait_poll,
            )
            .await?;
            Ok(())
        }
    }
}

/// Confirm the login prompt and wait for the home page.
async fn login<A: Automation>(handle: &A, configuration: &Configuration) -> AutomationResult<()> {
    let buttons = handle.query("#link-login").await?;
    if let Some(button) = buttons.first() {
        button.click().await?;
    }
    wait_until_url_matches(
        handle,
        &page::HOME_URL,
        "home page",
        configuration.wait_timeout,
        configuration.wait_poll,
    )
    .await?;
    Ok(())
}

async fn home<A: Automation>(
    memory: &mut UserMemory,
    handle: &A,
    configuration: &Configuration,
) -> AutomationResult<()> {
    let state = analyze_homepage(handle).await;

    // overdue feedback always goes first
    if let Some(link) = utils::pick(&state.overdue_feedback_links) {
        link.click().await?;
        wait_until_url_matches(
            handle,
            &page::FEEDBACK_URL,
            "feedback form",
            configuration.wait_timeout,
            configuration.wait_poll,
        )
        .await?;
        forms::fill_feedback_form(handle).await;
        return Ok(());
    }

    // then ballots this user still owes as chair
    let mut pending_ballots = Vec::new();
    for round in &state.rounds {
        if round.role != Role::Chair {
            continue;
        }
        if let Some(link) = &round.ballot_link {
            if let Ok(Some(href)) = link.attr("href").await {
                if let Some(id) = page::ballot_id(&href) {
                    if !memory.submitted_ballots.contains(&id) {
                        pending_ballots.push(link);
                    }
                }
            }
        }
    }
    if let Some(link) = utils::pick(&pending_ballots) {
        link.click().await?;
        wait_until_url_matches(
            handle,
            &page::BALLOT_URL,
            "ballot form",
            configuration.wait_timeout,
            configuration.wait_poll,
        )
        .await?;
        let outcome = forms::fill_ballot_form(handle).await;
        utils::log("ballot handler outcome", format!("{:?}", outcome));
        match page::ballot_id(&handle.current_url().await?) {
            Some(id) => {
                memory.submitted_ballots.insert(id);
            }
            None => log::debug!("ballot page url held no ballot id"),
        }
        return Ok(());
    }

    // then feedback for a randomly drawn round; the draw spans every round,
    // so it can land on one without feedback links and end the step idle
    if state.rounds.iter().any(|round| !round.feedback_links.is_empty()) {
        if let Some(round) = utils::pick(&state.rounds) {
            if let Some(link) = utils::pick(&round.feedback_links) {
                link.click().await?;
                wait_until_url_matches(
                    handle,
                    &page::FEEDBACK_URL,
                    "feedback form",
                    configuration.wait_timeout,
                    configuration.wait_poll,
                )
                .await?;
                forms::fill_feedback_form(handle).await;
            }
        }
        return Ok(());
    }

    // nothing actionable: wander the navigation bar
    browse_navigation(handle).await
}

/// Click a random link inside the primary navigation element, handling the
/// settings page when the click lands there.
async fn browse_navigation<A: Automation>(handle: &A) -> AutomationResult<()> {
    let navs = handle.query("nav").await?;
    if let Some(nav) = navs.first() {
        let links = nav.query("a").await.unwrap_or_default();
        if let Some(link) = utils::pick(&links) {
            if let Ok(Some(href)) = link.attr("href").await {
                utils::log("randomly visiting link", &href);
            }
            link.click().await?;
            let url = handle.current_url().await?;
            if page::SETTINGS_URL.is_match(&url) {
                forms::fill_settings_form(handle).await;
            }
        }
    }
    Ok(())
}
