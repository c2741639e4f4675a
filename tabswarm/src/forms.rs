//! Form-filling strategies.
//!
//! All fills are best effort: a control that cannot be read or written is
//! logged and skipped and the rest of the pass continues. A single broken
//! field never aborts a form.

use hashbrown::{HashMap, HashSet};

use crate::automation::{Automation, PageElement};
use crate::commentary;
use crate::utils;

/// Labels accepted by the fallback submit-control scan.
const SUBMIT_LABEL_HINTS: [&str; 4] = ["submit", "save", "next", "continue"];

/// Result of one ballot-form pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallotOutcome {
    /// The first score field already carried a value; the form was left
    /// untouched.
    AlreadyComplete,
    /// Scores were filled and a submit control was clicked.
    Submitted,
    /// Scores were filled but no submit control could be clicked.
    Filled,
}

/// Fill a feedback form and press submit. Returns whether a submit control
/// was clicked.
pub async fn fill_feedback_form<A: Automation>(handle: &A) -> bool {
    log::info!("processing feedback form");
    fill_text_controls(handle).await;
    fill_numeric_controls(handle).await;
    select_random_radios(handle).await;
    click_submit(handle, "feedback").await
}

/// Fill a ballot scoring form, assigning distinct dropdown choices, and
/// press submit. Never rewrites a ballot somebody else already filled.
pub async fn fill_ballot_form<A: Automation>(handle: &A) -> BallotOutcome {
    log::info!("processing ballot");
    if ballot_already_complete(handle).await {
        log::info!("ballot already filled, leaving untouched");
        return BallotOutcome::AlreadyComplete;
    }
    fill_numeric_controls(handle).await;
    assign_distinct_selects(handle).await;
    if click_submit(handle, "ballot").await {
        BallotOutcome::Submitted
    } else {
        BallotOutcome::Filled
    }
}

/// Randomize the settings radios and save. Returns whether a save was
/// clicked.
pub async fn fill_settings_form<A: Automation>(handle: &A) -> bool {
    select_random_radios(handle).await;
    click_submit(handle, "settings").await
}

async fn visible_and_enabled<E: PageElement>(element: &E) -> bool {
    element.is_displayed().await.unwrap_or(false) && element.is_enabled().await.unwrap_or(false)
}

/// Parse a numeric bound attribute: unsigned integers only, anything else
/// falls back to the default.
fn numeric_bound(raw: Option<String>, fallback: i64) -> i64 {
    match raw {
        Some(raw) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => {
            raw.parse().unwrap_or(fallback)
        }
        _ => fallback,
    }
}

/// A ballot is complete when its first score field already carries a value.
async fn ballot_already_complete<A: Automation>(handle: &A) -> bool {
    let controls = handle
        .query("input[type='number']")
        .await
        .unwrap_or_default();
    match controls.first() {
        Some(first) => match first.attr("value").await {
            Ok(Some(value)) => !value.trim().is_empty(),
            _ => false,
        },
        None => false,
    }
}

async fn fill_text_controls<A: Automation>(handle: &A) {
    let controls = match handle.query("textarea, input[type='text']").await {
        Ok(controls) => controls,
        Err(e) => {
            log::warn!("could not enumerate text controls: {e}");
            return;
        }
    };
    for control in controls {
        if !visible_and_enabled(&control).await {
            continue;
        }
        let text = commentary::generate(50, 500);
        if let Err(e) = control.clear().await {
            log::warn!("could not clear text control: {e}");
            continue;
        }
        if let Err(e) = control.type_text(&text).await {
            log::warn!("could not fill text control: {e}");
            continue;
        }
        utils::log("filled text control, chars", text.len().to_string());
    }
}

async fn fill_numeric_controls<A: Automation>(handle: &A) {
    let controls = match handle.query("input[type='number']").await {
        Ok(controls) => controls,
        Err(e) => {
            log::warn!("could not enumerate numeric controls: {e}");
            return;
        }
    };
    for control in controls {
        if !visible_and_enabled(&control).await {
            continue;
        }
        let min = numeric_bound(control.attr("min").await.unwrap_or(None), 1);
        let max = numeric_bound(control.attr("max").await.unwrap_or(None), 100).max(min);
        let value = fastrand::i64(min..=max);
        if let Err(e) = control.clear().await {
            log::warn!("could not clear numeric control: {e}");
            continue;
        }
        if let Err(e) = control.type_text(&value.to_string()).await {
            log::warn!("could not fill numeric control: {e}");
            continue;
        }
        utils::log("filled numeric control", value.to_string());
    }
}

/// Select one random visible, enabled radio per name group.
async fn select_random_radios<A: Automation>(handle: &A) {
    let radios = match handle.query("input[type='radio']").await {
        Ok(radios) => radios,
        Err(e) => {
            log::warn!("could not enumerate radio controls: {e}");
            return;
        }
    };

    let mut groups: HashMap<String, Vec<A::Element>> = HashMap::new();
    for radio in radios {
        match radio.attr("name").await {
            Ok(Some(name)) if !name.is_empty() => groups.entry(name).or_default().push(radio),
            _ => {}
        }
    }

    for (group, members) in groups {
        let mut eligible = Vec::new();
        for member in members {
            if visible_and_enabled(&member).await {
                eligible.push(member);
            }
        }
        if let Some(choice) = utils::pick(&eligible) {
            match choice.click().await {
                Ok(()) => utils::log("selected radio from group", &group),
                Err(e) => log::warn!("could not select radio in group {group}: {e}"),
            }
        }
    }
}

/// Assign distinct option values across the select controls of one form
/// pass, modeling rankings that must not repeat a choice.
async fn assign_distinct_selects<A: Automation>(handle: &A) {
    let selects = match handle.query("select").await {
        Ok(selects) => selects,
        Err(e) => {
            log::warn!("could not enumerate select controls: {e}");
            return;
        }
    };
    utils::log("found select controls", selects.len().to_string());

    let mut used: HashSet<String> = HashSet::new();
    for select in selects {
        if !visible_and_enabled(&select).await {
            continue;
        }
        let options = select.query("option").await.unwrap_or_default();
        let mut eligible = Vec::new();
        for option in options {
            let value = match option.attr("value").await {
                Ok(Some(value)) if !value.is_empty() => value,
                _ => continue,
            };
            if matches!(option.attr("disabled").await, Ok(Some(_))) || used.contains(&value) {
                continue;
            }
            eligible.push((option, value));
        }
        if eligible.is_empty() {
            continue;
        }
        let (option, value) = &eligible[fastrand::usize(0..eligible.len())];
        match option.click().await {
            Ok(()) => {
                used.insert(value.clone());
                utils::log("selected option value", value);
            }
            Err(e) => log::warn!("could not choose select option: {e}"),
        }
    }
}

/// Submit candidates: native submit controls with an exact "submit" label
/// promoted to the front, otherwise any button with a submit-like label.
async fn submit_controls<A: Automation>(handle: &A) -> Vec<A::Element> {
    let mut candidates = Vec::new();

    match handle
        .query("button[type='submit'], input[type='submit']")
        .await
    {
        Ok(controls) => {
            let mut labeled = Vec::with_capacity(controls.len());
            for control in controls {
                let label = control.text().await.unwrap_or_default();
                labeled.push((control, label));
            }
            // stable sort: exact "submit" labels keep their order, up front
            labeled.sort_by_key(|(_, label)| !label.trim().eq_ignore_ascii_case("submit"));
            candidates.extend(labeled.into_iter().map(|(control, _)| control));
        }
        Err(e) => log::warn!("could not enumerate submit controls: {e}"),
    }

    if candidates.is_empty() {
        if let Ok(buttons) = handle.query("button").await {
            for button in buttons {
                let label = button.text().await.unwrap_or_default().to_lowercase();
                if SUBMIT_LABEL_HINTS.iter().any(|hint| label.contains(hint)) {
                    candidates.push(button);
                }
            }
        }
    }

    candidates
}

/// Click the preferred submit control, if any. Returns whether a click
/// landed.
async fn click_submit<A: Automation>(handle: &A, form: &'static str) -> bool {
    let candidates = submit_controls(handle).await;
    match candidates.first() {
        Some(control) => match control.click().await {
            Ok(()) => {
                utils::log("submitted form", form);
                true
            }
            Err(e) => {
                log::warn!("could not click submit control on {form} form: {e}");
                false
            }
        },
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::mock::{MockDriver, MockElement};

    const NUMBERS: &str = "input[type='number']";
    const RADIOS: &str = "input[type='radio']";
    const SUBMITS: &str = "button[type='submit'], input[type='submit']";

    fn driver() -> MockDriver {
        MockDriver::new("http://tab.example/abc1/debate/77aa")
    }

    #[tokio::test]
    async fn prefilled_ballot_is_left_untouched_twice() {
        let driver = driver();
        let score = MockElement::new("")
            .with_attr("value", "71")
            .with_attr("min", "50")
            .with_attr("max", "100");
        driver.install(NUMBERS, vec![score.clone()]);
        driver.install(
            SUBMITS,
            vec![MockElement::new("Submit")],
        );

        assert_eq!(fill_ballot_form(&driver).await, BallotOutcome::AlreadyComplete);
        assert_eq!(fill_ballot_form(&driver).await, BallotOutcome::AlreadyComplete);
        assert_eq!(score.clears(), 0);
        assert!(score.typed().is_empty());
        assert_eq!(score.attr_value("value"), Some("71".to_string()));
    }

    #[tokio::test]
    async fn degenerate_score_range_always_yields_the_bound() {
        let driver = driver();
        let score = MockElement::new("")
            .with_attr("min", "3")
            .with_attr("max", "3");
        driver.install(NUMBERS, vec![score.clone()]);

        assert_eq!(fill_ballot_form(&driver).await, BallotOutcome::Filled);
        assert_eq!(score.typed(), vec!["3".to_string()]);
        assert_eq!(score.attr_value("value"), Some("3".to_string()));
    }

    #[tokio::test]
    async fn non_numeric_bounds_fall_back_to_defaults() {
        let driver = driver();
        let score = MockElement::new("")
            .with_attr("min", "low")
            .with_attr("max", "-5");
        driver.install(NUMBERS, vec![score.clone()]);

        fill_ballot_form(&driver).await;
        let typed = score.typed();
        let value: i64 = typed[0].parse().unwrap();
        assert!((1..=100).contains(&value));
    }

    #[tokio::test]
    async fn one_radio_selected_per_group() {
        let driver = driver();
        let groups: Vec<Vec<MockElement>> = (0..3)
            .map(|g| {
                (0..4)
                    .map(|_| MockElement::new("").with_attr("name", &format!("question-{g}")))
                    .collect()
            })
            .collect();
        driver.install(RADIOS, groups.concat());

        fill_settings_form(&driver).await;

        for members in &groups {
            let clicked: usize = members.iter().map(|radio| radio.clicks()).sum();
            assert_eq!(clicked, 1);
        }
    }

    #[tokio::test]
    async fn hidden_and_disabled_radios_are_never_chosen() {
        let driver = driver();
        let hidden = MockElement::new("").with_attr("name", "q").hidden();
        let disabled = MockElement::new("").with_attr("name", "q").disabled();
        let live = MockElement::new("").with_attr("name", "q");
        driver.install(RADIOS, vec![hidden.clone(), disabled.clone(), live.clone()]);

        fill_settings_form(&driver).await;

        assert_eq!(hidden.clicks(), 0);
        assert_eq!(disabled.clicks(), 0);
        assert_eq!(live.clicks(), 1);
    }

    #[tokio::test]
    async fn select_choices_are_pairwise_distinct() {
        let driver = driver();
        let speakers = ["1a2b", "3c4d", "5e6f"];
        let mut options: Vec<Vec<MockElement>> = Vec::new();
        let mut selects = Vec::new();
        for _ in 0..3 {
            let row: Vec<MockElement> = speakers
                .iter()
                .map(|value| MockElement::new(value).with_attr("value", value))
                .collect();
            selects.push(MockElement::new("").with_children("option", row.clone()));
            options.push(row);
        }
        driver.install("select", selects);

        fill_ballot_form(&driver).await;

        let mut chosen = Vec::new();
        for row in &options {
            let clicked: Vec<&str> = speakers
                .iter()
                .zip(row)
                .filter(|(_, option)| option.clicks() > 0)
                .map(|(value, _)| *value)
                .collect();
            assert_eq!(clicked.len(), 1, "each select chooses exactly one option");
            chosen.push(clicked[0]);
        }
        chosen.sort_unstable();
        chosen.dedup();
        assert_eq!(chosen.len(), 3, "choices must be pairwise distinct");
    }

    #[tokio::test]
    async fn disabled_options_are_ineligible() {
        let driver = driver();
        let poisoned = MockElement::new("N/A")
            .with_attr("value", "aa11")
            .with_attr("disabled", "true");
        let fine = MockElement::new("Speaker").with_attr("value", "bb22");
        let select =
            MockElement::new("").with_children("option", vec![poisoned.clone(), fine.clone()]);
        driver.install("select", vec![select]);

        fill_ballot_form(&driver).await;

        assert_eq!(poisoned.clicks(), 0);
        assert_eq!(fine.clicks(), 1);
    }

    #[tokio::test]
    async fn exact_submit_label_is_promoted() {
        let driver = driver();
        let draft = MockElement::new("Save Draft");
        let submit = MockElement::new(" submit ");
        driver.install(SUBMITS, vec![draft.clone(), submit.clone()]);

        assert!(fill_settings_form(&driver).await);
        assert_eq!(submit.clicks(), 1);
        assert_eq!(draft.clicks(), 0);
    }

    #[tokio::test]
    async fn fallback_scan_matches_label_hints() {
        let driver = driver();
        let cancel = MockElement::new("Cancel");
        let advance = MockElement::new("Continue to next debate");
        driver.install("button", vec![cancel.clone(), advance.clone()]);

        assert!(fill_settings_form(&driver).await);
        assert_eq!(cancel.clicks(), 0);
        assert_eq!(advance.clicks(), 1);
    }

    #[tokio::test]
    async fn no_submit_candidate_reports_false() {
        let driver = driver();
        assert!(!fill_settings_form(&driver).await);
        assert_eq!(fill_ballot_form(&driver).await, BallotOutcome::Filled);
    }

    #[tokio::test]
    async fn a_broken_control_does_not_abort_the_pass() {
        let driver = MockDriver::new(
            "http://tab.example/abc123/feedback/def456/p/adj/debate/0a1b/for/2c3d/from/4e5f",
        );
        let jammed = MockElement::new("").broken();
        let fine = MockElement::new("");
        driver.install("textarea, input[type='text']", vec![jammed.clone(), fine.clone()]);

        fill_feedback_form(&driver).await;

        assert!(jammed.typed().is_empty());
        let typed = fine.typed();
        assert_eq!(typed.len(), 1);
        assert!(!typed[0].is_empty() && typed[0].len() <= 500);
    }

    #[tokio::test]
    async fn feedback_fills_every_visible_text_control() {
        let driver = MockDriver::new(
            "http://tab.example/abc123/feedback/def456/p/adj/debate/0a1b/for/2c3d/from/4e5f",
        );
        let visible = MockElement::new("");
        let invisible = MockElement::new("").hidden();
        driver.install(
            "textarea, input[type='text']",
            vec![visible.clone(), invisible.clone()],
        );
        let submit = MockElement::new("Submit");
        driver.install(SUBMITS, vec![submit.clone()]);

        assert!(fill_feedback_form(&driver).await);
        assert_eq!(visible.clears(), 1);
        assert_eq!(visible.typed().len(), 1);
        assert!(invisible.typed().is_empty());
        assert_eq!(submit.clicks(), 1);
    }
}
