//! Scenario state for facade lookup behavioural tests.

use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

/// What the last facade call produced.
#[derive(Debug, Clone)]
pub(crate) enum LookupResult {
    /// A name lookup returned this ID, or nothing.
    Id(Option<String>),
    /// An image presence or usage check returned this flag.
    Flag(bool),
    /// The call failed; `not_found` records the error classification.
    Failed { not_found: bool, message: String },
    /// The call succeeded without a value.
    Done,
}

#[derive(Default, ScenarioState)]
pub(crate) struct LookupState {
    pub(crate) container_names: Slot<Vec<String>>,
    pub(crate) network_names: Slot<Vec<String>>,
    pub(crate) image_tags: Slot<Vec<String>>,
    pub(crate) image_digests: Slot<Vec<String>>,
    pub(crate) sent_grace_period: Slot<i32>,
    pub(crate) result: Slot<LookupResult>,
}

#[fixture]
pub(crate) fn lookup_state() -> LookupState {
    let state = LookupState::default();
    state.container_names.set(Vec::new());
    state.network_names.set(Vec::new());
    state.image_tags.set(Vec::new());
    state.image_digests.set(Vec::new());
    state
}

/// Split a comma-separated step argument into trimmed, non-empty items.
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
