//! Given/when steps for facade lookup scenarios.

use std::future::Future;

use dockhand::error::DockhandError;
use rstest_bdd_macros::{given, when};

use super::StepResult;
use super::engine::scripted_facade;
use super::state::{LookupResult, LookupState, split_list};

/// Run `operation` on a fresh runtime and record its outcome in state.
fn record<T, Fut>(
    lookup_state: &LookupState,
    operation: Fut,
    into_result: impl FnOnce(T) -> LookupResult,
) -> StepResult<()>
where
    Fut: Future<Output = Result<T, DockhandError>>,
{
    let runtime =
        tokio::runtime::Runtime::new().map_err(|e| format!("failed to create runtime: {e}"))?;
    let result = match runtime.block_on(operation) {
        Ok(value) => into_result(value),
        Err(error) => LookupResult::Failed {
            not_found: error.is_not_found(),
            message: error.to_string(),
        },
    };
    lookup_state.result.set(result);
    Ok(())
}

#[given("the engine lists containers named {names}")]
fn given_containers(lookup_state: &LookupState, names: String) {
    lookup_state.container_names.set(split_list(&names));
}

#[given("the engine lists no containers")]
fn given_no_containers(lookup_state: &LookupState) {
    lookup_state.container_names.set(Vec::new());
}

#[given("the engine lists networks named {names}")]
fn given_networks(lookup_state: &LookupState, names: String) {
    lookup_state.network_names.set(split_list(&names));
}

#[given("the engine lists images tagged {tags}")]
fn given_image_tags(lookup_state: &LookupState, tags: String) {
    lookup_state.image_tags.set(split_list(&tags));
}

#[given("the engine lists images with digests {digests}")]
fn given_image_digests(lookup_state: &LookupState, digests: String) {
    lookup_state.image_digests.set(split_list(&digests));
}

#[given("the engine lists no images")]
fn given_no_images(lookup_state: &LookupState) {
    lookup_state.image_tags.set(Vec::new());
    lookup_state.image_digests.set(Vec::new());
}

#[when("a container is looked up by name {name}")]
fn when_container_looked_up(lookup_state: &LookupState, name: String) -> StepResult<()> {
    let (facade, _) = scripted_facade(lookup_state);
    record(lookup_state, facade.find_container(&name), LookupResult::Id)
}

#[when("a network is looked up by name {name}")]
fn when_network_looked_up(lookup_state: &LookupState, name: String) -> StepResult<()> {
    let (facade, _) = scripted_facade(lookup_state);
    record(
        lookup_state,
        facade.ensure_network_exists(&name),
        LookupResult::Id,
    )
}

#[when("image {reference} is checked")]
fn when_image_checked(lookup_state: &LookupState, reference: String) -> StepResult<()> {
    let (facade, _) = scripted_facade(lookup_state);
    record(
        lookup_state,
        facade.ensure_image_exists(&reference),
        |presence| LookupResult::Flag(presence.is_found()),
    )
}

#[when("image {image_id} is checked for use")]
fn when_image_checked_for_use(lookup_state: &LookupState, image_id: String) -> StepResult<()> {
    let (facade, _) = scripted_facade(lookup_state);
    record(
        lookup_state,
        facade.is_image_used(&image_id),
        LookupResult::Flag,
    )
}

#[when("the status of container {id} is requested")]
fn when_status_requested(lookup_state: &LookupState, id: String) -> StepResult<()> {
    let (facade, _) = scripted_facade(lookup_state);
    record(lookup_state, facade.container_status(&id), |summary| {
        LookupResult::Id(summary.id)
    })
}

#[when("container {id} is stopped with grace period {seconds}")]
fn when_container_stopped(lookup_state: &LookupState, id: String, seconds: i32) -> StepResult<()> {
    let (facade, recorder) = scripted_facade(lookup_state);
    record(lookup_state, facade.stop_container(&id, seconds), |()| {
        LookupResult::Done
    })?;

    let sent = recorder
        .lock()
        .map_err(|_| String::from("grace recorder poisoned"))?
        .ok_or_else(|| String::from("stop request carried no grace period"))?;
    lookup_state.sent_grace_period.set(sent);
    Ok(())
}
