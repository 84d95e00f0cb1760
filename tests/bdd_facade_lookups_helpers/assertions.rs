//! Assertion helpers for facade lookup behavioural tests.

use rstest_bdd_macros::then;

use super::StepResult;
use super::state::{LookupResult, LookupState};

fn result(lookup_state: &LookupState) -> StepResult<LookupResult> {
    lookup_state
        .result
        .get()
        .ok_or_else(|| String::from("result should be set"))
}

fn expect_flag(lookup_state: &LookupState, expected: bool) -> StepResult<()> {
    match result(lookup_state)? {
        LookupResult::Flag(flag) if flag == expected => Ok(()),
        other => Err(format!("expected flag {expected}, got {other:?}")),
    }
}

#[then("the lookup returns id {expected}")]
fn lookup_returns(lookup_state: &LookupState, expected: String) -> StepResult<()> {
    match result(lookup_state)? {
        LookupResult::Id(Some(id)) if id == expected => Ok(()),
        other => Err(format!("expected id {expected}, got {other:?}")),
    }
}

#[then("the lookup returns nothing")]
fn lookup_returns_nothing(lookup_state: &LookupState) -> StepResult<()> {
    match result(lookup_state)? {
        LookupResult::Id(None) => Ok(()),
        other => Err(format!("expected no match, got {other:?}")),
    }
}

#[then("the lookup fails as not found")]
fn lookup_fails_not_found(lookup_state: &LookupState) -> StepResult<()> {
    match result(lookup_state)? {
        LookupResult::Failed {
            not_found: true, ..
        } => Ok(()),
        LookupResult::Failed { message, .. } => {
            Err(format!("expected a not-found error, got: {message}"))
        }
        other => Err(format!("expected failure, got {other:?}")),
    }
}

#[then("the image is reported present")]
fn image_present(lookup_state: &LookupState) -> StepResult<()> {
    expect_flag(lookup_state, true)
}

#[then("the image is reported absent")]
fn image_absent(lookup_state: &LookupState) -> StepResult<()> {
    expect_flag(lookup_state, false)
}

#[then("the image is reported in use")]
fn image_in_use(lookup_state: &LookupState) -> StepResult<()> {
    expect_flag(lookup_state, true)
}

#[then("the image is reported unused")]
fn image_unused(lookup_state: &LookupState) -> StepResult<()> {
    expect_flag(lookup_state, false)
}

#[then("the engine received grace period {expected}")]
fn engine_received_grace(lookup_state: &LookupState, expected: i32) -> StepResult<()> {
    let sent = lookup_state
        .sent_grace_period
        .get()
        .ok_or_else(|| String::from("no grace period recorded"))?;
    if sent == expected {
        Ok(())
    } else {
        Err(format!("expected grace period {expected}, engine received {sent}"))
    }
}
