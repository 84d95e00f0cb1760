//! Behavioural test helpers for container engine connection.
//!
//! This module provides scenario state and the socket resolution steps;
//! API version and connection failure steps live in [`settings_steps`].

mod settings_steps;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use dockhand::engine::{ConnectionSettings, EngineConnector, SocketResolver};
use mockable::MockEnv;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, then, when};

// Re-export step definitions so they are visible to rstest-bdd macros.
#[expect(
    unused_imports,
    reason = "rstest-bdd discovers step functions via attributes, not runtime usage"
)]
pub use settings_steps::*;

/// Step result type for BDD tests, using a static string for errors.
pub(crate) type StepResult<T> = Result<T, &'static str>;

/// Thread-safe environment variable storage for BDD tests.
type EnvVars = Arc<Mutex<HashMap<String, String>>>;

/// Outcome of building connection settings.
#[derive(Clone)]
pub enum SettingsOutcome {
    /// Settings were built with this `MAJOR.MINOR` version.
    Built(String),
    /// Building failed with this message.
    Rejected(String),
}

/// Outcome of a verified connection attempt.
#[derive(Clone)]
pub enum ConnectOutcome {
    /// The engine answered the liveness ping.
    Connected,
    /// Connecting or pinging failed with this rendered error.
    Failed(String),
}

/// State shared across engine connection test scenarios.
#[derive(Default, ScenarioState)]
pub struct EngineConnectionState {
    /// The environment variables to mock.
    env_vars: Slot<EnvVars>,
    /// The configured socket (CLI, config file, `DOCKHAND_ENGINE_SOCKET`).
    config_socket: Slot<Option<String>>,
    /// The resolved socket endpoint.
    resolved_socket: Slot<String>,
    /// The configured API version.
    api_version: Slot<Option<String>>,
    /// Result of building connection settings.
    settings_outcome: Slot<SettingsOutcome>,
    /// Result of a verified connection attempt.
    connect_outcome: Slot<ConnectOutcome>,
}

/// Fixture providing a fresh engine connection state.
#[fixture]
pub fn engine_connection_state() -> EngineConnectionState {
    let state = EngineConnectionState::default();
    state.env_vars.set(Arc::new(Mutex::new(HashMap::new())));
    state.config_socket.set(None);
    state.api_version.set(None);
    state
}

fn get_env_vars(state: &EngineConnectionState) -> StepResult<EnvVars> {
    state.env_vars.get().ok_or("env_vars should be initialised")
}

fn set_env_var(state: &EngineConnectionState, key: &str, value: &str) -> StepResult<()> {
    let env_vars = get_env_vars(state)?;
    let mut vars = env_vars.lock().map_err(|_| "mutex poisoned")?;
    vars.insert(String::from(key), String::from(value));
    Ok(())
}

/// Creates a `MockEnv` from a snapshot of the scenario's variables.
///
/// All "Given" steps run before the "When" step that calls this, so the
/// snapshot is complete.
fn create_mock_env(state: &EngineConnectionState) -> StepResult<MockEnv> {
    let env_vars = get_env_vars(state)?;
    let vars = env_vars.lock().map_err(|_| "mutex poisoned")?.clone();

    let mut mock = MockEnv::new();
    mock.expect_string()
        .returning(move |key| vars.get(key).cloned());
    Ok(mock)
}

fn configured_socket(state: &EngineConnectionState) -> Option<String> {
    state.config_socket.get().flatten()
}

// Given step definitions

#[given("no engine socket is configured")]
fn no_engine_socket_configured(engine_connection_state: &EngineConnectionState) {
    engine_connection_state.config_socket.set(None);
}

#[given("engine socket is configured as {socket}")]
fn engine_socket_configured_as(engine_connection_state: &EngineConnectionState, socket: String) {
    engine_connection_state.config_socket.set(Some(socket));
}

#[given("DOCKER_HOST is set to {value}")]
fn docker_host_is_set_to(
    engine_connection_state: &EngineConnectionState,
    value: String,
) -> StepResult<()> {
    set_env_var(engine_connection_state, "DOCKER_HOST", &value)
}

#[given("DOCKER_HOST is empty")]
fn docker_host_is_empty(engine_connection_state: &EngineConnectionState) -> StepResult<()> {
    set_env_var(engine_connection_state, "DOCKER_HOST", "")
}

#[given("CONTAINER_HOST is set to {value}")]
fn container_host_is_set_to(
    engine_connection_state: &EngineConnectionState,
    value: String,
) -> StepResult<()> {
    set_env_var(engine_connection_state, "CONTAINER_HOST", &value)
}

#[given("PODMAN_HOST is set to {value}")]
fn podman_host_is_set_to(
    engine_connection_state: &EngineConnectionState,
    value: String,
) -> StepResult<()> {
    set_env_var(engine_connection_state, "PODMAN_HOST", &value)
}

// When step definitions

#[when("the socket is resolved")]
fn the_socket_is_resolved(engine_connection_state: &EngineConnectionState) -> StepResult<()> {
    let env = create_mock_env(engine_connection_state)?;
    let resolver = SocketResolver::new(&env);
    let config_socket = configured_socket(engine_connection_state);
    let socket = EngineConnector::resolve_socket(config_socket.as_deref(), &resolver);
    engine_connection_state.resolved_socket.set(socket);
    Ok(())
}

#[when("a verified connection is attempted")]
fn a_verified_connection_is_attempted(
    engine_connection_state: &EngineConnectionState,
) -> StepResult<()> {
    let socket = configured_socket(engine_connection_state).ok_or("socket should be configured")?;
    let settings = ConnectionSettings::new(None, 5, 2).map_err(|_| "default settings are valid")?;

    let outcome = match EngineConnector::connect_and_verify(&socket, &settings) {
        Ok(_) => ConnectOutcome::Connected,
        Err(error) => ConnectOutcome::Failed(error.to_string()),
    };
    engine_connection_state.connect_outcome.set(outcome);
    Ok(())
}

// Then step definitions

#[then("the resolved socket is {expected}")]
fn the_resolved_socket_is(
    engine_connection_state: &EngineConnectionState,
    expected: String,
) -> StepResult<()> {
    let resolved = engine_connection_state
        .resolved_socket
        .get()
        .ok_or("resolved socket should be set")?;
    assert_eq!(
        resolved, expected,
        "Expected resolved socket to be '{expected}', but got '{resolved}'"
    );
    Ok(())
}

#[then("the socket resolves to the platform default")]
fn the_socket_resolves_to_platform_default(
    engine_connection_state: &EngineConnectionState,
) -> StepResult<()> {
    let resolved = engine_connection_state
        .resolved_socket
        .get()
        .ok_or("resolved socket should be set")?;
    let default = SocketResolver::<MockEnv>::default_socket();
    assert_eq!(
        resolved, default,
        "Expected resolved socket to be platform default '{default}', but got '{resolved}'"
    );
    Ok(())
}

#[then("the connection fails with an engine error")]
fn the_connection_fails(engine_connection_state: &EngineConnectionState) -> StepResult<()> {
    match engine_connection_state
        .connect_outcome
        .get()
        .ok_or("connection outcome should be set")?
    {
        ConnectOutcome::Connected => Err("expected the connection to fail"),
        ConnectOutcome::Failed(message) => {
            assert!(
                message.contains("not found")
                    || message.contains("failed to connect")
                    || message.contains("health check failed"),
                "unexpected connection error: {message}"
            );
            Ok(())
        }
    }
}
