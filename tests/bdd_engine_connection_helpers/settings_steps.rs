//! API version selection steps.

use dockhand::config::AppConfig;
use dockhand::engine::ConnectionSettings;
use rstest_bdd_macros::{given, then, when};

use super::{EngineConnectionState, SettingsOutcome, StepResult};

#[given("no API version is configured")]
fn no_api_version_configured(engine_connection_state: &EngineConnectionState) {
    engine_connection_state.api_version.set(None);
}

#[given("the API version is configured as {version}")]
fn api_version_configured_as(engine_connection_state: &EngineConnectionState, version: String) {
    engine_connection_state.api_version.set(Some(version));
}

#[when("connection settings are built")]
fn connection_settings_are_built(engine_connection_state: &EngineConnectionState) {
    let config = AppConfig {
        api_version: engine_connection_state.api_version.get().flatten(),
        ..AppConfig::default()
    };

    let outcome = match ConnectionSettings::from_config(&config) {
        Ok(settings) => {
            let version = settings.api_version();
            SettingsOutcome::Built(format!(
                "{}.{}",
                version.major_version, version.minor_version
            ))
        }
        Err(error) => SettingsOutcome::Rejected(error.to_string()),
    };
    engine_connection_state.settings_outcome.set(outcome);
}

#[then("the requested API version is {expected}")]
fn requested_api_version_is(
    engine_connection_state: &EngineConnectionState,
    expected: String,
) -> StepResult<()> {
    match engine_connection_state
        .settings_outcome
        .get()
        .ok_or("settings outcome should be set")?
    {
        SettingsOutcome::Built(version) => {
            assert_eq!(version, expected, "unexpected API version");
            Ok(())
        }
        SettingsOutcome::Rejected(_) => Err("expected settings to be built"),
    }
}

#[then("connection settings are rejected mentioning {field}")]
fn connection_settings_are_rejected(
    engine_connection_state: &EngineConnectionState,
    field: String,
) -> StepResult<()> {
    match engine_connection_state
        .settings_outcome
        .get()
        .ok_or("settings outcome should be set")?
    {
        SettingsOutcome::Rejected(message) => {
            assert!(
                message.contains(&field),
                "expected '{field}' in error, got: {message}"
            );
            Ok(())
        }
        SettingsOutcome::Built(_) => Err("expected settings to be rejected"),
    }
}
