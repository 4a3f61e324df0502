//! Tests for subscriber installation.

use super::{TelemetryError, init};
use crate::config::{LogFormat, LoggingConfig};
use rstest::rstest;

#[rstest]
#[case::word("verbose")]
#[case::numeric("7")]
fn unknown_level_is_rejected_before_install(#[case] level: &str) {
    let config = LoggingConfig {
        level: level.to_owned(),
        format: LogFormat::Pretty,
    };

    let result = init(&config);

    assert!(matches!(result, Err(TelemetryError::InvalidLevel(value)) if value == level));
}

#[rstest]
fn second_installation_is_reported() {
    let config = LoggingConfig {
        level: "debug".to_owned(),
        format: LogFormat::Json,
    };

    // This binary installs no other subscriber, so only the second call fails.
    let first = init(&config);
    let second = init(&config);

    assert!(first.is_ok(), "first install failed: {first:?}");
    assert!(matches!(second, Err(TelemetryError::Install(_))));
}
