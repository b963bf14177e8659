use crate::error::ServerError;

use extension_core::error::{ConfigError, CoreError, ResolveError};

/// **VALUE**: Startup errors serialize with their variant tag.
///
/// **BUG THIS CATCHES**: Would catch a non-serializable field sneaking into
/// `ServerError`, which breaks structured error reporting.
#[test]
fn given_server_error_when_serialized_then_tagged() {
    // GIVEN
    let err = ServerError::startup("no handlers");

    // WHEN
    let json = serde_json::to_string(&err).unwrap();

    // THEN
    assert!(json.contains("Startup"));
    assert!(json.contains("no handlers"));
}

#[test]
fn given_config_error_when_converted_then_config_variant() {
    let err = ServerError::from(ConfigError::validation("platform.versions must list"));

    assert!(matches!(err, ServerError::Config { .. }));
    assert!(err.to_string().contains("platform.versions"));
}

/// **VALUE**: Converted core errors keep their text and point at the call
/// site that converted them.
///
/// **BUG THIS CATCHES**: Would catch the location pointing into `error.rs`
/// because `#[track_caller]` was dropped somewhere along the conversion.
#[test]
fn given_core_error_when_converted_then_keeps_message_and_caller() {
    // GIVEN
    let core = CoreError::from(ResolveError::duplicate("35.0"));

    // WHEN
    let err = ServerError::from(core);

    // THEN
    assert!(err.to_string().contains("35.0"));
    match err {
        ServerError::Startup { location, .. } => {
            assert!(location.file.ends_with("tests/error.rs"), "{}", location.file);
        }
        other => panic!("Expected Startup, got {other:?}"),
    }
}

#[test]
fn given_logger_error_when_formatted_then_includes_location() {
    let err = ServerError::logger("Failed to create log file");

    let text = err.to_string();

    assert!(text.starts_with("Logger Error: Failed to create log file"));
    assert!(text.contains("error.rs"));
}
