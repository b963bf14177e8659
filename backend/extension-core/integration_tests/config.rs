use extension_core::config::ExtensionConfig;
use extension_core::error::ConfigError;

use std::io::Write;

use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn given_config_file_when_loaded_then_sections_parsed() {
    // GIVEN
    let file = write_config(
        r#"
[identity]
base_url = "https://idp.example.com"
client_id = "extension-client"
client_secret = "s3cr3t"
timeout_secs = 5

[platform]
api_root = "https://vcd.example.com/api"
extension_fragment = "cse"
versions = ["35.0", "36.0"]

[processor]
max_auth_retries = 4
token_cache = false
"#,
    );

    // WHEN
    let config = ExtensionConfig::load(file.path()).expect("config");

    // THEN
    assert!(config.validate().is_ok());
    assert_eq!(config.identity.timeout_secs, 5);
    assert_eq!(config.platform.versions, vec!["35.0", "36.0"]);
    assert_eq!(config.processor.max_auth_retries, 4);
    assert!(!config.processor.token_cache);
    assert_eq!(
        config.credential().expect("credential").token_url(),
        "https://idp.example.com/oauth/token"
    );
}

#[test]
fn given_missing_file_when_loaded_then_read_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.toml");

    let result = ExtensionConfig::load(&path);

    match result {
        Err(ConfigError::ReadError { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected ReadError, got {other:?}"),
    }
}

/// **VALUE**: Broken TOML is reported with the offending file.
///
/// **BUG THIS CATCHES**: Would catch a parse failure falling back to defaults
/// and starting the extension against no identity provider at all.
#[test]
fn given_invalid_toml_when_loaded_then_parse_error() {
    // GIVEN
    let file = write_config("[identity\nbase_url = ");

    // WHEN
    let result = ExtensionConfig::load(file.path());

    // THEN
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn given_wrong_field_type_when_loaded_then_parse_error() {
    let file = write_config("[platform]\nversions = \"35.0\"\n");

    let result = ExtensionConfig::load(file.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}
