pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod platform;
pub mod processor;
pub mod resolver;
pub mod validation;

#[cfg(test)]
mod tests;

pub const OAUTH_ENDPOINT_FRAGMENT: &str = "/oauth";
pub const OAUTH_TOKEN_PATH: &str = const_format::concatcp!(OAUTH_ENDPOINT_FRAGMENT, "/token");
pub const CLIENT_CREDENTIALS_GRANT: &str = "grant_type=client_credentials";
pub const JSON_MEDIA_TYPE: &str = "application/json";
pub const VERSIONED_JSON_MEDIA_TYPE_PREFIX: &str =
    const_format::concatcp!(JSON_MEDIA_TYPE, ";version=");
pub const DEFAULT_EXTENSION_FRAGMENT: &str = "cse";
