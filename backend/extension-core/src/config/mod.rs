mod env;

pub use env::{
    ENV_API_ROOT, ENV_IDP_BASE_URL, ENV_IDP_CLIENT_ID, ENV_IDP_CLIENT_SECRET, EnvLoadResult,
    try_load_dotenv,
};

use crate::DEFAULT_EXTENSION_FRAGMENT;
use crate::auth::{Credential, DEFAULT_TOKEN_TIMEOUT};
use crate::auth::cache::{DEFAULT_REFRESH_SKEW, DEFAULT_TOKEN_TTL};
use crate::error::ConfigError;
use crate::platform::DEFAULT_PLATFORM_TIMEOUT;
use crate::processor::{
    DEFAULT_INITIAL_RETRY_DELAY, DEFAULT_MAX_AUTH_RETRIES, DEFAULT_MAX_RETRY_DELAY, RetryPolicy,
};
use crate::resolver::UriFragments;

use common::{ErrorLocation, RedactedSecret};

use std::collections::HashSet;
use std::panic::Location;
use std::path::Path;
use std::time::Duration;

use log::{info, warn};
use serde::Deserialize;
use url::Url;

// ============================================
// CONFIG STRUCTS
// ============================================

/// Identity provider the extension authenticates against.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub client_id: String,
    /// Inline secret. Takes precedence over `client_secret_env`.
    #[serde(default)]
    pub client_secret: Option<RedactedSecret>,
    /// Name of the environment variable holding the secret.
    #[serde(default)]
    pub client_secret_env: Option<String>,
    #[serde(default = "default_identity_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub proxy_url: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            client_id: String::new(),
            client_secret: None,
            client_secret_env: None,
            timeout_secs: default_identity_timeout_secs(),
            proxy_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub api_root: String,
    #[serde(default = "default_extension_fragment")]
    pub extension_fragment: String,
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_root: String::new(),
            extension_fragment: default_extension_fragment(),
            versions: Vec::new(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorConfig {
    #[serde(default = "default_max_auth_retries")]
    pub max_auth_retries: u32,
    #[serde(default = "default_initial_retry_delay_ms")]
    pub initial_retry_delay_ms: u64,
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,
    #[serde(default = "default_token_cache")]
    pub token_cache: bool,
    /// Lifetime assumed for tokens issued without `expires_in`.
    #[serde(default = "default_token_ttl_secs")]
    pub default_token_ttl_secs: u64,
    #[serde(default = "default_refresh_skew_secs")]
    pub refresh_skew_secs: u64,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_auth_retries: default_max_auth_retries(),
            initial_retry_delay_ms: default_initial_retry_delay_ms(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
            token_cache: default_token_cache(),
            default_token_ttl_secs: default_token_ttl_secs(),
            refresh_skew_secs: default_refresh_skew_secs(),
        }
    }
}

impl ProcessorConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_auth_retries,
            initial_delay: Duration::from_millis(self.initial_retry_delay_ms),
            max_delay: Duration::from_millis(self.max_retry_delay_ms),
        }
    }

    pub fn default_token_ttl(&self) -> Duration {
        Duration::from_secs(self.default_token_ttl_secs)
    }

    pub fn refresh_skew(&self) -> Duration {
        Duration::from_secs(self.refresh_skew_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtensionConfig {
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_identity_timeout_secs() -> u64 {
    DEFAULT_TOKEN_TIMEOUT.as_secs()
}
fn default_extension_fragment() -> String {
    DEFAULT_EXTENSION_FRAGMENT.to_string()
}
fn default_request_timeout_secs() -> u64 {
    DEFAULT_PLATFORM_TIMEOUT.as_secs()
}
fn default_max_auth_retries() -> u32 {
    DEFAULT_MAX_AUTH_RETRIES
}
fn default_initial_retry_delay_ms() -> u64 {
    DEFAULT_INITIAL_RETRY_DELAY.as_millis() as u64
}
fn default_max_retry_delay_ms() -> u64 {
    DEFAULT_MAX_RETRY_DELAY.as_millis() as u64
}
fn default_token_cache() -> bool {
    true
}
fn default_token_ttl_secs() -> u64 {
    DEFAULT_TOKEN_TTL.as_secs()
}
fn default_refresh_skew_secs() -> u64 {
    DEFAULT_REFRESH_SKEW.as_secs()
}

// ============================================
// IMPLEMENTATION
// ============================================

impl ExtensionConfig {
    /// Read and parse a TOML config file. Does not validate: overrides may
    /// still fill in required fields, so call [`ExtensionConfig::validate`]
    /// afterwards.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ReadError`] or [`ConfigError::ParseError`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            warn!("Failed to read config file {}: {e}", path.display());
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: path.to_path_buf(),
                source: e,
            }
        })?;

        let config: ExtensionConfig = toml::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config TOML {}: {e}", path.display());
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        info!("Config loaded from {}", path.display());
        Ok(config)
    }

    /// Load `.env`, then the file, then process-environment overrides, then
    /// validate.
    pub fn load_from_env(path: &Path) -> Result<Self, ConfigError> {
        try_load_dotenv();

        let mut config = Self::load(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from `lookup` (normally the process environment).
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(base_url) = get(ENV_IDP_BASE_URL) {
            info!("Identity base URL overridden by {ENV_IDP_BASE_URL}");
            self.identity.base_url = base_url;
        }
        if let Some(client_id) = get(ENV_IDP_CLIENT_ID) {
            info!("Client id overridden by {ENV_IDP_CLIENT_ID}");
            self.identity.client_id = client_id;
        }
        if let Some(secret) = get(ENV_IDP_CLIENT_SECRET) {
            info!("Client secret overridden by {ENV_IDP_CLIENT_SECRET}");
            self.identity.client_secret = Some(RedactedSecret::new(secret));
        }
        if let Some(api_root) = get(ENV_API_ROOT) {
            info!("API root overridden by {ENV_API_ROOT}");
            self.platform.api_root = api_root;
        }

        if self.identity.client_secret.is_none() {
            if let Some(secret) = self
                .identity
                .client_secret_env
                .as_deref()
                .and_then(get)
            {
                self.identity.client_secret = Some(RedactedSecret::new(secret));
            }
        }
    }

    /// # Errors
    ///
    /// [`ConfigError::ValidationError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let identity = &self.identity;
        if identity.base_url.trim().is_empty() {
            return Err(ConfigError::validation("identity.base_url must be set"));
        }
        if let Err(e) = Url::parse(&identity.base_url) {
            return Err(ConfigError::validation(format!(
                "identity.base_url '{}' is not a valid URL: {e}",
                identity.base_url
            )));
        }
        if identity.client_id.trim().is_empty() {
            return Err(ConfigError::validation("identity.client_id must be set"));
        }
        if identity.client_secret.as_ref().is_none_or(RedactedSecret::is_empty) {
            return Err(ConfigError::validation(
                "identity.client_secret must be set, inline or through client_secret_env",
            ));
        }
        if identity.timeout_secs == 0 {
            return Err(ConfigError::validation("identity.timeout_secs must be > 0"));
        }
        if let Some(proxy_url) = identity.proxy_url.as_deref() {
            if let Err(e) = Url::parse(proxy_url) {
                return Err(ConfigError::validation(format!(
                    "identity.proxy_url '{proxy_url}' is not a valid URL: {e}"
                )));
            }
        }

        let platform = &self.platform;
        if let Err(e) = Url::parse(&platform.api_root) {
            return Err(ConfigError::validation(format!(
                "platform.api_root '{}' is not a valid URL: {e}",
                platform.api_root
            )));
        }
        if platform.extension_fragment.trim_matches('/').is_empty() {
            return Err(ConfigError::validation(
                "platform.extension_fragment must not be empty",
            ));
        }
        if platform.versions.is_empty() {
            return Err(ConfigError::validation(
                "platform.versions must list at least one API version",
            ));
        }
        let mut seen = HashSet::new();
        for version in &platform.versions {
            if version.trim().is_empty() {
                return Err(ConfigError::validation("platform.versions contains an empty entry"));
            }
            if !seen.insert(version.as_str()) {
                return Err(ConfigError::validation(format!(
                    "platform.versions lists '{version}' more than once"
                )));
            }
        }
        if platform.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "platform.request_timeout_secs must be > 0",
            ));
        }

        let processor = &self.processor;
        if processor.initial_retry_delay_ms > processor.max_retry_delay_ms {
            return Err(ConfigError::validation(
                "processor.initial_retry_delay_ms must not exceed max_retry_delay_ms",
            ));
        }

        Ok(())
    }

    /// # Errors
    ///
    /// [`ConfigError::ValidationError`] if no secret has been resolved.
    pub fn credential(&self) -> Result<Credential, ConfigError> {
        let Some(secret) = self.identity.client_secret.clone() else {
            return Err(ConfigError::validation("identity.client_secret is not set"));
        };
        Ok(Credential::new(
            self.identity.base_url.clone(),
            self.identity.client_id.clone(),
            secret,
        ))
    }

    pub fn uri_fragments(&self) -> UriFragments {
        UriFragments::new(
            self.platform.api_root.clone(),
            self.platform.extension_fragment.trim_matches('/'),
        )
    }

    pub fn identity_timeout(&self) -> Duration {
        Duration::from_secs(self.identity.timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.platform.request_timeout_secs)
    }
}
