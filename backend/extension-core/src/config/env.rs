use std::path::PathBuf;

use log::{debug, info, warn};

pub const ENV_IDP_BASE_URL: &str = "EXTENSION_IDP_BASE_URL";
pub const ENV_IDP_CLIENT_ID: &str = "EXTENSION_IDP_CLIENT_ID";
pub const ENV_IDP_CLIENT_SECRET: &str = "EXTENSION_IDP_CLIENT_SECRET";
pub const ENV_API_ROOT: &str = "EXTENSION_API_ROOT";

const DOTENV_FILE_NAME: &str = ".env";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvLoadResult {
    pub path: Option<PathBuf>,
    pub loaded: bool,
}

/// Load `.env` from the working directory, else from next to the executable.
/// Variables already set in the process environment win.
pub fn try_load_dotenv() -> EnvLoadResult {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded .env from: {}", path.display());
        return EnvLoadResult {
            path: Some(path),
            loaded: true,
        };
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let env_path = exe_dir.join(DOTENV_FILE_NAME);
            if env_path.exists() {
                match dotenvy::from_path(&env_path) {
                    Ok(()) => {
                        info!("Loaded .env from: {}", env_path.display());
                        return EnvLoadResult {
                            path: Some(env_path),
                            loaded: true,
                        };
                    }
                    Err(e) => {
                        warn!("Failed to parse .env at {}: {e}", env_path.display());
                    }
                }
            }
        }
    }

    debug!("No .env file found");
    EnvLoadResult::default()
}
