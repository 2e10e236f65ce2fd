use std::path::PathBuf;

use privacyspy_common::fetch::FetchConfig;
use privacyspy_common::weights::DEFAULT_WEIGHTS_PATH;

use crate::error::AppError;

/// MCP server configuration. There is no token: the server only talks to the
/// client that spawned it over stdio.
#[derive(Debug, Clone)]
pub struct Config {
    pub coefficients_path: PathBuf,
    pub fetch: FetchConfig,
}

impl Config {
    /// Optional:
    /// - `PRIVACYSPY_COEFFICIENTS_PATH`: weights file (default: `./data/keyword_coefficients.json`)
    /// - fetch settings, see [`FetchConfig::from_env`]
    pub fn from_env() -> Result<Self, AppError> {
        let coefficients_path: PathBuf = std::env::var("PRIVACYSPY_COEFFICIENTS_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WEIGHTS_PATH.to_string())
            .into();

        if !coefficients_path.is_file() {
            return Err(AppError::Config(format!(
                "keyword coefficients not found at {}",
                coefficients_path.display()
            )));
        }

        Ok(Self {
            coefficients_path,
            fetch: FetchConfig::from_env(),
        })
    }
}
