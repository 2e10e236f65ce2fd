use std::net::SocketAddr;
use std::path::PathBuf;

use privacyspy_common::fetch::FetchConfig;
use privacyspy_common::weights::DEFAULT_WEIGHTS_PATH;

use crate::error::AppError;

const DEFAULT_BIND: &str = "0.0.0.0:5000";

/// HTTP service configuration loaded explicitly from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the keyword coefficients JSON file.
    pub coefficients_path: PathBuf,
    /// Shared API token. `None` only when auth was explicitly disabled.
    pub token: Option<String>,
    pub bind: SocketAddr,
    pub fetch: FetchConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `PRIVACYSPY_TOKEN`: API token clients must send, unless
    ///   `PRIVACYSPY_AUTH_DISABLED` is `1` or `true`
    ///
    /// Optional:
    /// - `PRIVACYSPY_COEFFICIENTS_PATH`: weights file (default: `./data/keyword_coefficients.json`)
    /// - `PRIVACYSPY_BIND`: listen address (default: `0.0.0.0:5000`)
    /// - fetch settings, see [`FetchConfig::from_env`]
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let coefficients_path = lookup("PRIVACYSPY_COEFFICIENTS_PATH")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WEIGHTS_PATH.to_string())
            .into();

        let token = lookup("PRIVACYSPY_TOKEN").filter(|s| !s.is_empty());
        let auth_disabled = lookup("PRIVACYSPY_AUTH_DISABLED")
            .is_some_and(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true"));
        if token.is_none() && !auth_disabled {
            return Err(AppError::Config(
                "PRIVACYSPY_TOKEN is required (set PRIVACYSPY_AUTH_DISABLED=1 to serve without auth)"
                    .to_string(),
            ));
        }

        let bind_raw = lookup("PRIVACYSPY_BIND")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.trim().parse::<SocketAddr>().map_err(|e| {
            AppError::Config(format!("PRIVACYSPY_BIND {bind_raw:?} is not a socket address: {e}"))
        })?;

        Ok(Self {
            coefficients_path,
            token,
            bind,
            fetch: FetchConfig::from_lookup(lookup),
        })
    }
}
