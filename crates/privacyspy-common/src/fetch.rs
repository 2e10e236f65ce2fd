use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use tracing::debug;

use crate::error::CommonError;

#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub max_body_bytes: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            max_body_bytes: 5 * 1024 * 1024,
            user_agent: format!("privacyspy/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FetchConfig {
    /// Optional:
    /// - `PRIVACYSPY_FETCH_TIMEOUT_SECS` (default: 20)
    /// - `PRIVACYSPY_MAX_BODY_BYTES` (default: 5 MiB)
    /// - `PRIVACYSPY_USER_AGENT` (default: "privacyspy/<version>")
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`FetchConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let timeout = lookup("PRIVACYSPY_FETCH_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&n| n > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let max_body_bytes = lookup("PRIVACYSPY_MAX_BODY_BYTES")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults.max_body_bytes);

        let user_agent = lookup("PRIVACYSPY_USER_AGENT")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.user_agent);

        Self {
            timeout,
            max_body_bytes,
            user_agent,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned status {status}")]
    Status { status: StatusCode },

    #[error("response body exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// How a fetched body should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Html,
    PlainText,
}

#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects.
    pub url: Url,
    pub kind: PageKind,
    pub body: String,
}

/// HTTP client for retrieving policy pages.
#[derive(Clone)]
pub struct PolicyFetcher {
    config: FetchConfig,
    http: reqwest::Client,
}

impl PolicyFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, CommonError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { config, http })
    }

    /// GET a page, enforcing the configured timeout and body size cap.
    ///
    /// Bodies are decoded with the charset named in `Content-Type`, UTF-8 when
    /// absent or unknown. Anything not served as `text/plain` is treated as HTML.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let limit = self.config.max_body_bytes;
        let resp = self
            .http
            .get(url.clone())
            .timeout(self.config.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }
        if resp.content_length().is_some_and(|len| len > limit as u64) {
            return Err(FetchError::TooLarge { limit });
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let kind = match content_type.as_deref() {
            Some(ct) if ct.to_ascii_lowercase().starts_with("text/plain") => PageKind::PlainText,
            _ => PageKind::Html,
        };
        let final_url = resp.url().clone();

        let mut body: Vec<u8> = Vec::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if body.len() + chunk.len() > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        debug!(url = %final_url, bytes = body.len(), ?kind, "fetched page");
        Ok(FetchedPage {
            url: final_url,
            kind,
            body: decode_body(&body, content_type.as_deref()),
        })
    }
}

/// Decode a response body using the `charset` parameter of its content type.
///
/// A byte-order mark wins over the declared charset; malformed sequences are
/// replaced rather than rejected.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}
