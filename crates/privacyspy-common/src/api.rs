/// Wire types shared by the HTTP and MCP surfaces.
///
/// Every answer is wrapped in a [`SpyResponse`] envelope carrying the API
/// version, a status and either the result or a human-readable message. Error
/// envelopes also carry a stable numeric [`ErrorCode`].
use reqwest::Url;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::pipeline::{Analysis, OutputFormat, PolicySource};

pub const API_VERSION: &str = "1.0";

/// Stable error codes reported in the `errorCode` envelope field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCode {
    InputMissing = 1,
    TokenMissing = 2,
    TokenInvalid = 3,
    ExtractionFailed = 4,
    LanguageRejected = 5,
    InvalidInput = 6,
}

impl ErrorCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Failures detected before the pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("No URL provided.")]
    Missing,

    #[error("No token provided.")]
    TokenMissing,

    #[error("Invalid token.")]
    TokenInvalid,

    #[error("{0}")]
    Invalid(String),
}

impl RequestError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RequestError::Missing => ErrorCode::InputMissing,
            RequestError::TokenMissing => ErrorCode::TokenMissing,
            RequestError::TokenInvalid => ErrorCode::TokenInvalid,
            RequestError::Invalid(_) => ErrorCode::InvalidInput,
        }
    }
}

/// Policy source fields as they arrive on the wire. Exactly one must be set.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SourceParams {
    /// Absolute http(s) URL of the privacy policy page.
    #[serde(default)]
    pub url: Option<String>,
    /// Raw HTML of the privacy policy page.
    #[serde(default)]
    pub html: Option<String>,
    /// Plain-text privacy policy, paragraphs separated by blank lines.
    #[serde(default)]
    pub text: Option<String>,
}

impl SourceParams {
    /// Whether no source field carries anything but whitespace.
    pub fn is_empty(&self) -> bool {
        self.provided_count() == 0
    }

    fn provided_count(&self) -> usize {
        [&self.url, &self.html, &self.text]
            .into_iter()
            .filter(|field| present(field).is_some())
            .count()
    }

    pub fn into_source(self) -> Result<PolicySource, RequestError> {
        match self.provided_count() {
            0 => return Err(RequestError::Missing),
            1 => {}
            _ => {
                return Err(RequestError::Invalid(
                    "Provide only one of url, html or text.".to_string(),
                ))
            }
        }

        if let Some(raw) = present(&self.url) {
            return parse_policy_url(raw.trim()).map(PolicySource::Url);
        }
        if let Some(html) = self.html.filter(|s| !s.trim().is_empty()) {
            return Ok(PolicySource::Html(html));
        }
        match self.text.filter(|s| !s.trim().is_empty()) {
            Some(text) => Ok(PolicySource::Text(text)),
            None => Err(RequestError::Missing),
        }
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

fn parse_policy_url(raw: &str) -> Result<Url, RequestError> {
    let url = Url::parse(raw).map_err(|e| RequestError::Invalid(format!("Invalid URL: {e}.")))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        "http" | "https" => Err(RequestError::Invalid("Invalid URL: missing host.".to_string())),
        scheme => Err(RequestError::Invalid(format!(
            "Unsupported URL scheme {scheme:?}; only http and https are allowed."
        ))),
    }
}

/// Parse the optional `format` parameter. Missing or blank means sentences.
pub fn parse_format(raw: Option<&str>) -> Result<OutputFormat, RequestError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(OutputFormat::Sentences);
    };
    match raw.to_ascii_lowercase().as_str() {
        "sentences" => Ok(OutputFormat::Sentences),
        "markup" | "html" => Ok(OutputFormat::Markup),
        _ => Err(RequestError::Invalid(format!(
            "Unknown format {raw:?}; expected \"sentences\" or \"markup\"."
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SentenceScore {
    pub sentence: String,
    /// Importance relative to the highest-scoring sentence, in [0, 1].
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ResponseBody {
    Sentences(Vec<SentenceScore>),
    /// Annotated markup on success, the error message otherwise.
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpyResponse {
    pub version: String,
    pub status: Status,
    pub response: ResponseBody,
    #[serde(
        rename = "errorCode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_code: Option<u8>,
}

impl SpyResponse {
    pub fn success(analysis: Analysis) -> Self {
        let response = match analysis {
            Analysis::Sentences(sentences) => ResponseBody::Sentences(
                sentences
                    .into_iter()
                    .map(|s| SentenceScore {
                        sentence: s.text,
                        score: s.normalized_score,
                    })
                    .collect(),
            ),
            Analysis::Markup(markup) => ResponseBody::Text(markup),
        };
        Self {
            version: API_VERSION.to_string(),
            status: Status::Success,
            response,
            error_code: None,
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            version: API_VERSION.to_string(),
            status: Status::Error,
            response: ResponseBody::Text(message.into()),
            error_code: Some(code.as_u8()),
        }
    }
}
