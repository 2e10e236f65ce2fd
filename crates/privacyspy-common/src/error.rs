/// Error types shared across the PrivacySpy service crates.
///
/// These cover process-wide resources that both the HTTP and MCP servers load at
/// startup. Per-request failures live next to the code that produces them
/// (`FetchError`, `ExtractError`, `AnalysisError`) and binaries wrap
/// `CommonError` via `#[from]`.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("failed to read keyword weights from {path}: {source}")]
    WeightsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed keyword weights in {path}: {source}")]
    WeightsJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("keyword weights define {lemma:?} more than once with different weights")]
    DuplicateLemma { lemma: String },

    #[error("keyword weight for {lemma:?} is not a finite number")]
    NonFiniteWeight { lemma: String },

    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}
