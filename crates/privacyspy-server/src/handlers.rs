use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use privacyspy_common::api::{
    parse_format, RequestError, ResponseBody, SourceParams, SpyResponse, API_VERSION,
};
use privacyspy_common::pipeline::{AnalysisRequest, PolicyAnalyzer};

use crate::error::ApiError;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<PolicyAnalyzer>,
    /// SHA-256 of the configured API token; `None` when auth was explicitly disabled.
    token_digest: Option<[u8; 32]>,
}

impl AppState {
    pub fn new(analyzer: PolicyAnalyzer, token: Option<&str>) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            token_digest: token.map(digest),
        }
    }

    fn check_token(&self, token: Option<&str>) -> Result<(), RequestError> {
        let Some(expected) = &self.token_digest else {
            return Ok(());
        };
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(RequestError::TokenMissing)?;
        if digest(token) == *expected {
            Ok(())
        } else {
            Err(RequestError::TokenInvalid)
        }
    }
}

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

/// Query string or JSON body of an `/analyze` request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeParams {
    pub token: Option<String>,
    pub url: Option<String>,
    pub html: Option<String>,
    pub text: Option<String>,
    /// `sentences` (default) or `markup`.
    pub format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub keywords: usize,
}

pub async fn index() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "No API request received. See documentation for details." })),
    )
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: API_VERSION,
        keywords: state.analyzer.weights().len(),
    })
}

/// GET /analyze?url=...&token=...&format=...
pub async fn analyze_query(
    State(state): State<AppState>,
    query: Result<Query<AnalyzeParams>, QueryRejection>,
) -> Result<Json<SpyResponse>, ApiError> {
    let started = Instant::now();
    let result = match query {
        Ok(Query(params)) => analyze(&state, params).await,
        Err(rejection) => Err(RequestError::Invalid(rejection.body_text()).into()),
    };
    log_outcome("GET", &result, started);
    result
}

/// POST /analyze with a JSON body.
pub async fn analyze_json(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeParams>, JsonRejection>,
) -> Result<Json<SpyResponse>, ApiError> {
    let started = Instant::now();
    let result = match body {
        Ok(Json(params)) => analyze(&state, params).await,
        Err(rejection) => Err(RequestError::Invalid(rejection.body_text()).into()),
    };
    log_outcome("POST", &result, started);
    result
}

/// Source presence, then the token, then source validity, then the pipeline.
async fn analyze(state: &AppState, params: AnalyzeParams) -> Result<Json<SpyResponse>, ApiError> {
    let AnalyzeParams {
        token,
        url,
        html,
        text,
        format,
    } = params;

    let source = SourceParams { url, html, text };
    if source.is_empty() {
        return Err(RequestError::Missing.into());
    }
    state.check_token(token.as_deref())?;

    let request = AnalysisRequest {
        source: source.into_source()?,
        format: parse_format(format.as_deref())?,
    };
    let analysis = state.analyzer.analyze(request).await?;
    Ok(Json(SpyResponse::success(analysis)))
}

fn log_outcome(method: &str, result: &Result<Json<SpyResponse>, ApiError>, started: Instant) {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(Json(response)) => {
            let sentences = match &response.response {
                ResponseBody::Sentences(sentences) => sentences.len(),
                ResponseBody::Text(_) => 0,
            };
            info!(method, sentences, elapsed_ms, "analyze request served");
        }
        Err(e) => {
            warn!(
                method,
                code = e.code().as_u8(),
                error = %e,
                elapsed_ms,
                "analyze request failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use privacyspy_common::fetch::{FetchConfig, PolicyFetcher};
    use privacyspy_common::weights::KeywordWeights;

    use super::*;

    fn state(token: Option<&str>) -> AppState {
        let weights = Arc::new(KeywordWeights::from_map([("privacy", 1.0)]).unwrap());
        let fetcher = PolicyFetcher::new(FetchConfig::default()).unwrap();
        AppState::new(PolicyAnalyzer::new(weights, fetcher), token)
    }

    #[test]
    fn token_checks_are_skipped_when_auth_is_disabled() {
        let state = state(None);
        assert_eq!(state.check_token(None), Ok(()));
        assert_eq!(state.check_token(Some("anything")), Ok(()));
    }

    #[test]
    fn token_is_compared_by_digest() {
        let state = state(Some("s3cret"));
        assert_eq!(state.check_token(Some("s3cret")), Ok(()));
        assert_eq!(state.check_token(None), Err(RequestError::TokenMissing));
        assert_eq!(state.check_token(Some("")), Err(RequestError::TokenMissing));
        assert_eq!(state.check_token(Some("S3CRET")), Err(RequestError::TokenInvalid));
    }

    #[tokio::test]
    async fn missing_source_is_reported_before_token() {
        let state = state(Some("s3cret"));
        let err = analyze(&state, AnalyzeParams::default()).await.unwrap_err();
        assert_eq!(err.code().as_u8(), 1);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn token_is_checked_before_source_validity() {
        let state = state(Some("s3cret"));
        let params = AnalyzeParams {
            url: Some("ftp://example.com".to_string()),
            ..Default::default()
        };
        let err = analyze(&state, params).await.unwrap_err();
        assert_eq!(err.code().as_u8(), 2);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
