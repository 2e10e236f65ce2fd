use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use privacyspy_common::api::{ErrorCode, RequestError, SpyResponse};
use privacyspy_common::error::CommonError;
use privacyspy_common::pipeline::AnalysisError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),
}

/// Failure of an `/analyze` request, rendered as an error envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::Request(e) => e.code(),
            ApiError::Analysis(e) => e.code(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code() {
            ErrorCode::InputMissing | ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::TokenMissing | ErrorCode::TokenInvalid => StatusCode::UNAUTHORIZED,
            ErrorCode::ExtractionFailed => StatusCode::BAD_GATEWAY,
            ErrorCode::LanguageRejected => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = SpyResponse::error(self.code(), self.to_string());
        (self.status(), Json(body)).into_response()
    }
}
