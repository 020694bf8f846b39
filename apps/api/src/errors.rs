use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Required stage fields were blank. The session is untouched.
    #[error("Stage {stage} is missing required fields: {}", fields.join(", "))]
    MissingFields { stage: usize, fields: Vec<String> },

    /// The operation is not legal in the session's current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream model error: {0}")]
    Upstream(#[from] LlmError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut fields = None;
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::MissingFields { fields: missing, .. } => {
                fields = Some(missing.clone());
                (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    "请填写本阶段的所有必填项后再提交。".to_string(),
                )
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Upstream(e) => {
                tracing::error!("Upstream model error: {e}");
                let message = match e {
                    LlmError::Timeout { .. } => "AI响应超时，请稍后重试本阶段。",
                    _ => "AI服务暂时不可用，请稍后重试本阶段。",
                };
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", message.to_string())
            }
            AppError::Extraction(e) => {
                tracing::warn!("Extraction error: {e}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_ERROR",
                    e.user_message(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(fields) = fields {
            error["fields"] = json!(fields);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_maps_to_bad_request() {
        let err = AppError::MissingFields {
            stage: 1,
            fields: vec!["offer_b".to_string()],
        };
        assert_eq!(err.to_string(), "Stage 1 is missing required fields: offer_b");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_maps_to_bad_gateway() {
        let response = AppError::Upstream(LlmError::Timeout { secs: 5 }).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_extraction_maps_to_unprocessable() {
        let err = AppError::Extraction(ExtractionError::NoItems {
            heading: "核心课程清单".to_string(),
        });
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let response = AppError::Conflict("done".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
