use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    ValidationError(#[from] crate::validation::ValidationError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Completion service error: {0}")]
    CompletionError(#[from] crate::llm::LlmError),

    #[error("News service error: {0}")]
    NewsError(#[from] crate::news::NewsError),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DatabaseError(_)
            | ApiError::CompletionError(_)
            | ApiError::NewsError(_)
            | ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let error_message = if status.is_server_error() {
            // Log the detailed error but don't expose it to the client
            error!(error = %self, "Request failed");
            match self {
                ApiError::CompletionError(_) => "Failed to generate content".to_string(),
                ApiError::NewsError(_) => "Failed to fetch news".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        };

        let mut body = json!({ "error": error_message });
        if matches!(self, ApiError::NotFound(_)) {
            body["success"] = json!(false);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_is_bad_request_with_message() {
        let response =
            ApiError::from(ValidationError::MissingField("Article title")).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Article title is required"})
        );
    }

    #[tokio::test]
    async fn test_not_found_reports_failure_flag() {
        let response = ApiError::NotFound("Article").into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"success": false, "error": "Article not found"})
        );
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let response =
            ApiError::DatabaseError(diesel::result::Error::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Internal server error"})
        );

        let response = ApiError::from(crate::llm::LlmError::EmptyResponse).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Failed to generate content"})
        );
    }
}
