//! HTTP error responses and their mapping from domain errors.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::entity::ValidationError;
use crate::error::SharenoteError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{message}")]
    Validation {
        loc: Vec<String>,
        message: String,
        kind: &'static str,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SharenoteError> for ApiError {
    fn from(err: SharenoteError) -> Self {
        match err {
            SharenoteError::NoteNotFound(_) => ApiError::NotFound("Note not found"),
            SharenoteError::SharedNoteNotFound(_) => ApiError::NotFound("Shared note not found"),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation {
            loc: vec!["body".to_string(), err.field.to_string()],
            message: err.message,
            kind: err.kind,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let kind = match &rejection {
            JsonRejection::JsonDataError(_) => "invalid_data",
            JsonRejection::JsonSyntaxError(_) => "json_invalid",
            JsonRejection::MissingJsonContentType(_) => "missing_content_type",
            _ => "invalid_body",
        };
        ApiError::Validation {
            loc: vec!["body".to_string()],
            message: rejection.body_text(),
            kind,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::NotFound(detail) => json!({ "detail": detail }),
            ApiError::Validation { loc, message, kind } => json!({
                "detail": [{ "loc": loc, "msg": message, "type": kind }]
            }),
            ApiError::Internal(cause) => {
                error!("Request failed: {cause}");
                json!({ "detail": "Internal server error" })
            }
        };

        (status, Json(body)).into_response()
    }
}
