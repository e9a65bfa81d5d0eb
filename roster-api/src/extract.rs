//! Request extractors
//!
//! Body rejections are turned into [`ApiError`] so clients always get the
//! JSON error shape.

use crate::error::ApiError;
use axum::{extract::rejection::JsonRejection, extract::FromRequest};

/// `axum::Json` with the rejection mapped to a 400 [`ApiError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Rejected request body");

        let message = match rejection {
            JsonRejection::JsonSyntaxError(_) => "Malformed JSON body",
            JsonRejection::MissingJsonContentType(_) => {
                "Expected request with Content-Type: application/json"
            }
            _ => "Invalid request body",
        };

        ApiError::BadRequest(message.to_string())
    }
}
