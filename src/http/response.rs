//! Response shaping for dispatch failures.
//!
//! # Responsibilities
//! - Turn translated route errors into responses
//! - Apply the hosting layer's default (500) to untranslated errors
//!
//! # Design Decisions
//! - Internal error details are logged, never sent to the client

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::routing::error::{ErrorTranslator, RouteError};

/// Response for a failed dispatch or operation.
pub fn error_response(request_id: &str, err: RouteError) -> Response {
    match ErrorTranslator::into_response(err) {
        Ok(response) => response,
        Err(unhandled) => {
            tracing::error!(request_id = %request_id, error = %unhandled, "Unhandled error");
            internal_error()
        }
    }
}

/// Default response for errors nothing else translated.
pub fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}
