//! Dispatch errors and their translation to HTTP responses.
//!
//! # Responsibilities
//! - Define the error kinds produced while dispatching and executing a route
//! - Map the kinds with a wire meaning to status + message
//!
//! # Design Decisions
//! - `Unhandled` is never translated here. It propagates to the hosting layer,
//!   which applies its default (500) response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::routing::params::BindError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors an operation body may return.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A precondition on the request was not met.
    #[error("{0}")]
    Validation(String),

    /// The handler chose a status and message for the client.
    #[error("{message}")]
    Domain { status: StatusCode, message: String },

    #[error("{0}")]
    Unhandled(BoxError),
}

impl HandlerError {
    pub fn validation(message: impl Into<String>) -> Self {
        HandlerError::Validation(message.into())
    }

    pub fn domain(status: StatusCode, message: impl Into<String>) -> Self {
        HandlerError::Domain {
            status,
            message: message.into(),
        }
    }

    pub fn unhandled(err: impl Into<BoxError>) -> Self {
        HandlerError::Unhandled(err.into())
    }
}

/// Errors surfaced by the dispatcher for one request.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    /// Carries its own status; used for domain errors and gate rejections.
    #[error("{message}")]
    Http { status: StatusCode, message: String },

    #[error("worker pool is not accepting work")]
    WorkerUnavailable,

    #[error("unhandled error: {0}")]
    Unhandled(BoxError),
}

impl RouteError {
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        RouteError::Http {
            status,
            message: message.into(),
        }
    }
}

impl From<HandlerError> for RouteError {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::Validation(msg) => RouteError::Validation(msg),
            HandlerError::Domain { status, message } => RouteError::Http { status, message },
            HandlerError::Unhandled(e) => RouteError::Unhandled(e),
        }
    }
}

impl From<BindError> for RouteError {
    fn from(err: BindError) -> Self {
        RouteError::Validation(err.to_string())
    }
}

/// Maps error kinds to wire status codes.
pub struct ErrorTranslator;

impl ErrorTranslator {
    /// Status and message for kinds with a wire meaning; `None` for unhandled errors.
    pub fn translate(err: &RouteError) -> Option<(StatusCode, String)> {
        match err {
            RouteError::NotFound => Some((StatusCode::NOT_FOUND, err.to_string())),
            RouteError::Validation(msg) => Some((StatusCode::NOT_ACCEPTABLE, msg.clone())),
            RouteError::Http { status, message } => Some((*status, message.clone())),
            RouteError::WorkerUnavailable => {
                Some((StatusCode::SERVICE_UNAVAILABLE, err.to_string()))
            }
            RouteError::Unhandled(_) => None,
        }
    }

    /// Translate into a response, or hand the error back untouched.
    pub fn into_response(err: RouteError) -> Result<Response, RouteError> {
        match Self::translate(&err) {
            Some((status, message)) => Ok((status, message).into_response()),
            None => Err(err),
        }
    }
}
