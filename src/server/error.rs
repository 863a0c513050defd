//! JSON error responses for the HTTP surface.

use std::any::Any;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::OpenClinicError;

const UPSTREAM_FAILURE: &str =
    "Unable to retrieve medicine information at this time. Please try again later.";
const UPSTREAM_FAILURE_DETAILS: &str = "Our medical database service is temporarily unavailable.";
const ENDPOINT_NOT_FOUND: &str = "Endpoint not found";
const INTERNAL_SERVER_ERROR: &str = "Internal server error";

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl ErrorBody {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            suggestions: None,
        }
    }
}

/// Wraps a lookup error so handlers can return it directly.
#[derive(Debug)]
pub struct ApiError(pub OpenClinicError);

impl From<OpenClinicError> for ApiError {
    fn from(err: OpenClinicError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            OpenClinicError::InvalidInput(message) => {
                (StatusCode::BAD_REQUEST, ErrorBody::message(message.as_str()))
            }
            OpenClinicError::ServiceUnavailable(message) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody::message(message.as_str()),
            ),
            OpenClinicError::NotFound { suggestions, .. } => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: self.0.to_string(),
                    details: None,
                    suggestions: Some(suggestions.clone()),
                },
            ),
            other => {
                tracing::error!(error = %other, "Error fetching medicine data");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: UPSTREAM_FAILURE.to_string(),
                        details: Some(UPSTREAM_FAILURE_DETAILS.to_string()),
                        suggestions: None,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub(crate) async fn endpoint_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::message(ENDPOINT_NOT_FOUND)),
    )
        .into_response()
}

pub(crate) fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(detail, "Server error");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::message(INTERNAL_SERVER_ERROR)),
    )
        .into_response()
}
