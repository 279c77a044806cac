use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use bookings_core::session::SessionError;

use crate::form_body::FormBodyError;
use crate::render::RenderError;

const ERROR_PAGE: &str = "<!doctype html><html><head><meta charset=\"utf-8\"><title>Error</title></head><body>\
<h1>Something went wrong</h1>\
<p>We could not process your request. Please try again later.</p>\
<p><a href=\"/\">Back to home</a></p>\
</body></html>";

/// Request-level failures. Validation failures and session misses are not
/// errors; handlers turn those into ordinary pages or redirects.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Malformed form submission: {0}")]
    FormParse(#[from] FormBodyError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::FormParse(msg) => tracing::error!("Failed to parse form: {}", msg),
            AppError::Render(err) => tracing::error!("Render failure: {}", err),
            AppError::Session(err) => tracing::error!("Session failure: {}", err),
            AppError::Internal(err) => tracing::error!("Internal Server Error: {:#}", err),
        }

        (StatusCode::INTERNAL_SERVER_ERROR, Html(ERROR_PAGE)).into_response()
    }
}
