use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::Html,
    routing::{get, post},
    Extension, Json, Router,
};
use bookings_core::session::Session;
use serde::Serialize;

use crate::error::AppError;
use crate::form_body::parse_form_body;
use crate::render::{render_page, TemplateData};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub ok: bool,
    pub message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/search-availability", get(availability).post(post_availability))
        .route("/search-availability-json", post(availability_json))
}

/// GET /search-availability
async fn availability(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, AppError> {
    render_page(&state, &session, "search-availability.page.html", TemplateData::default()).await
}

/// POST /search-availability
async fn post_availability(headers: HeaderMap, body: Bytes) -> Result<String, AppError> {
    let fields = parse_form_body(&headers, &body)?;
    let field = |name: &str| fields.get(name).map(String::as_str).unwrap_or("");
    Ok(format!("start date is {} end date is {}", field("start"), field("end")))
}

/// POST /search-availability-json
/// Stub: every range is reported as available.
async fn availability_json() -> Json<AvailabilityResponse> {
    Json(AvailabilityResponse {
        ok: true,
        message: "available".to_string(),
    })
}
