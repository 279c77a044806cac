use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Extension, Router,
};
use bookings_core::forms::ValidationResult;
use bookings_core::models::Reservation;
use bookings_core::reservation::{read_pending, submit_reservation, SubmissionOutcome};
use bookings_core::session::Session;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::AppError;
use crate::form_body::parse_form_body;
use crate::render::{render_page, TemplateData};
use crate::state::AppState;

pub const SUMMARY_PATH: &str = "/reservation-summary";
pub const MISSING_RESERVATION: &str = "Can't get reservation from session";

#[derive(Debug, Deserialize)]
pub struct ReservationQuery {
    pub room_id: Option<i32>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/make-reservation", get(reservation_form).post(post_reservation))
        .route(SUMMARY_PATH, get(reservation_summary))
}

/// GET /make-reservation
async fn reservation_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ReservationQuery>,
) -> Result<Response, AppError> {
    let data = TemplateData::default()
        .with_data("reservation", &Reservation::for_room(query.room_id))
        .with_form(ValidationResult::default());

    Ok(render_page(&state, &session, "make-reservation.page.html", data)
        .await?
        .into_response())
}

/// POST /make-reservation
/// Invalid input re-renders the form (200); valid input is staged in the
/// session and answered with 303 so a refresh cannot resubmit it. A body
/// that does not decode is a 500 and never reaches validation.
async fn post_reservation(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let fields = parse_form_body(&headers, &body)?;

    match submit_reservation(&session, fields).await? {
        SubmissionOutcome::Rejected { candidate, result } => {
            let data = TemplateData::default()
                .with_data("reservation", &candidate)
                .with_form(result);
            Ok(render_page(&state, &session, "make-reservation.page.html", data)
                .await?
                .into_response())
        }
        SubmissionOutcome::Accepted { .. } => Ok(Redirect::to(SUMMARY_PATH).into_response()),
    }
}

/// GET /reservation-summary
async fn reservation_summary(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response, AppError> {
    let Some(reservation) = read_pending(&session).await? else {
        warn!(session = session.id(), "No pending reservation in session");
        session.put("error", &MISSING_RESERVATION).await?;
        return Ok(Redirect::to("/").into_response());
    };

    let mut data = TemplateData::default().with_data("reservation", &reservation);

    if let Some(room_id) = reservation.room_id {
        match state.rooms.get_room(room_id).await.map_err(|e| anyhow::anyhow!(e))? {
            Some(room) => data = data.with_string("room_name", room.room_name),
            None => info!("Reservation refers to unknown room {}", room_id),
        }
    }

    Ok(render_page(&state, &session, "reservation-summary.page.html", data)
        .await?
        .into_response())
}
