use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use bookings_core::session::Session;
use uuid::Uuid;

use crate::state::{AppState, SessionSettings};

/// Binds each request to a visitor session. Visitors without a usable cookie
/// get a fresh random id, sent back as `Set-Cookie` on the response. The
/// cookie is also re-sent whenever the request stored something in the
/// session.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let existing = jar
        .get(&state.session.cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|id| Uuid::parse_str(id).is_ok());

    let (session_id, is_new) = match existing {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    };

    let session = Session::new(session_id.clone(), state.sessions.clone());
    req.extensions_mut().insert(session.clone());

    let response = next.run(req).await;

    if is_new || session.was_written() {
        if is_new {
            tracing::debug!("Issued session {}", session_id);
        }
        (jar.add(session_cookie(&state.session, session_id)), response).into_response()
    } else {
        response
    }
}

fn session_cookie(settings: &SessionSettings, session_id: String) -> Cookie<'static> {
    Cookie::build((settings.cookie_name.clone(), session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(settings.secure)
        .max_age(time::Duration::seconds(settings.lifetime_seconds as i64))
        .build()
}
