use axum::{
    extract::{ConnectInfo, Request, State},
    response::Html,
    routing::get,
    Extension, Router,
};
use bookings_core::session::Session;
use std::net::SocketAddr;

use crate::error::AppError;
use crate::render::{render_page, TemplateData};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/generals-quarters", get(generals))
        .route("/majors-suite", get(majors))
        .route("/contact", get(contact))
}

/// GET /
/// Remembers the visitor's address for the about page.
async fn home(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    req: Request,
) -> Result<Html<String>, AppError> {
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default();
    session.put("remote_ip", &remote_ip).await?;

    render_page(&state, &session, "home.page.html", TemplateData::default()).await
}

/// GET /about
async fn about(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, AppError> {
    let remote_ip = session.get_string("remote_ip").await?;
    let data = TemplateData::default()
        .with_string("test", "hello again")
        .with_string("remote_ip", remote_ip);

    render_page(&state, &session, "about.page.html", data).await
}

async fn generals(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, AppError> {
    render_page(&state, &session, "generals.page.html", TemplateData::default()).await
}

async fn majors(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, AppError> {
    render_page(&state, &session, "majors.page.html", TemplateData::default()).await
}

async fn contact(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, AppError> {
    render_page(&state, &session, "contact.page.html", TemplateData::default()).await
}
