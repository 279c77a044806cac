use axum::Router;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod availability;
pub mod error;
pub mod form_body;
pub mod pages;
pub mod render;
pub mod reservations;
pub mod session;
pub mod state;

pub use state::{AppState, SessionSettings};

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(pages::routes())
        .merge(availability::routes())
        .merge(reservations::routes())
        .nest_service("/static", ServeDir::new(&state.static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    session::session_middleware,
                )),
        )
        .with_state(state)
}
