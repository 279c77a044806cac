use std::sync::Arc;
use bookings_core::repository::RoomRepository;
use bookings_core::session::SessionStore;
use crate::render::TemplateRenderer;

#[derive(Clone)]
pub struct SessionSettings {
    pub cookie_name: String,
    pub lifetime_seconds: u64,
    /// Only send the cookie over HTTPS.
    pub secure: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub rooms: Arc<dyn RoomRepository>,
    pub renderer: Arc<TemplateRenderer>,
    pub session: SessionSettings,
    pub static_dir: String,
}
