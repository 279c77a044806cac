use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bookings_api::{app, render::TemplateRenderer, AppState, SessionSettings};
use bookings_core::repository::{InMemoryRoomRepository, RoomRepository};
use bookings_core::session::{MemorySessionStore, SessionStore};
use bookings_store::{app_config::Config, DbClient, RedisSessionStore, StoreRoomRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookings_api=debug,bookings_core=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting bookings site on port {}", config.server.port);

    let sessions: Arc<dyn SessionStore> = match &config.redis {
        Some(redis) => {
            let store = RedisSessionStore::new(&redis.url, config.session.lifetime_seconds)
                .await
                .context("Failed to connect to Redis")?;
            tracing::info!("Sessions stored in Redis");
            Arc::new(store)
        }
        None => {
            tracing::warn!("No redis configured, sessions are kept in process memory");
            let store = Arc::new(MemorySessionStore::new(Duration::from_secs(
                config.session.lifetime_seconds,
            )));
            store.spawn_sweeper(SESSION_SWEEP_INTERVAL);
            store as Arc<dyn SessionStore>
        }
    };

    let rooms: Arc<dyn RoomRepository> = match &config.database {
        Some(database) => {
            let db = DbClient::new(database)
                .await
                .context("Failed to connect to database")?;
            db.migrate().await.context("Failed to run migrations")?;
            Arc::new(StoreRoomRepository::new(db.pool.clone()))
        }
        None => {
            tracing::warn!("No database configured, using built-in room list");
            Arc::new(InMemoryRoomRepository::with_default_rooms())
        }
    };

    let room_count = rooms.list_rooms().await.map_err(|e| anyhow::anyhow!(e))?.len();
    tracing::info!("{} rooms on offer", room_count);

    let renderer = TemplateRenderer::new(&config.templates.dir, config.templates.use_cache)
        .context("Failed to create template cache")?;

    let app_state = AppState {
        sessions,
        rooms,
        renderer: Arc::new(renderer),
        session: SessionSettings {
            cookie_name: config.session.cookie_name.clone(),
            lifetime_seconds: config.session.lifetime_seconds,
            secure: config.server.in_production,
        },
        static_dir: config.static_files.dir.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>()
    ).await?;

    Ok(())
}
