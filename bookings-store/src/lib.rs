pub mod app_config;
pub mod database;
pub mod redis_repo;
pub mod room_repo;

pub use database::DbClient;
pub use redis_repo::RedisSessionStore;
pub use room_repo::StoreRoomRepository;
