/// Game and subscription persistence contracts and backends.
pub mod game_store;
/// Persisted record definitions.
pub mod models;
/// Storage error taxonomy shared by every backend.
pub mod storage;
