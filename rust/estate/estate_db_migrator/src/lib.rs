//! Exposes the statically embedded sql migrations for the listings database.
//!
//! Kept apart from the service crates so tests can run migrations without pulling in axum.
pub static ESTATE_DB_MIGRATIONS: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
