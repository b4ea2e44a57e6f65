//! Inbound adapters, the ways the outside world reaches the homepage domain

pub mod axum_router;
