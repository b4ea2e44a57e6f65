use axum::extract::FromRef;
use estate_auth::{credentials::AdminCredentials, token::JwtValidationArgs};
use std::sync::Arc;

use crate::config::Config;

#[derive(Clone, FromRef)]
pub struct ApiContext {
    pub jwt_args: JwtValidationArgs,
    /// The admin account allowed to log into the dashboard
    pub admin_credentials: AdminCredentials,
    pub config: Arc<Config>,
}
