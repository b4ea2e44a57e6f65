use axum::{
    Extension, Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use cookie::{Cookie, SameSite};
use estate_auth::{
    credentials::AdminCredentials,
    error::EstateAuthError,
    headers::admin_token_cookie_name,
    middleware::AdminContext,
    token::{JwtValidationArgs, issue_admin_token},
};
use estate_env::Environment;
use homepage::inbound::axum_router::ErrorResponse;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::api::context::ApiContext;

/// Routes that do not need a token
pub fn router() -> Router<ApiContext> {
    Router::new()
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
}

/// Routes that must sit behind the admin middleware
pub fn authenticated_router() -> Router<ApiContext> {
    Router::new().route("/verify", get(verify_handler))
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    pub email: String,
}

#[derive(Debug, Error)]
pub enum AuthHandlerErr {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("An internal server error has occurred")]
    Internal(EstateAuthError),
}

impl From<EstateAuthError> for AuthHandlerErr {
    fn from(err: EstateAuthError) -> Self {
        match err {
            EstateAuthError::InvalidCredentials => AuthHandlerErr::InvalidCredentials,
            err => AuthHandlerErr::Internal(err),
        }
    }
}

impl IntoResponse for AuthHandlerErr {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthHandlerErr::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthHandlerErr::Internal(e) => {
                tracing::error!(error=?e, "unable to issue admin token");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (
            status,
            Json(ErrorResponse {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

fn token_cookie(environment: Environment, value: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build((admin_token_cookie_name(environment), value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(environment == Environment::Production)
        .max_age(cookie::time::Duration::seconds(max_age_seconds))
        .build()
}

/// Exchanges the admin credentials for a token.
/// The token is returned in the body and also set as a cookie.
#[utoipa::path(
    post,
    operation_id = "login",
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, body = LoginResponse),
        (status = 401, body = ErrorResponse),
        (status = 500, body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all, fields(email = %req.email), err)]
pub async fn login_handler(
    State(admin_credentials): State<AdminCredentials>,
    State(jwt_args): State<JwtValidationArgs>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AuthHandlerErr> {
    admin_credentials.verify(&req.email, &req.password)?;

    let issued = issue_admin_token(admin_credentials.email(), &jwt_args)?;
    tracing::info!("admin logged in");

    let cookie = token_cookie(
        jwt_args.environment(),
        issued.token.clone(),
        jwt_args.ttl().num_seconds(),
    );

    Ok((
        [(header::SET_COOKIE, cookie.to_string())],
        Json(LoginResponse {
            token: issued.token,
            expires_at: issued.expires_at,
        }),
    )
        .into_response())
}

/// Clears the admin token cookie
#[utoipa::path(
    post,
    operation_id = "logout",
    path = "/auth/logout",
    responses(
        (status = 204),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout_handler(State(jwt_args): State<JwtValidationArgs>) -> Response {
    let cookie = token_cookie(jwt_args.environment(), String::new(), 0);
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, cookie.to_string())],
    )
        .into_response()
}

/// Returns the admin the presented token belongs to
#[utoipa::path(
    get,
    operation_id = "verify",
    path = "/auth/verify",
    responses(
        (status = 200, body = VerifyResponse),
        (status = 401, body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn verify_handler(Extension(admin): Extension<AdminContext>) -> Json<VerifyResponse> {
    Json(VerifyResponse { email: admin.email })
}
