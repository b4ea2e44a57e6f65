#[derive(thiserror::Error, Debug)]
pub enum EstateAuthError {
    #[error("invalid Authorization header format")]
    InvalidAuthorizationHeaderFormat,
    #[error("no access token provided")]
    NoAccessTokenProvided,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("jwt validation failed: {details}")]
    JwtValidationFailed { details: String },
    #[error("jwt is expired")]
    JwtExpired,
    #[error("unable to sign admin token")]
    TokenSigning(#[from] jsonwebtoken::errors::Error),
}
