use cookie::Cookie;
use estate_env::Environment;

use crate::{constant::ADMIN_TOKEN_COOKIE, error::EstateAuthError};

/// Name of the admin token cookie for the given environment.
/// Outside of production the cookie is prefixed with `dev-` so a browser
/// logged into both never mixes them up.
pub fn admin_token_cookie_name(environment: Environment) -> String {
    match environment {
        Environment::Production => ADMIN_TOKEN_COOKIE.to_string(),
        Environment::Local | Environment::Develop => format!("dev-{ADMIN_TOKEN_COOKIE}"),
    }
}

/// Pulls the admin token out of the Authorization header, falling back to the cookie
pub fn extract_admin_token_from_request_headers(
    headers: &axum::http::HeaderMap,
    environment: Environment,
) -> Result<String, EstateAuthError> {
    let auth_token_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    if let Some(auth_token) = auth_token_header {
        tracing::trace!("Authorization header provided");
        return match auth_token.strip_prefix("Bearer ") {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(EstateAuthError::InvalidAuthorizationHeaderFormat),
        };
    }

    tracing::trace!("no Authorization header provided. checking for cookie");
    let cookie_name = admin_token_cookie_name(environment);
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|header| header.split(';'))
        .find_map(|cookie| {
            let cookie = Cookie::parse(cookie.trim()).ok()?;
            (cookie.name() == cookie_name).then(|| cookie.value().to_owned())
        })
        .ok_or(EstateAuthError::NoAccessTokenProvided)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header};

    use super::*;

    #[test]
    fn bearer_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("estate-admin-token=from-cookie"),
        );

        let token = extract_admin_token_from_request_headers(&headers, Environment::Production)
            .unwrap();
        assert_eq!(token, "abc");
    }

    #[test]
    fn malformed_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Token abc"));

        let err = extract_admin_token_from_request_headers(&headers, Environment::Production)
            .unwrap_err();
        assert!(matches!(
            err,
            EstateAuthError::InvalidAuthorizationHeaderFormat
        ));
    }

    #[test]
    fn cookie_name_depends_on_environment() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; dev-estate-admin-token=dev-token"),
        );

        let token =
            extract_admin_token_from_request_headers(&headers, Environment::Local).unwrap();
        assert_eq!(token, "dev-token");

        let err = extract_admin_token_from_request_headers(&headers, Environment::Production)
            .unwrap_err();
        assert!(matches!(err, EstateAuthError::NoAccessTokenProvided));
    }

    #[test]
    fn no_token_at_all() {
        let err = extract_admin_token_from_request_headers(&HeaderMap::new(), Environment::Develop)
            .unwrap_err();
        assert!(matches!(err, EstateAuthError::NoAccessTokenProvided));
    }
}
