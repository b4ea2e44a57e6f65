use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    error::EstateAuthError,
    headers::extract_admin_token_from_request_headers,
    token::{JwtValidationArgs, validate_admin_token},
};

/// The authenticated admin, available to handlers behind [handler] as an extension
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminContext {
    pub email: String,
}

#[derive(serde::Serialize)]
struct ErrorResponse<'a> {
    message: &'a str,
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(ErrorResponse { message })).into_response()
}

/// Rejects the request with a 401 unless it carries a valid admin token.
/// On success the [AdminContext] is attached to the request.
pub async fn handler(
    State(jwt_validation_args): State<JwtValidationArgs>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_admin_token_from_request_headers(
        req.headers(),
        jwt_validation_args.environment(),
    )
    .map_err(|e| {
        tracing::trace!(error=?e, "unable to get admin token");
        unauthorized("unauthorized")
    })?;

    let claims = validate_admin_token(&token, &jwt_validation_args).map_err(|e| match e {
        EstateAuthError::JwtExpired => unauthorized("jwt expired"),
        _ => {
            tracing::warn!(error=?e, "rejected admin token");
            unauthorized("unauthorized")
        }
    })?;

    req.extensions_mut().insert(AdminContext { email: claims.sub });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension, Router,
        body::Body,
        http::{Request, header},
        middleware::from_fn_with_state,
        routing::get,
    };
    use chrono::TimeDelta;
    use estate_env::Environment;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::util::ServiceExt;

    use super::*;
    use crate::token::issue_admin_token;

    fn args() -> JwtValidationArgs {
        JwtValidationArgs::new("estate", "secret", TimeDelta::minutes(5), Environment::Local)
    }

    fn router() -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|Extension(ctx): Extension<AdminContext>| async move { ctx.email }),
            )
            .layer(from_fn_with_state(args(), handler))
    }

    async fn body_json(res: Response) -> Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(bytes.as_ref()).unwrap()
    }

    #[tokio::test]
    async fn it_should_reject_missing_token() {
        let res = router()
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(res).await, json!({ "message": "unauthorized" }));
    }

    #[tokio::test]
    async fn it_should_reject_tampered_token() {
        let issued = issue_admin_token("admin@estate.test", &args()).unwrap();
        let res = router()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, format!("Bearer {}x", issued.token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn it_should_attach_admin_context() {
        let issued = issue_admin_token("admin@estate.test", &args()).unwrap();
        let res = router()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::COOKIE, format!("dev-estate-admin-token={}", issued.token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes.as_ref(), b"admin@estate.test");
    }
}
