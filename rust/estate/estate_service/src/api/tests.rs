use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::TimeDelta;
use estate_auth::{credentials::AdminCredentials, token::JwtValidationArgs};
use homepage::{
    domain::{model::FeaturedSetPolicy, service::HomepageServiceImpl},
    outbound::memory::InMemoryListings,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::util::ServiceExt;

use super::*;
use crate::config::{Config, Environment};

const EMAIL: &str = "admin@estate.test";
const PASSWORD: &str = "correct horse";

fn context() -> ApiContext {
    let config = Config {
        database_url: "postgres://unused".to_string(),
        port: 0,
        environment: Environment::Local,
        jwt_issuer: "estate".to_string(),
        jwt_secret: "secret".to_string(),
        admin_email: EMAIL.to_string(),
        admin_password: PASSWORD.to_string(),
        admin_token_ttl: TimeDelta::minutes(10),
        featured_policy: FeaturedSetPolicy::default(),
    };
    ApiContext {
        jwt_args: JwtValidationArgs::new(
            config.jwt_issuer.clone(),
            config.jwt_secret.clone(),
            config.admin_token_ttl,
            config.environment,
        ),
        admin_credentials: AdminCredentials::new(EMAIL, PASSWORD),
        config: Arc::new(config),
    }
}

fn app() -> Router {
    let store = InMemoryListings::new();
    api_router(
        context(),
        HomepageServiceImpl::new(store.clone(), store, FeaturedSetPolicy::default()),
    )
    .merge(health::router())
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(bytes.as_ref()).unwrap()
}

async fn login(app: &Router) -> String {
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "email": EMAIL, "password": PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("dev-estate-admin-token="));
    assert!(cookie.contains("HttpOnly"));
    body_json(res).await["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn it_should_serve_health() {
    let res = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn it_should_reject_bad_credentials() {
    let res = app()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "email": EMAIL, "password": "wrong" }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(res).await,
        json!({ "message": "invalid credentials" })
    );
}

#[tokio::test]
async fn it_should_guard_admin_routes() {
    let res = app()
        .oneshot(json_request(
            "POST",
            "/admin/properties",
            None,
            json!({ "title": "Loft", "price": 1 }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn it_should_let_the_admin_curate_the_homepage() {
    let app = app();
    let token = login(&app).await;

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/auth/verify")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(res).await, json!({ "email": EMAIL }));

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/admin/blogs",
            Some(&token),
            json!({ "title": "Spring market", "author": "Jo" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = body_json(res).await["id"].as_str().unwrap().to_string();

    let res = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/admin/blogs/{id}/homepage"),
            Some(&token),
            json!({ "is_on_home_page": true }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .oneshot(Request::builder().uri("/homepage").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let homepage = body_json(res).await;
    assert_eq!(homepage["blogs"][0]["id"], json!(id));
}

#[tokio::test]
async fn it_should_clear_the_cookie_on_logout() {
    let res = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let cookie = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.contains("Max-Age=0"));
}

#[test]
fn it_should_build_the_openapi_document() {
    let doc = swagger::ApiDoc::openapi();
    assert!(doc.paths.paths.contains_key("/admin/properties/{id}/homepage"));
    assert!(doc.paths.paths.contains_key("/homepage"));
}
