use crate::api::context::ApiContext;
use anyhow::Context;
use config::{Config, Environment};
use estate_auth::{credentials::AdminCredentials, token::JwtValidationArgs};
use estate_db_migrator::ESTATE_DB_MIGRATIONS;
use estate_entrypoint::EstateEntrypoint;
use homepage::{domain::service::HomepageServiceImpl, outbound::postgres::ListingsPgRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

mod api;
mod config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let tree_indent = std::env::var("TREE_TRACING_INDENT")
        .ok()
        .and_then(|v| v.parse().ok());
    EstateEntrypoint::default()
        .local()
        .tree_tracing(tree_indent)
        .build()
        .init()?;

    // Parse our configuration from the environment.
    let config = Config::from_env().context("expected to be able to generate config")?;

    tracing::info!(?config, "initialized config");

    let (min_connections, max_connections): (u32, u32) = match config.environment {
        Environment::Production => (5, 30),
        Environment::Develop => (3, 20),
        Environment::Local => (3, 10),
    };

    let db = PgPoolOptions::new()
        .min_connections(min_connections)
        .max_connections(max_connections)
        .connect(&config.database_url)
        .await
        .context("could not connect to listings db")?;

    tracing::info!(
        min_connections,
        max_connections,
        "initialized listings db connection"
    );

    ESTATE_DB_MIGRATIONS
        .run(&db)
        .await
        .context("could not run listings db migrations")?;

    tracing::info!("applied listings db migrations");

    let repo = ListingsPgRepo::new(db);
    let homepage_service = HomepageServiceImpl::new(repo.clone(), repo, config.featured_policy);

    let jwt_args = JwtValidationArgs::new(
        config.jwt_issuer.clone(),
        config.jwt_secret.clone(),
        config.admin_token_ttl,
        config.environment,
    );
    let admin_credentials = AdminCredentials::new(
        config.admin_email.clone(),
        config.admin_password.clone(),
    );

    api::setup_and_serve(
        ApiContext {
            jwt_args,
            admin_credentials,
            config: Arc::new(config),
        },
        homepage_service,
    )
    .await?;
    Ok(())
}
