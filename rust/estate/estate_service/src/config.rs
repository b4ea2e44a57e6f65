use anyhow::Context;
use chrono::TimeDelta;
use homepage::domain::model::{DEFAULT_BLOG_CAPACITY, DEFAULT_PROPERTY_CAPACITY, FeaturedSetPolicy};

pub use estate_env::Environment;

/// Configuration parameters for the application.
pub struct Config {
    /// The connection URL for the listings Postgres database
    pub database_url: String,
    /// The port to listen for HTTP requests on.
    pub port: u16,
    /// The environment we are in
    pub environment: Environment,
    /// The `iss` claim written into and required from admin tokens
    pub jwt_issuer: String,
    pub jwt_secret: String,
    pub admin_email: String,
    pub admin_password: String,
    /// How long an admin token stays valid
    pub admin_token_ttl: TimeDelta,
    /// How many items of each kind may be featured
    pub featured_policy: FeaturedSetPolicy,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("admin_email", &self.admin_email)
            .field("admin_token_ttl", &self.admin_token_ttl)
            .field("featured_policy", &self.featured_policy)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .with_context(|| format!("{name} must be provided"))
        };
        let parsed = |name: &str, default: u32| -> anyhow::Result<u32> {
            lookup(name)
                .map(|v| v.parse::<u32>())
                .transpose()
                .with_context(|| format!("{name} must be a non negative integer"))
                .map(|v| v.unwrap_or(default))
        };

        let database_url = required("DATABASE_URL")?;
        let port = lookup("PORT")
            .map(|v| v.parse::<u16>())
            .transpose()
            .context("PORT must be a valid port number")?
            .unwrap_or(8080);
        let environment = match lookup(estate_env::ENVIRONMENT_VAR) {
            Some(value) => value
                .parse::<Environment>()
                .context("ENVIRONMENT must be prod, dev or local")?,
            None => Environment::Production,
        };
        let jwt_issuer = lookup("JWT_ISSUER").unwrap_or_else(|| "estate".to_string());
        let jwt_secret = required("JWT_SECRET")?;
        let admin_email = required("ADMIN_EMAIL")?;
        let admin_password = required("ADMIN_PASSWORD")?;
        let admin_token_ttl =
            TimeDelta::seconds(i64::from(parsed("ADMIN_TOKEN_TTL_SECONDS", 86_400)?));
        let featured_policy = FeaturedSetPolicy::new(
            parsed("HOMEPAGE_PROPERTY_CAPACITY", DEFAULT_PROPERTY_CAPACITY)?,
            parsed("HOMEPAGE_BLOG_CAPACITY", DEFAULT_BLOG_CAPACITY)?,
        );

        Ok(Config {
            database_url,
            port,
            environment,
            jwt_issuer,
            jwt_secret,
            admin_email,
            admin_password,
            admin_token_ttl,
            featured_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("DATABASE_URL", "postgres://localhost/estate"),
        ("JWT_SECRET", "secret"),
        ("ADMIN_EMAIL", "admin@estate.test"),
        ("ADMIN_PASSWORD", "password"),
    ];

    #[test]
    fn defaults_apply() -> anyhow::Result<()> {
        let config = Config::from_lookup(lookup(&REQUIRED))?;

        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.jwt_issuer, "estate");
        assert_eq!(config.admin_token_ttl, TimeDelta::days(1));
        assert_eq!(config.featured_policy, FeaturedSetPolicy::default());
        Ok(())
    }

    #[test]
    fn overrides_are_read() -> anyhow::Result<()> {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("PORT", "9000"),
            ("ENVIRONMENT", "local"),
            ("HOMEPAGE_PROPERTY_CAPACITY", "6"),
            ("HOMEPAGE_BLOG_CAPACITY", "2"),
            ("ADMIN_TOKEN_TTL_SECONDS", "60"),
        ]);

        let config = Config::from_lookup(lookup(&vars))?;

        assert_eq!(config.port, 9000);
        assert_eq!(config.environment, Environment::Local);
        assert_eq!(config.featured_policy, FeaturedSetPolicy::new(6, 2));
        assert_eq!(config.admin_token_ttl, TimeDelta::seconds(60));
        Ok(())
    }

    #[test]
    fn missing_secret_is_an_error() {
        let vars: Vec<_> = REQUIRED
            .into_iter()
            .filter(|(k, _)| *k != "JWT_SECRET")
            .collect();

        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err.to_string(), "JWT_SECRET must be provided");
    }

    #[test]
    fn bad_capacity_is_an_error() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("HOMEPAGE_BLOG_CAPACITY", "three"));

        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }
}
