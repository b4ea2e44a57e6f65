use chrono::{DateTime, TimeDelta, Utc};
use estate_env::Environment;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::{constant::ADMIN_ROLE, error::EstateAuthError};

/// Everything needed to issue and check admin tokens
#[derive(Clone)]
pub struct JwtValidationArgs {
    issuer: String,
    secret: String,
    ttl: TimeDelta,
    environment: Environment,
}

impl std::fmt::Debug for JwtValidationArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtValidationArgs")
            .field("issuer", &self.issuer)
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .field("environment", &self.environment)
            .finish()
    }
}

impl JwtValidationArgs {
    pub fn new(
        issuer: impl Into<String>,
        secret: impl Into<String>,
        ttl: TimeDelta,
        environment: Environment,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            secret: secret.into(),
            ttl,
            environment,
        }
    }

    /// The environment decides which cookie name is read
    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }
}

#[derive(serde::Serialize, serde::Deserialize, Eq, PartialEq, Debug, Clone)]
pub struct AdminClaims {
    /// The admin email
    pub sub: String,
    /// Who issued the token
    pub iss: String,
    /// Expiry as a unix timestamp
    pub exp: i64,
    /// Issue time as a unix timestamp
    pub iat: i64,
    pub role: String,
}

/// A freshly signed token and the moment it stops being accepted
#[derive(serde::Serialize, Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[tracing::instrument(skip(args))]
pub fn issue_admin_token(
    email: &str,
    args: &JwtValidationArgs,
) -> Result<IssuedToken, EstateAuthError> {
    let now = Utc::now();
    let expires_at = now + args.ttl;
    let claims = AdminClaims {
        sub: email.to_string(),
        iss: args.issuer.clone(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
        role: ADMIN_ROLE.to_string(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(args.secret.as_bytes()),
    )?;

    Ok(IssuedToken { token, expires_at })
}

pub fn validate_admin_token(
    token: &str,
    args: &JwtValidationArgs,
) -> Result<AdminClaims, EstateAuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[args.issuer.as_str()]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let claims = match decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(args.secret.as_bytes()),
        &validation,
    ) {
        Ok(decoded) => decoded.claims,
        Err(e) => match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                return Err(EstateAuthError::JwtExpired);
            }
            _ => {
                return Err(EstateAuthError::JwtValidationFailed {
                    details: e.to_string(),
                });
            }
        },
    };

    if claims.role != ADMIN_ROLE {
        return Err(EstateAuthError::JwtValidationFailed {
            details: format!("unexpected role {}", claims.role),
        });
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    fn args(issuer: &str, secret: &str) -> JwtValidationArgs {
        JwtValidationArgs::new(issuer, secret, TimeDelta::hours(1), Environment::Local)
    }

    fn sign(claims: &AdminClaims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("Failed to create test JWT")
    }

    #[test]
    fn test_issue_then_validate() -> anyhow::Result<()> {
        let args = args("estate", "super_secret_key");

        let issued = issue_admin_token("admin@estate.test", &args)?;
        let claims = validate_admin_token(&issued.token, &args)?;

        assert_eq!(claims.sub, "admin@estate.test");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp, issued.expires_at.timestamp());

        Ok(())
    }

    #[test]
    fn test_wrong_secret() -> anyhow::Result<()> {
        let issued = issue_admin_token("admin@estate.test", &args("estate", "one"))?;

        let err = validate_admin_token(&issued.token, &args("estate", "two"))
            .err()
            .context("expected error")?;

        assert_eq!(err.to_string(), "jwt validation failed: InvalidSignature");
        Ok(())
    }

    #[test]
    fn test_wrong_issuer() -> anyhow::Result<()> {
        let issued = issue_admin_token("admin@estate.test", &args("somebody", "key"))?;

        let err = validate_admin_token(&issued.token, &args("estate", "key"))
            .err()
            .context("expected error")?;

        assert_eq!(err.to_string(), "jwt validation failed: InvalidIssuer");
        Ok(())
    }

    #[test]
    fn test_expired() -> anyhow::Result<()> {
        let now = Utc::now().timestamp();
        let token = sign(
            &AdminClaims {
                sub: "admin@estate.test".to_string(),
                iss: "estate".to_string(),
                exp: now - 10_000,
                iat: now - 20_000,
                role: "admin".to_string(),
            },
            "key",
        );

        let err = validate_admin_token(&token, &args("estate", "key"))
            .err()
            .context("expected error")?;

        assert_eq!(err.to_string(), "jwt is expired");
        Ok(())
    }

    #[test]
    fn test_non_admin_role() -> anyhow::Result<()> {
        let now = Utc::now().timestamp();
        let token = sign(
            &AdminClaims {
                sub: "visitor@estate.test".to_string(),
                iss: "estate".to_string(),
                exp: now + 600,
                iat: now,
                role: "visitor".to_string(),
            },
            "key",
        );

        let err = validate_admin_token(&token, &args("estate", "key"))
            .err()
            .context("expected error")?;

        assert!(matches!(err, EstateAuthError::JwtValidationFailed { .. }));
        Ok(())
    }

    #[test]
    fn test_signing_errors_keep_their_source() {
        let err = EstateAuthError::from(jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::InvalidKeyFormat,
        ));

        assert!(matches!(err, EstateAuthError::TokenSigning(_)));
        assert_eq!(err.to_string(), "unable to sign admin token");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_debug_hides_secret() {
        let rendered = format!("{:?}", args("estate", "hunter2"));
        assert!(!rendered.contains("hunter2"));
    }
}
