use crate::error::EstateAuthError;

/// The single admin account configured for the dashboard
#[derive(Clone)]
pub struct AdminCredentials {
    email: String,
    password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AdminCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Checks a login attempt. Emails compare case insensitively.
    pub fn verify(&self, email: &str, password: &str) -> Result<(), EstateAuthError> {
        let email_matches = self.email.eq_ignore_ascii_case(email.trim());
        let password_matches = constant_time_eq(self.password.as_bytes(), password.as_bytes());
        if email_matches && password_matches {
            Ok(())
        } else {
            Err(EstateAuthError::InvalidCredentials)
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_configured_admin() {
        let creds = AdminCredentials::new("admin@estate.test", "correct horse");
        assert!(creds.verify("Admin@Estate.test ", "correct horse").is_ok());
    }

    #[test]
    fn verify_rejects_everything_else() {
        let creds = AdminCredentials::new("admin@estate.test", "correct horse");
        assert!(matches!(
            creds.verify("admin@estate.test", "correct horsE"),
            Err(EstateAuthError::InvalidCredentials)
        ));
        assert!(creds.verify("other@estate.test", "correct horse").is_err());
        assert!(creds.verify("admin@estate.test", "").is_err());
    }

    #[test]
    fn debug_hides_password() {
        let creds = AdminCredentials::new("admin@estate.test", "correct horse");
        assert!(!format!("{creds:?}").contains("horse"));
    }
}
