//! Placeholder login.
//!
//! There is no backend authentication yet: any non-empty email/password pair
//! is accepted and the role is derived from the email. Nothing here is a
//! security boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StorageError;

/// Storage key holding the logged-in session.
pub const SESSION_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Informe e-mail e senha")]
    MissingCredentials,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Login form input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The logged-in user, persisted under [`SESSION_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl UserSession {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Maps credentials to a session.
///
/// Emails containing `admin` get the admin role. The display name is the
/// local part of the email.
pub fn login(credentials: &Credentials) -> Result<UserSession, AuthError> {
    let email = credentials.email.trim();
    if email.is_empty() || credentials.password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    let role = if email.contains("admin") {
        Role::Admin
    } else {
        Role::User
    };
    let name = email.split('@').next().unwrap_or(email).to_string();

    Ok(UserSession {
        name,
        email: email.to_string(),
        role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_login() {
        let session = login(&Credentials::new("joana@example.com", "segredo")).unwrap();
        assert_eq!(session.name, "joana");
        assert_eq!(session.email, "joana@example.com");
        assert_eq!(session.role, Role::User);
        assert!(!session.is_admin());
    }

    #[test]
    fn admin_email_gets_admin_role() {
        let session = login(&Credentials::new("admin@loja.com", "x")).unwrap();
        assert!(session.is_admin());
        assert_eq!(session.name, "admin");
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert!(matches!(
            login(&Credentials::new("  ", "x")),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            login(&Credentials::new("a@b.com", "")),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn email_without_at_uses_whole_email_as_name() {
        let session = login(&Credentials::new("joaquim", "x")).unwrap();
        assert_eq!(session.name, "joaquim");
    }

    #[test]
    fn session_json_shape() {
        let session = UserSession {
            name: "admin".to_string(),
            email: "admin@loja.com".to_string(),
            role: Role::Admin,
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["role"], "admin");
        let back: UserSession = serde_json::from_value(json).unwrap();
        assert_eq!(back, session);
    }
}
