//! Session and registration models.

use serde::{Deserialize, Serialize};

use super::UserId;

/// Body of `POST /login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl core::fmt::Debug for LoginRequest {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /register`.
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    /// Full name, at least two words.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl core::fmt::Debug for RegisterRequest {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `GET /auth/status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether the session cookie is valid.
    #[serde(default)]
    pub authenticated: bool,
    /// Logged-in user, when authenticated.
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// Body of `GET /me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Account email.
    pub email: String,
    /// Full name, when the backend includes it.
    #[serde(default)]
    pub name: Option<String>,
}

/// Generic `{success, message}` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Whether the operation succeeded.
    #[serde(default)]
    pub success: bool,
    /// Optional human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// User the operation applied to, for login responses.
    #[serde(default)]
    pub user_id: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_debug_hides_password() {
        let request = LoginRequest {
            email: "a@b.co".to_owned(),
            password: "Secret1!".to_owned(),
        };
        let debug = format!("{request:?}");
        assert!(debug.contains("a@b.co"));
        assert!(!debug.contains("Secret1!"));
    }

    #[test]
    fn register_debug_hides_password() {
        let request = RegisterRequest {
            name: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            password: "Secret1!".to_owned(),
        };
        assert!(!format!("{request:?}").contains("Secret1!"));
    }

    #[test]
    fn auth_status_defaults() {
        let status: AuthStatus = serde_json::from_str(r#"{"authenticated": false}"#).unwrap();
        assert!(!status.authenticated);
        assert_eq!(status.user_id, None);

        let status: AuthStatus =
            serde_json::from_str(r#"{"authenticated": true, "user_id": 9}"#).unwrap();
        assert_eq!(status.user_id, Some(UserId::new(9)));
    }

    #[test]
    fn login_response() {
        let message: ApiMessage = serde_json::from_str(
            r#"{"success": true, "user_id": 3, "message": "Login successful"}"#,
        )
        .unwrap();
        assert!(message.success);
        assert_eq!(message.user_id, Some(UserId::new(3)));
    }
}
