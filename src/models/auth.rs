//! Authentication payload types for the collection API.

use serde::{Deserialize, Serialize};

/// Response body from `POST /auth/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// The authenticated user, as returned by `GET /users/me`.
///
/// Identity is convenience data for display; authorization correctness
/// depends only on the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_parses() {
        let json = r#"{"access_token": "eyJhbGciOi.abc.def", "token_type": "bearer"}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "eyJhbGciOi.abc.def");
        assert_eq!(token.token_type, "bearer");
    }

    #[test]
    fn test_user_identity_parses_without_email() {
        let json = r#"{"id": 7, "username": "jace", "is_active": true}"#;
        let user: UserIdentity = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "jace");
        assert_eq!(user.email, None);
        assert!(user.is_active);
    }

    #[test]
    fn test_new_user_omits_missing_email() {
        let user = NewUser {
            username: "liliana".to_string(),
            email: None,
            password: "hunter2".to_string(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("email"));
        assert!(json.contains("\"username\":\"liliana\""));
    }
}
