use std::fmt;

use folio_authz::MAX_PASSWORD_BYTES;
use folio_http::{field_error, Validate};
use serde::{Deserialize, Serialize};

/// Username and password, as posted to `/signup` and `/login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Validate for Credentials {
    fn validate(&self) -> Vec<serde_json::Value> {
        let mut details = Vec::new();
        if self.username.trim().is_empty() {
            details.push(field_error("username", "must not be blank"));
        }
        if self.password.trim().is_empty() {
            details.push(field_error("password", "must not be blank"));
        } else if self.password.len() > MAX_PASSWORD_BYTES {
            details.push(field_error(
                "password",
                format!("must be at most {} bytes", MAX_PASSWORD_BYTES),
            ));
        }
        details
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl Validate for RefreshRequest {
    fn validate(&self) -> Vec<serde_json::Value> {
        if self.refresh_token.trim().is_empty() {
            vec![field_error("refreshToken", "must not be blank")]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    pub username: String,
    pub message: String,
}

impl SignupResponse {
    pub fn registered(username: &str) -> Self {
        Self {
            username: username.to_string(),
            message: format!(
                "User: {} registered successfully. Please login using the /login endpoint",
                username
            ),
        }
    }
}
