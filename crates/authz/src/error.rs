use folio_http::{field_error, AppError};

use crate::token::TokenKind;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("bad credentials")]
    BadCredentials,

    #[error("missing bearer token")]
    MissingToken,

    #[error("token expired")]
    Expired,

    #[error("invalid token")]
    InvalidToken,

    #[error("expected {expected} token")]
    WrongKind { expected: TokenKind },

    #[error("token subject no longer exists")]
    UnknownSubject,

    #[error("password must be at most {max} bytes")]
    PasswordTooLong { max: usize },

    #[error("signing secret must be at least {min} bytes")]
    WeakSecret { min: usize },

    #[error("token encoding failed: {0}")]
    Encoding(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Directory(#[from] anyhow::Error),
}

impl AuthError {
    /// True for failures caused by the caller's credentials rather than the service
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::BadCredentials
                | AuthError::MissingToken
                | AuthError::Expired
                | AuthError::InvalidToken
                | AuthError::WrongKind { .. }
                | AuthError::UnknownSubject
        )
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::InvalidToken,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        if let AuthError::PasswordTooLong { max } = err {
            AppError::validation(
                vec![field_error("password", format!("must be at most {} bytes", max))],
                "request validation failed",
            )
        } else if err.is_rejection() {
            AppError::unauthorized(err.to_string())
        } else {
            AppError::Internal(anyhow::Error::new(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn credential_failures_map_to_unauthorized() {
        let err: AppError = AuthError::WrongKind {
            expected: TokenKind::Access,
        }
        .into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "unauthorized: expected access token");
    }

    #[test]
    fn over_long_password_maps_to_validation() {
        let err: AppError = AuthError::PasswordTooLong { max: 72 }.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, AppError::Validation { ref details, .. } if details[0]["field"] == "password"));
    }

    #[test]
    fn service_failures_map_to_internal() {
        let err: AppError = AuthError::Hashing("cost out of range".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
