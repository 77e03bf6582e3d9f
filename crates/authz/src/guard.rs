//! Bearer-token guard for protected routes.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use folio_http::AppError;

use crate::{
    error::AuthError,
    token::{Claims, TokenService, UserDirectory},
};

/// Validates access tokens against the token service and the user directory.
#[derive(Clone)]
pub struct Authenticator {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserDirectory>,
}

impl Authenticator {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserDirectory>) -> Self {
        Self { tokens, users }
    }

    /// Validate the `Authorization: Bearer <token>` header of a request
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
        self.tokens.validate_access(token, self.users.as_ref()).await
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Caller identity established from a valid access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    Authenticator: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authenticator = Authenticator::from_ref(state);

        match authenticator.authenticate(&parts.headers).await {
            Ok(claims) => Ok(AuthUser {
                username: claims.sub,
            }),
            Err(err) => {
                tracing::debug!(error = %err, path = %parts.uri.path(), "access token rejected");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{
        tests::{service, StaticDirectory},
        TokenKind,
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn authenticator() -> Authenticator {
        Authenticator::new(
            Arc::new(service()),
            Arc::new(StaticDirectory::with(&["alice"])),
        )
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|user: AuthUser| async move { user.username }),
            )
            .with_state(authenticator())
    }

    async fn call(authorization: Option<String>) -> StatusCode {
        let mut request = Request::get("/whoami");
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        app()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn parses_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn valid_access_token_passes() {
        let token = service().issue("alice", TokenKind::Access).unwrap();
        assert_eq!(call(Some(format!("Bearer {token}"))).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        assert_eq!(call(None).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn refresh_token_is_unauthorized() {
        let token = service().issue("alice", TokenKind::Refresh).unwrap();
        assert_eq!(
            call(Some(format!("Bearer {token}"))).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn unknown_subject_is_unauthorized() {
        let token = service().issue("mallory", TokenKind::Access).unwrap();
        assert_eq!(
            call(Some(format!("Bearer {token}"))).await,
            StatusCode::UNAUTHORIZED
        );
    }
}
