use axum::{extract::State, Json};
use folio_authz::{AuthError, TokenKind, TokenPair};
use folio_http::{AppError, ValidatedJson};

use super::{
    models::{Credentials, RefreshRequest, SignupResponse},
    AuthState,
};

pub async fn signup(
    State(state): State<AuthState>,
    ValidatedJson(credentials): ValidatedJson<Credentials>,
) -> Result<Json<SignupResponse>, AppError> {
    let hash = state.hasher.hash(&credentials.password).await?;
    state.users.create(&credentials.username, &hash).await?;

    tracing::info!(username = %credentials.username, "user registered");
    Ok(Json(SignupResponse::registered(&credentials.username)))
}

pub async fn login(
    State(state): State<AuthState>,
    ValidatedJson(credentials): ValidatedJson<Credentials>,
) -> Result<Json<TokenPair>, AppError> {
    let Some(hash) = state.users.password_hash(&credentials.username).await? else {
        state.hasher.verify_absent(&credentials.password).await?;
        tracing::debug!(username = %credentials.username, "login for unknown user");
        return Err(AuthError::BadCredentials.into());
    };

    if !state.hasher.verify(&credentials.password, &hash).await? {
        tracing::debug!(username = %credentials.username, "login with wrong password");
        return Err(AuthError::BadCredentials.into());
    }

    let pair = state.tokens.issue_pair(&credentials.username)?;
    tracing::info!(username = %credentials.username, "user logged in");
    Ok(Json(pair))
}

/// Trade a refresh token for a new access token; the refresh token is handed back unchanged
pub async fn refresh(
    State(state): State<AuthState>,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let claims = state.tokens.validate_refresh(&request.refresh_token)?;
    if !state.users.exists(&claims.sub).await? {
        return Err(AuthError::UnknownSubject.into());
    }

    let token = state.tokens.issue(&claims.sub, TokenKind::Access)?;
    Ok(Json(TokenPair {
        token,
        refresh_token: request.refresh_token,
    }))
}
