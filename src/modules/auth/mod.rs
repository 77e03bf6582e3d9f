pub mod handlers;
pub mod models;
pub mod store;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::{routing::post, Router};
use folio_authz::{PasswordHasher, TokenService};
use folio_kernel::{settings::AuthSettings, InitCtx, Migration, Module};
use serde_json::json;

use store::UserStore;

pub(crate) const MIGRATION_001: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        username      TEXT PRIMARY KEY NOT NULL,
        password_hash TEXT NOT NULL,
        created_at    TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Shared state for the auth handlers
#[derive(Clone)]
pub struct AuthState {
    pub users: UserStore,
    pub hasher: PasswordHasher,
    pub tokens: Arc<TokenService>,
}

/// Build the token service from the `[auth]` settings
pub fn token_service(settings: &AuthSettings) -> anyhow::Result<TokenService> {
    TokenService::new(
        &settings.jwt_secret,
        time::Duration::seconds(settings.access_token_ttl_secs),
        time::Duration::seconds(settings.refresh_token_ttl_secs),
    )
    .context("invalid auth.jwt_secret")
}

/// Signup, login and token refresh, mounted at the service root
pub struct AuthModule {
    state: AuthState,
}

impl AuthModule {
    pub fn new(state: AuthState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn base_path(&self) -> String {
        "/".to_string()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            access_ttl_secs = ctx.settings.auth.access_token_ttl_secs,
            refresh_ttl_secs = ctx.settings.auth.refresh_token_ttl_secs,
            "auth module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/signup", post(handlers::signup))
            .route("/login", post(handlers::login))
            .route("/refresh", post(handlers::refresh))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let body = |schema: &str| {
            json!({
                "required": true,
                "content": {
                    "application/json": {
                        "schema": { "$ref": format!("#/components/schemas/{}", schema) }
                    }
                }
            })
        };
        let token_pair = json!({
            "description": "Access and refresh tokens",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/TokenPair" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/signup": {
                    "post": {
                        "summary": "Register a user",
                        "tags": ["Auth"],
                        "requestBody": body("Credentials"),
                        "responses": {
                            "200": {
                                "description": "User registered",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/SignupResponse" }
                                    }
                                }
                            },
                            "400": error("Invalid payload or existing username")
                        }
                    }
                },
                "/login": {
                    "post": {
                        "summary": "Log in and receive a token pair",
                        "tags": ["Auth"],
                        "requestBody": body("Credentials"),
                        "responses": {
                            "200": token_pair,
                            "400": error("Invalid payload"),
                            "401": error("Bad credentials")
                        }
                    }
                },
                "/refresh": {
                    "post": {
                        "summary": "Exchange a refresh token for a new access token",
                        "tags": ["Auth"],
                        "requestBody": body("RefreshRequest"),
                        "responses": {
                            "200": token_pair,
                            "400": error("Invalid payload"),
                            "401": error("Invalid or expired refresh token")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Credentials": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string" },
                            "password": { "type": "string", "format": "password" }
                        },
                        "required": ["username", "password"]
                    },
                    "RefreshRequest": {
                        "type": "object",
                        "properties": { "refreshToken": { "type": "string" } },
                        "required": ["refreshToken"]
                    },
                    "SignupResponse": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string" },
                            "message": { "type": "string" }
                        },
                        "required": ["username", "message"]
                    },
                    "TokenPair": {
                        "type": "object",
                        "properties": {
                            "token": { "type": "string" },
                            "refreshToken": { "type": "string" }
                        },
                        "required": ["token", "refreshToken"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            version: 20260101000100,
            id: "001_users",
            up: MIGRATION_001,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "auth module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "auth module stopped");
        Ok(())
    }
}

/// Create a new instance of the auth module
pub fn create_module(state: AuthState) -> Arc<dyn Module> {
    Arc::new(AuthModule::new(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_service_rejects_short_secret() {
        let settings = AuthSettings {
            jwt_secret: "too-short".to_string(),
            ..AuthSettings::default()
        };
        assert!(token_service(&settings).is_err());
    }

    #[test]
    fn token_service_uses_configured_ttls() {
        let settings = AuthSettings {
            jwt_secret: "a-local-secret-that-is-long-enough!".to_string(),
            access_token_ttl_secs: 60,
            ..AuthSettings::default()
        };
        let tokens = token_service(&settings).unwrap();
        let claims = tokens
            .decode(&tokens.issue("alice", folio_authz::TokenKind::Access).unwrap())
            .unwrap();
        assert_eq!(claims.exp - claims.iat, 60);
    }
}
