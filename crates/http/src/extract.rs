//! Request extractors shared by module handlers

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Field-level checks run after a JSON body has been deserialized.
pub trait Validate {
    /// Return one `{ field, error }` entry per violated rule; empty when valid.
    fn validate(&self) -> Vec<serde_json::Value>;
}

/// JSON body that has been deserialized and passed [`Validate`].
///
/// Malformed bodies are rejected as `bad_request`, rule violations as
/// `validation_error` with the offending fields listed in `details`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        let details = value.validate();
        if !details.is_empty() {
            return Err(AppError::validation(details, "request validation failed"));
        }

        Ok(Self(value))
    }
}
