use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use super::JwtValidator;
use crate::utils::error::AppError;

/// The authenticated caller, resolved from `Authorization: Bearer <token>`.
/// Use as a handler parameter to require authentication.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    Arc<JwtValidator>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let validator = <Arc<JwtValidator> as FromRef<S>>::from_ref(state);
        validator.authenticate(token).map(AuthUser)
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::AuthError("Missing authorization header".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| {
            AppError::AuthError("Invalid authorization format. Expected 'Bearer <token>'".into())
        })?;

    if token.is_empty() {
        return Err(AppError::AuthError("Empty bearer token".into()));
    }

    Ok(token)
}
