use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::config::JwtSettings;
use crate::utils::error::AppError;

/// Clock skew tolerated on `exp`/`nbf`, matching the five minutes the token
/// issuer allows.
const LEEWAY_SECS: u64 = 300;

#[derive(Debug, Deserialize)]
pub struct Claims {
    pub sub: Option<String>,
    pub nameid: Option<String>,
    #[serde(rename = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier")]
    pub name_identifier: Option<String>,
    pub exp: u64,
}

impl Claims {
    /// The caller identity: `sub`, else one of the name-identifier claims.
    pub fn user_id(&self) -> Option<&str> {
        [&self.sub, &self.nameid, &self.name_identifier]
            .into_iter()
            .filter_map(|claim| claim.as_deref())
            .find(|value| !value.trim().is_empty())
    }
}

/// HS256 bearer-token verifier checking signature, issuer, audience and
/// lifetime.
#[derive(Clone)]
pub struct JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(settings: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_audience(&[settings.audience.as_str()]);
        validation.validate_exp = true;
        validation.leeway = LEEWAY_SECS;

        Self {
            key: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
        }
    }

    /// Verifies the token and returns the caller identity it carries.
    pub fn authenticate(&self, token: &str) -> Result<String, AppError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AppError::AuthError("Invalid or expired token".into())
        })?;

        data.claims
            .user_id()
            .map(str::to_string)
            .ok_or_else(|| AppError::AuthError("Token carries no user identity".into()))
    }
}
