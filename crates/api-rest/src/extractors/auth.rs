//! Bearer token extractors.
//!
//! Tokens are issued elsewhere; this service only verifies them. Admin
//! identities are re-checked against the directory on every request.

use crate::{error::ApiError, state::AppState};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, Validation};
use serde::{Deserialize, Serialize};
use vcm_application::IdentityAssertion;
use vcm_domain::{AdminPrincipal, AdminRole, UserId};

/// Claims stored in JWT token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject: user id for citizens, admin id for admins
    pub sub: String,

    /// Admin role, absent for citizens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<AdminRole>,

    #[serde(default)]
    pub is_admin: bool,

    /// Expiration time (as UTC timestamp)
    pub exp: usize,

    /// Issued at (as UTC timestamp)
    pub iat: usize,
}

impl Claims {
    /// Claims asserting `identity` from `issued_at` for `ttl`
    pub fn new(identity: &IdentityAssertion, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: identity.subject.to_string(),
            role: identity.role,
            is_admin: identity.is_admin,
            exp: (issued_at + ttl).timestamp().max(0) as usize,
            iat: issued_at.timestamp().max(0) as usize,
        }
    }

    /// The identity these claims assert
    pub fn identity(&self) -> Result<IdentityAssertion, ApiError> {
        let subject = self
            .sub
            .parse::<i64>()
            .map_err(|_| ApiError::InvalidToken("Invalid subject in token".to_string()))?;

        if self.is_admin && self.role.is_none() {
            return Err(ApiError::InvalidToken(
                "Admin token without a role".to_string(),
            ));
        }

        Ok(IdentityAssertion {
            subject,
            role: self.role,
            is_admin: self.is_admin,
        })
    }
}

/// A verified bearer identity of either kind
#[derive(Debug, Clone)]
pub struct Identity(pub IdentityAssertion);

fn bearer_token(parts: &Parts) -> Option<Result<&str, ApiError>> {
    let value = parts.headers.get(header::AUTHORIZATION)?;
    Some(
        value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ApiError::InvalidToken("Invalid authorization header format".to_string())
            }),
    )
}

fn verify(token: &str, state: &AppState) -> Result<IdentityAssertion, ApiError> {
    let token_data = decode::<Claims>(token, state.decoding_key(), &Validation::default())
        .map_err(|e| ApiError::InvalidToken(format!("Token validation failed: {}", e)))?;
    token_data.claims.identity()
}

#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized)??;
        verify(token, state).map(Self)
    }
}

/// An active admin, resolved from the directory
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin(pub AdminPrincipal);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Identity(identity) = Identity::from_request_parts(parts, state).await?;
        let admin = state.guard.require_admin(&identity).await?;
        Ok(Self(admin))
    }
}

/// A citizen credential
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedCitizen(pub UserId);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedCitizen {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Identity(identity) = Identity::from_request_parts(parts, state).await?;
        Ok(Self(state.guard.require_citizen(&identity)?))
    }
}

/// Optional citizen; a missing or unusable bearer means anonymous
#[derive(Debug, Clone, Copy)]
pub struct MaybeCitizen(pub Option<UserId>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeCitizen {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = match Identity::from_request_parts(parts, state).await {
            Ok(Identity(identity)) => Some(identity),
            Err(_) => None,
        };
        Ok(Self(state.guard.citizen_or_anonymous(identity.as_ref())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcm_domain::AdminId;

    #[test]
    fn test_claims_round_trip_identity() {
        let issued = Utc::now();
        let admin = IdentityAssertion::admin(AdminId::new(4), AdminRole::CollectorOffice);

        let claims = Claims::new(&admin, issued, Duration::hours(1));

        assert_eq!(claims.sub, "4");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.identity().unwrap(), admin);
    }

    #[test]
    fn test_non_numeric_subject_is_rejected() {
        let claims = Claims {
            sub: "lakshmi".to_string(),
            role: None,
            is_admin: false,
            exp: 0,
            iat: 0,
        };
        assert!(matches!(claims.identity(), Err(ApiError::InvalidToken(_))));
    }

    #[test]
    fn test_admin_claims_need_a_role() {
        let claims = Claims {
            sub: "2".to_string(),
            role: None,
            is_admin: true,
            exp: 0,
            iat: 0,
        };
        assert!(claims.identity().is_err());
    }
}
