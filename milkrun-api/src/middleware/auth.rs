use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    http::StatusCode,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use milkrun_core::OwnerId;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::AppError;
use crate::state::{AppState, AuthConfig};

pub const OWNER_ROLE: &str = "OWNER";
pub const ADMIN_ROLE: &str = "ADMIN";

// ============================================================================
// JWT Claims
// ============================================================================

/// Claims of a distributor session. `sub` is the owner's email.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OwnerClaims {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: String,
    pub exp: usize,
}

impl OwnerClaims {
    pub fn new(email: &str, name: Option<String>, auth: &AuthConfig) -> Self {
        Self {
            sub: email.to_string(),
            name,
            role: OWNER_ROLE.to_owned(),
            exp: expiry(auth),
        }
    }

    pub fn owner(&self) -> Result<OwnerId, AppError> {
        OwnerId::new(self.sub.as_str())
            .ok_or_else(|| AppError::AuthenticationError("Token has no owner".to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminClaims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

impl AdminClaims {
    pub fn new(email: &str, auth: &AuthConfig) -> Self {
        Self {
            sub: email.to_string(),
            role: ADMIN_ROLE.to_owned(),
            exp: expiry(auth),
        }
    }
}

fn expiry(auth: &AuthConfig) -> usize {
    (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize
}

pub fn issue_token<T: Serialize>(claims: &T, auth: &AuthConfig) -> Result<String, AppError> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

fn bearer_claims<T: DeserializeOwned>(req: &Request, auth: &AuthConfig) -> Result<T, StatusCode> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    decode::<T>(
        token,
        &DecodingKey::from_secret(auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| StatusCode::UNAUTHORIZED)
}

// ============================================================================
// Owner Authentication Middleware
// ============================================================================

pub async fn owner_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims: OwnerClaims = bearer_claims(&req, &state.auth)?;

    if claims.role != OWNER_ROLE {
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

// ============================================================================
// Admin Authentication Middleware
// ============================================================================

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims: AdminClaims = bearer_claims(&req, &state.auth)?;

    if claims.role != ADMIN_ROLE {
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
