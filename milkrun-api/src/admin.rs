use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use milkrun_billing::service::OwnerDetail;
use milkrun_core::OwnerId;
use milkrun_shared::models::OwnerAccount;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::AppError,
    middleware::auth::{issue_token, AdminClaims},
    query::PeriodQuery,
    state::AppState,
};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

/// Routes reachable without a token
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/v1/admin/login", post(login))
}

/// Routes behind the admin middleware
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/owners", get(list_owners))
        .route("/v1/admin/owners/{email}", get(owner_detail).delete(delete_owner))
}

fn owner_from_path(email: &str) -> Result<OwnerId, AppError> {
    OwnerId::new(email).ok_or_else(|| AppError::ValidationError("Owner email is required".to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/admin/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<AdminLoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if req.email.trim() != state.admin.email || req.password != state.admin.password {
        warn!("Rejected admin login for {}", req.email);
        return Err(AppError::AuthenticationError("Invalid admin credentials".to_string()));
    }

    let claims = AdminClaims::new(&state.admin.email, &state.auth);
    let token = issue_token(&claims, &state.auth)?;
    Ok(Json(AuthResponse { token }))
}

/// GET /v1/admin/owners
async fn list_owners(State(state): State<AppState>) -> Result<Json<Vec<OwnerAccount>>, AppError> {
    Ok(Json(state.ledger.list_owners().await?))
}

/// GET /v1/admin/owners/{email}
async fn owner_detail(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<OwnerDetail>, AppError> {
    let period = query.resolve(&state.ledger)?;
    Ok(Json(state.ledger.owner_detail(&owner_from_path(&email)?, period).await?))
}

/// DELETE /v1/admin/owners/{email}
async fn delete_owner(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<StatusCode, AppError> {
    state.ledger.delete_owner(&owner_from_path(&email)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
