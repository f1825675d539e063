use axum::{extract::State, routing::post, Extension, Json, Router};
use milkrun_shared::models::OwnerAccount;

use crate::{error::AppError, middleware::auth::OwnerClaims, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/session", post(sign_in))
}

/// Called by the client after sign-in; creates the owner account on first use.
async fn sign_in(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
) -> Result<Json<OwnerAccount>, AppError> {
    let owner = claims.owner()?;
    let account = state
        .ledger
        .sign_in(&owner, claims.name.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(account))
}
