use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use milkrun_billing::service::{DeliverySheet, DeliveryToggle, ToggleSummary};
use serde::Deserialize;

use crate::{error::AppError, middleware::auth::OwnerClaims, query::DateQuery, state::AppState};

#[derive(Debug, Deserialize)]
pub struct DeliveryBatchRequest {
    pub entries: Vec<DeliveryToggle>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/deliveries", get(delivery_sheet).post(set_deliveries))
}

async fn delivery_sheet(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
    Query(query): Query<DateQuery>,
) -> Result<Json<DeliverySheet>, AppError> {
    let date = query
        .date
        .as_deref()
        .map(|d| state.ledger.normalize_day(d))
        .transpose()?;
    Ok(Json(state.ledger.delivery_sheet(&claims.owner()?, date).await?))
}

async fn set_deliveries(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
    Json(req): Json<DeliveryBatchRequest>,
) -> Result<Json<ToggleSummary>, AppError> {
    Ok(Json(state.ledger.set_deliveries(&claims.owner()?, req.entries).await?))
}
