use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use milkrun_billing::service::{ExtraSaleEdit, ExtraSaleInput};
use milkrun_shared::models::ExtraSaleRecord;
use uuid::Uuid;

use crate::{error::AppError, middleware::auth::OwnerClaims, query::PeriodQuery, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/extra-sales", get(list_extra_sales).post(record_extra_sale))
        .route("/v1/extra-sales/{id}", put(update_extra_sale).delete(delete_extra_sale))
}

/// Without `month`/`year` every sale is listed, most recent first.
async fn list_extra_sales(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<ExtraSaleRecord>>, AppError> {
    let period = if query.month.is_some() || query.year.is_some() {
        Some(query.resolve(&state.ledger)?)
    } else {
        None
    };
    Ok(Json(state.ledger.list_extra_sales(&claims.owner()?, period).await?))
}

async fn record_extra_sale(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
    Json(req): Json<ExtraSaleInput>,
) -> Result<(StatusCode, Json<ExtraSaleRecord>), AppError> {
    let sale = state.ledger.record_extra_sale(&claims.owner()?, req).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

async fn update_extra_sale(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
    Path(id): Path<Uuid>,
    Json(req): Json<ExtraSaleEdit>,
) -> Result<Json<ExtraSaleRecord>, AppError> {
    Ok(Json(state.ledger.update_extra_sale(&claims.owner()?, id, req).await?))
}

async fn delete_extra_sale(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.ledger.delete_extra_sale(&claims.owner()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
