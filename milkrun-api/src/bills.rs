use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use milkrun_billing::service::{BillLine, PaymentRequest};
use milkrun_billing::{MonthlySummary, PaymentReceipt};
use milkrun_shared::models::SettlementRecord;

use crate::{
    error::AppError,
    middleware::auth::OwnerClaims,
    query::{BillsQuery, PeriodQuery},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bills", get(bill_board))
        .route("/v1/bills/settled", get(list_settlements))
        .route("/v1/bills/payments", post(record_payment))
        .route("/v1/summary", get(summary))
}

/// `?view=all|pending|settled`
async fn bill_board(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
    Query(query): Query<BillsQuery>,
) -> Result<Json<Vec<BillLine>>, AppError> {
    let period = state.ledger.resolve_period(query.month, query.year)?;
    Ok(Json(state.ledger.bill_board(&claims.owner()?, period, query.view).await?))
}

async fn list_settlements(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<SettlementRecord>>, AppError> {
    let period = query.resolve(&state.ledger)?;
    Ok(Json(state.ledger.list_settlements(&claims.owner()?, period).await?))
}

async fn record_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<PaymentReceipt>, AppError> {
    Ok(Json(state.ledger.record_payment(&claims.owner()?, req).await?))
}

async fn summary(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<MonthlySummary>, AppError> {
    let period = query.resolve(&state.ledger)?;
    Ok(Json(state.ledger.summary(&claims.owner()?, period).await?))
}
