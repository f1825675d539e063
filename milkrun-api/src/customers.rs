use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use milkrun_billing::CustomerStatement;
use milkrun_core::repository::CascadeReport;
use milkrun_shared::models::{Customer, CustomerUpdate, NewCustomer};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::AppError, middleware::auth::OwnerClaims, query::PeriodQuery, state::AppState};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterCustomerRequest {
    pub name: String,
    pub phone: String,
    pub quantity: Decimal,
    pub price: Decimal,
    /// "YYYY-MM-DD" or an RFC 3339 timestamp
    pub start_date: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub start_date: Option<String>,
    pub is_delivering: Option<bool>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/customers", get(list_customers).post(register_customer))
        .route(
            "/v1/customers/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/v1/customers/{id}/delivery/start", post(start_delivery))
        .route("/v1/customers/{id}/delivery/stop", post(stop_delivery))
        .route("/v1/customers/{id}/month", get(customer_month))
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_customers(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
) -> Result<Json<Vec<Customer>>, AppError> {
    Ok(Json(state.ledger.list_customers(&claims.owner()?).await?))
}

async fn register_customer(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
    Json(req): Json<RegisterCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    let registration = NewCustomer {
        name: req.name,
        phone: req.phone,
        quantity: req.quantity,
        price: req.price,
        start_date: state.ledger.normalize_day(&req.start_date)?,
    };
    let customer = state.ledger.register_customer(&claims.owner()?, registration).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn get_customer(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, AppError> {
    Ok(Json(state.ledger.get_customer(&claims.owner()?, id).await?))
}

async fn update_customer(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCustomerRequest>,
) -> Result<Json<Customer>, AppError> {
    let start_date = req
        .start_date
        .as_deref()
        .map(|d| state.ledger.normalize_day(d))
        .transpose()?;
    let update = CustomerUpdate {
        name: req.name,
        phone: req.phone,
        quantity: req.quantity,
        price: req.price,
        start_date,
        is_delivering: req.is_delivering,
    };
    Ok(Json(state.ledger.update_customer(&claims.owner()?, id, update).await?))
}

async fn delete_customer(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<CascadeReport>, AppError> {
    Ok(Json(state.ledger.delete_customer(&claims.owner()?, id).await?))
}

async fn start_delivery(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, AppError> {
    Ok(Json(state.ledger.set_delivering(&claims.owner()?, id, true).await?))
}

async fn stop_delivery(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, AppError> {
    Ok(Json(state.ledger.set_delivering(&claims.owner()?, id, false).await?))
}

/// Calendar and bill of one customer for a month
async fn customer_month(
    State(state): State<AppState>,
    Extension(claims): Extension<OwnerClaims>,
    Path(id): Path<Uuid>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<CustomerStatement>, AppError> {
    let period = query.resolve(&state.ledger)?;
    Ok(Json(state.ledger.customer_month(&claims.owner()?, id, period).await?))
}
