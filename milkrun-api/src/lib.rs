use axum::{
    http::Method,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod bills;
pub mod customers;
pub mod deliveries;
pub mod error;
pub mod extra_sales;
pub mod middleware;
pub mod query;
pub mod session;
pub mod state;
pub mod worker;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let owner_routes = Router::new()
        .merge(session::routes())
        .merge(customers::routes())
        .merge(deliveries::routes())
        .merge(extra_sales::routes())
        .merge(bills::routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::owner_auth_middleware,
        ));

    let admin_routes = admin::routes().route_layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::admin_auth_middleware,
    ));

    Router::new()
        .route("/health", get(health))
        .merge(admin::public_routes())
        .merge(owner_routes)
        .merge(admin_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
