pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod invoice;
pub mod ports;
pub mod services;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;

use crate::ports::TransactionStore;
use crate::services::{BillingService, PaymentReconciler};

#[derive(Clone)]
pub struct AppState {
    pub transactions: Arc<dyn TransactionStore>,
    pub reconciler: Arc<PaymentReconciler>,
    pub billing: Arc<BillingService>,
    pub start_time: Instant,
}

pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/callback", post(handlers::webhook::callback))
        .route("/transactions", get(handlers::transactions::list_transactions))
        .route("/transactions/:id", get(handlers::transactions::get_transaction))
        .route("/admin/billing/run", post(handlers::admin::run_billing))
        .route("/admin/rentals/:id/bill", post(handlers::admin::bill_rental))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
