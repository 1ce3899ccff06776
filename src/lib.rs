pub mod adapters;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod ports;
pub mod services;
pub mod use_cases;
pub mod validation;

use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;

use crate::adapters::SqliteTransactionRepository;
use crate::ports::TransactionRepository;
use crate::use_cases::RecordTransaction;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub transactions: Arc<dyn TransactionRepository>,
    pub recorder: RecordTransaction,
}

impl AppState {
    /// Wires the ledger, scorer and use case around one owned pool.
    pub fn new(db: SqlitePool) -> Self {
        let transactions: Arc<dyn TransactionRepository> =
            Arc::new(SqliteTransactionRepository::new(db.clone()));
        let recorder = RecordTransaction::new(transactions.clone());
        Self {
            db,
            transactions,
            recorder,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/health/ready", get(handlers::ready))
        .route(
            "/transactions",
            get(handlers::transactions::list_transactions)
                .post(handlers::transactions::create_transaction),
        )
        .route("/transactions/:id", get(handlers::transactions::get_transaction))
        .layer(axum::middleware::from_fn(
            middleware::request_logger::request_logger_middleware,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
