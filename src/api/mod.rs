use std::sync::Arc;

use axum::{ routing::{ get, post }, Router };

pub mod transfer;

use crate::services::{ ExecutionService, TransferService };

#[derive(Clone)]
pub struct AppState {
    pub transfer_service: Arc<TransferService>,
    pub execution_service: Arc<ExecutionService>,
}

impl AppState {
    pub fn new(
        transfer_service: Arc<TransferService>,
        execution_service: Arc<ExecutionService>
    ) -> Self {
        Self {
            transfer_service,
            execution_service,
        }
    }
}

/// Routes for the vault dashboard, all scoped by the owner's wallet address.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/owners/{owner}/transfers",
            get(transfer::list_transfers).post(transfer::create_transfer)
        )
        .route("/api/owners/{owner}/transfers/due", get(transfer::list_due_transfers))
        .route(
            "/api/owners/{owner}/transfers/{id}",
            get(transfer::get_transfer).delete(transfer::cancel_transfer)
        )
        .route("/api/owners/{owner}/transfers/{id}/execute", post(transfer::execute_transfer))
        .route("/api/owners/{owner}/transfers/{id}/executions", get(transfer::list_executions))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
