use std::str::FromStr;

use axum::{ extract::{ Path, State }, http::StatusCode, Json };
use chrono::{ DateTime, Utc };
use sea_orm::prelude::Decimal;
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::enums::TransferInterval;
use crate::error::{ AppError, Result };
use crate::models::{ ExecutionReceipt, ExecutionRecord, NewTransfer };
use crate::services::TransferView;

use super::AppState;

#[derive(Deserialize)]
pub struct CreateTransferRequest {
    pub recipient_address: String,
    #[serde(default)]
    pub recipient_name: Option<String>,
    pub amount: String,
    /// "hourly", "daily", "weekly", "monthly" or the interval in seconds.
    pub interval: String,
    #[serde(default)]
    pub memo: Option<String>,
}

#[derive(Serialize)]
pub struct TransferResponse {
    pub transfer_id: Uuid,
    pub owner_address: String,
    pub recipient_address: String,
    pub recipient_name: String,
    pub amount: String,
    pub interval_seconds: i64,
    pub interval_label: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_executed_at: Option<DateTime<Utc>>,
    pub next_execution_at: DateTime<Utc>,
    pub is_active: bool,
    pub is_due: bool,
    pub status_label: String,
    pub execution_count: i64,
    pub total_transferred: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl From<TransferView> for TransferResponse {
    fn from(view: TransferView) -> Self {
        let transfer = view.transfer;
        Self {
            transfer_id: transfer.transfer_id,
            owner_address: transfer.owner_address,
            recipient_address: transfer.recipient_address,
            recipient_name: transfer.recipient_name,
            amount: transfer.amount.to_string(),
            interval_seconds: transfer.interval_seconds,
            interval_label: view.interval_label,
            created_at: transfer.created_at,
            last_executed_at: transfer.last_execution.at(),
            next_execution_at: view.next_execution_at,
            is_active: transfer.is_active,
            is_due: view.is_due,
            status_label: view.status_label,
            execution_count: view.totals.execution_count,
            total_transferred: view.totals.total_transferred.to_string(),
            memo: transfer.memo,
        }
    }
}

#[derive(Serialize)]
pub struct ExecutionResponse {
    pub transfer_id: Uuid,
    pub tx: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    pub executed_at: DateTime<Utc>,
    pub next_execution_at: DateTime<Utc>,
}

impl From<ExecutionReceipt> for ExecutionResponse {
    fn from(receipt: ExecutionReceipt) -> Self {
        Self {
            transfer_id: receipt.transfer_id,
            tx: receipt.transaction_id,
            amount: receipt.amount.to_string(),
            fee: receipt.fee.map(|fee| fee.to_string()),
            executed_at: receipt.executed_at,
            next_execution_at: receipt.next_execution_at,
        }
    }
}

#[derive(Serialize)]
pub struct ExecutionRecordResponse {
    pub id: Uuid,
    pub execution_index: i64,
    pub attempt_number: i64,
    pub status: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub executed_at: DateTime<Utc>,
}

impl From<ExecutionRecord> for ExecutionRecordResponse {
    fn from(record: ExecutionRecord) -> Self {
        Self {
            id: record.id,
            execution_index: record.execution_index,
            attempt_number: record.attempt_number,
            status: record.status.to_string(),
            amount: record.amount.to_string(),
            fee: record.fee.map(|fee| fee.to_string()),
            tx: record.transaction_id,
            error_message: record.error_message,
            executed_at: record.executed_at,
        }
    }
}

pub async fn create_transfer(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    Json(request): Json<CreateTransferRequest>
) -> Result<(StatusCode, Json<TransferResponse>)> {
    let amount = Decimal::from_str(request.amount.trim()).map_err(|_|
        AppError::InvalidInput(format!("Invalid amount: {}", request.amount))
    )?;
    let interval = request.interval.parse::<TransferInterval>()?;

    let input = NewTransfer {
        recipient_address: request.recipient_address,
        recipient_name: request.recipient_name,
        amount,
        interval_seconds: interval.seconds(),
        memo: request.memo,
    };

    let transfer = state.transfer_service.create(&owner, input).await?;
    let view = state.transfer_service.get(&owner, transfer.transfer_id).await?;

    Ok((StatusCode::CREATED, Json(view.into())))
}

pub async fn list_transfers(
    State(state): State<AppState>,
    Path(owner): Path<String>
) -> Result<Json<Vec<TransferResponse>>> {
    let views = state.transfer_service.list(&owner).await?;

    Ok(Json(views.into_iter().map(Into::into).collect()))
}

pub async fn list_due_transfers(
    State(state): State<AppState>,
    Path(owner): Path<String>
) -> Result<Json<Vec<TransferResponse>>> {
    let views = state.transfer_service.due(&owner).await?;

    Ok(Json(views.into_iter().map(Into::into).collect()))
}

pub async fn get_transfer(
    State(state): State<AppState>,
    Path((owner, transfer_id)): Path<(String, Uuid)>
) -> Result<Json<TransferResponse>> {
    let view = state.transfer_service.get(&owner, transfer_id).await?;

    Ok(Json(view.into()))
}

pub async fn cancel_transfer(
    State(state): State<AppState>,
    Path((owner, transfer_id)): Path<(String, Uuid)>
) -> Result<StatusCode> {
    state.transfer_service.cancel(&owner, transfer_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn execute_transfer(
    State(state): State<AppState>,
    Path((owner, transfer_id)): Path<(String, Uuid)>
) -> Result<Json<ExecutionResponse>> {
    let receipt = state.execution_service.execute(&owner, transfer_id).await?;

    Ok(Json(receipt.into()))
}

pub async fn list_executions(
    State(state): State<AppState>,
    Path((owner, transfer_id)): Path<(String, Uuid)>
) -> Result<Json<Vec<ExecutionRecordResponse>>> {
    let history = state.execution_service.history(&owner, transfer_id).await?;

    Ok(Json(history.into_iter().map(Into::into).collect()))
}
