use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{ DateTime, Utc };
use tokio::sync::RwLock;
use uuid::Uuid;

use super::TransferStore;
use crate::error::{ AppError, Result };
use crate::models::{ ExecutionRecord, LastExecution, ScheduledTransfer };

/// Session-lifetime store kept in process memory.
#[derive(Default)]
pub struct InMemoryTransferStore {
    transfers: RwLock<HashMap<String, Vec<ScheduledTransfer>>>,
    executions: RwLock<Vec<ExecutionRecord>>,
}

impl InMemoryTransferStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransferStore for InMemoryTransferStore {
    async fn create(&self, transfer: ScheduledTransfer) -> Result<ScheduledTransfer> {
        let mut transfers = self.transfers.write().await;
        let owned = transfers.entry(transfer.owner_address.clone()).or_default();

        if owned.iter().any(|t| t.transfer_id == transfer.transfer_id) {
            return Err(
                AppError::InvalidInput(format!("Transfer {} already exists", transfer.transfer_id))
            );
        }

        owned.push(transfer.clone());
        Ok(transfer)
    }

    async fn list(&self, owner: &str) -> Result<Vec<ScheduledTransfer>> {
        let transfers = self.transfers.read().await;
        Ok(transfers.get(owner).cloned().unwrap_or_default())
    }

    async fn get(&self, owner: &str, transfer_id: Uuid) -> Result<ScheduledTransfer> {
        let transfers = self.transfers.read().await;
        transfers
            .get(owner)
            .and_then(|owned| owned.iter().find(|t| t.transfer_id == transfer_id))
            .cloned()
            .ok_or(AppError::TransferNotFound)
    }

    async fn record_execution(
        &self,
        owner: &str,
        transfer_id: Uuid,
        executed_at: DateTime<Utc>
    ) -> Result<ScheduledTransfer> {
        let mut transfers = self.transfers.write().await;
        let transfer = transfers
            .get_mut(owner)
            .and_then(|owned| owned.iter_mut().find(|t| t.transfer_id == transfer_id))
            .ok_or(AppError::TransferNotFound)?;

        if executed_at < transfer.created_at {
            return Err(
                AppError::InvalidInput("Execution time precedes transfer creation".to_string())
            );
        }

        transfer.last_execution = LastExecution::At(executed_at);
        Ok(transfer.clone())
    }

    async fn remove(&self, owner: &str, transfer_id: Uuid) -> Result<()> {
        let mut transfers = self.transfers.write().await;
        let transfer = transfers
            .get_mut(owner)
            .and_then(|owned| owned.iter_mut().find(|t| t.transfer_id == transfer_id))
            .ok_or(AppError::TransferNotFound)?;

        if !transfer.is_active {
            return Err(AppError::TransferInactive);
        }

        transfer.is_active = false;
        Ok(())
    }

    async fn append_execution(&self, record: ExecutionRecord) -> Result<ExecutionRecord> {
        self.executions.write().await.push(record.clone());
        Ok(record)
    }

    async fn list_executions(&self, owner: &str, transfer_id: Uuid) -> Result<Vec<ExecutionRecord>> {
        let executions = self.executions.read().await;
        let mut history: Vec<ExecutionRecord> = executions
            .iter()
            .filter(|r| r.owner_address == owner && r.transfer_id == transfer_id)
            .cloned()
            .collect();

        history.sort_by(|a, b| {
            b.executed_at.cmp(&a.executed_at).then(b.attempt_number.cmp(&a.attempt_number))
        });
        Ok(history)
    }
}
