use async_trait::async_trait;
use chrono::{ DateTime, Utc };
use uuid::Uuid;

use crate::error::Result;
use crate::models::{ ExecutionRecord, ScheduledTransfer };

pub mod entity;
pub use entity::*;

mod transfer_repository;
pub use transfer_repository::TransferRepository;

mod memory;
pub use memory::InMemoryTransferStore;

/// Keeps an owner's scheduled transfers and their execution history.
///
/// Records are keyed by `(owner_address, transfer_id)`. Every mutation is
/// applied as one unit, so a concurrent `list` sees either the state before
/// or after it.
#[async_trait]
pub trait TransferStore: Send + Sync {
    /// Persist a new, already validated transfer.
    async fn create(&self, transfer: ScheduledTransfer) -> Result<ScheduledTransfer>;

    /// All of the owner's transfers in insertion order.
    async fn list(&self, owner: &str) -> Result<Vec<ScheduledTransfer>>;

    async fn get(&self, owner: &str, transfer_id: Uuid) -> Result<ScheduledTransfer>;

    /// Set `last_execution`. Rejects timestamps earlier than `created_at`.
    async fn record_execution(
        &self,
        owner: &str,
        transfer_id: Uuid,
        executed_at: DateTime<Utc>
    ) -> Result<ScheduledTransfer>;

    /// Deactivate the transfer. Unknown ids fail with `TransferNotFound`,
    /// already cancelled ones with `TransferInactive`.
    async fn remove(&self, owner: &str, transfer_id: Uuid) -> Result<()>;

    async fn append_execution(&self, record: ExecutionRecord) -> Result<ExecutionRecord>;

    /// Execution history, newest first.
    async fn list_executions(&self, owner: &str, transfer_id: Uuid) -> Result<Vec<ExecutionRecord>>;
}
