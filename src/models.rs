use chrono::{ DateTime, Utc };
use sea_orm::prelude::Decimal;
use uuid::Uuid;

use crate::enums::ExecutionStatus;

/// When a scheduled transfer last paid out, if ever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastExecution {
    Never,
    At(DateTime<Utc>),
}

impl LastExecution {
    pub fn at(&self) -> Option<DateTime<Utc>> {
        match self {
            LastExecution::Never => None,
            LastExecution::At(ts) => Some(*ts),
        }
    }
}

impl From<Option<DateTime<Utc>>> for LastExecution {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        match value {
            Some(ts) => LastExecution::At(ts),
            None => LastExecution::Never,
        }
    }
}

/// A recurring payment intent owned by a single wallet address.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTransfer {
    pub transfer_id: Uuid,
    pub owner_address: String,
    pub recipient_address: String,
    pub recipient_name: String,
    pub amount: Decimal,
    pub interval_seconds: i64,
    pub created_at: DateTime<Utc>,
    pub last_execution: LastExecution,
    pub is_active: bool,
    pub memo: Option<String>,
}

/// Caller input for a new scheduled transfer.
#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub recipient_address: String,
    pub recipient_name: Option<String>,
    pub amount: Decimal,
    pub interval_seconds: i64,
    pub memo: Option<String>,
}

/// Returned to the caller after a successful execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReceipt {
    pub transfer_id: Uuid,
    pub transaction_id: String,
    pub amount: Decimal,
    pub fee: Option<Decimal>,
    pub executed_at: DateTime<Utc>,
    pub next_execution_at: DateTime<Utc>,
}

/// One entry of a transfer's execution history.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRecord {
    pub id: Uuid,
    pub transfer_id: Uuid,
    pub owner_address: String,
    /// Completed executions including this one (or the one it attempted).
    pub execution_index: i64,
    /// Per-transfer sequence over every attempt, whatever its outcome.
    pub attempt_number: i64,
    pub amount: Decimal,
    pub fee: Option<Decimal>,
    pub transaction_id: Option<String>,
    pub status: ExecutionStatus,
    pub error_message: Option<String>,
    pub executed_at: DateTime<Utc>,
}

/// Running totals over a transfer's execution history.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExecutionTotals {
    pub execution_count: i64,
    /// Amount that actually left the vault, partial sends included.
    pub total_transferred: Decimal,
}

impl ExecutionTotals {
    pub fn from_history(history: &[ExecutionRecord]) -> Self {
        history.iter().fold(Self::default(), |mut totals, record| {
            match record.status {
                ExecutionStatus::Completed => {
                    totals.execution_count += 1;
                    totals.total_transferred += record.amount;
                }
                ExecutionStatus::Partial => {
                    totals.total_transferred += record.amount;
                }
                ExecutionStatus::Failed => {}
            }
            totals
        })
    }
}
