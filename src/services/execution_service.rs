use std::collections::HashSet;
use std::sync::{ Arc, Mutex };
use std::time::Duration;

use uuid::Uuid;

use crate::clock::Clock;
use crate::db::TransferStore;
use crate::enums::ExecutionStatus;
use crate::error::{ AppError, Result };
use crate::models::{ ExecutionReceipt, ExecutionRecord, ScheduledTransfer };
use crate::providers::{ BalanceProvider, PaymentRail, PaymentReceipt };
use crate::schedule;

/// Tracks which transfers have an execution attempt in flight.
#[derive(Default)]
pub struct ExecutionGuard {
    in_flight: Mutex<HashSet<(String, Uuid)>>,
}

/// Held for the duration of one execution attempt; releases on drop.
pub struct InFlight<'a> {
    guard: &'a ExecutionGuard,
    key: (String, Uuid),
}

impl ExecutionGuard {
    pub fn try_acquire(&self, owner: &str, transfer_id: Uuid) -> Result<InFlight<'_>> {
        let key = (owner.to_string(), transfer_id);
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());

        if !in_flight.insert(key.clone()) {
            return Err(AppError::ConcurrentExecution);
        }

        Ok(InFlight { guard: self, key })
    }

    pub fn is_in_flight(&self, owner: &str, transfer_id: Uuid) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&(owner.to_string(), transfer_id))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.guard.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}

/// Performs manually triggered executions of scheduled transfers.
///
/// Each attempt runs `Validating -> AwaitingPayment -> Recorded | Failed`.
/// Validation failures never reach the payment rail; payment failures
/// leave the transfer due and are returned unchanged. Nothing is retried.
pub struct ExecutionService {
    store: Arc<dyn TransferStore>,
    balances: Arc<dyn BalanceProvider>,
    payments: Arc<dyn PaymentRail>,
    clock: Arc<dyn Clock>,
    guard: ExecutionGuard,
    payment_timeout: Duration,
}

impl ExecutionService {
    pub fn new(
        store: Arc<dyn TransferStore>,
        balances: Arc<dyn BalanceProvider>,
        payments: Arc<dyn PaymentRail>,
        clock: Arc<dyn Clock>,
        payment_timeout: Duration
    ) -> Self {
        Self {
            store,
            balances,
            payments,
            clock,
            guard: ExecutionGuard::default(),
            payment_timeout,
        }
    }

    /// Execute one due transfer now
    pub async fn execute(&self, owner: &str, transfer_id: Uuid) -> Result<ExecutionReceipt> {
        let _in_flight = self.guard.try_acquire(owner, transfer_id).map_err(|e| {
            tracing::warn!(owner, transfer_id = %transfer_id, "execution already in flight");
            e
        })?;

        let transfer = self.validate(owner, transfer_id).await?;

        tracing::info!(
            owner,
            transfer_id = %transfer_id,
            recipient = %transfer.recipient_address,
            amount = %transfer.amount,
            "sending scheduled transfer"
        );

        match self.pay(owner, &transfer).await {
            Ok(payment) if payment.is_partial => self.record_partial(owner, &transfer, payment).await,
            Ok(payment) => self.record_success(owner, &transfer, payment).await,
            Err(e) => {
                tracing::error!(owner, transfer_id = %transfer_id, "scheduled transfer failed: {}", e);
                self.record_failure(owner, &transfer, &e).await;
                Err(e)
            }
        }
    }

    /// Execution attempts for a transfer, newest first
    pub async fn history(&self, owner: &str, transfer_id: Uuid) -> Result<Vec<ExecutionRecord>> {
        // Unknown ids are an error, not an empty history
        self.store.get(owner, transfer_id).await?;
        self.store.list_executions(owner, transfer_id).await
    }

    pub fn is_executing(&self, owner: &str, transfer_id: Uuid) -> bool {
        self.guard.is_in_flight(owner, transfer_id)
    }

    async fn validate(&self, owner: &str, transfer_id: Uuid) -> Result<ScheduledTransfer> {
        let transfer = self.store.get(owner, transfer_id).await?;

        if !transfer.is_active {
            return Err(AppError::TransferInactive);
        }

        let next_execution_at = schedule::next_execution_time(&transfer);
        if self.clock.now() < next_execution_at {
            return Err(AppError::TransferNotDue { next_execution_at });
        }

        let available = self.balances.available_balance(owner).await?;
        if available < transfer.amount {
            return Err(AppError::InsufficientBalance {
                available,
                required: transfer.amount,
            });
        }

        Ok(transfer)
    }

    async fn pay(&self, owner: &str, transfer: &ScheduledTransfer) -> Result<PaymentReceipt> {
        let payment = self.payments.send_private(
            owner,
            &transfer.recipient_address,
            transfer.amount
        );

        match tokio::time::timeout(self.payment_timeout, payment).await {
            Ok(Ok(receipt)) => Ok(receipt),
            Ok(Err(AppError::PaymentExecution(message))) => {
                Err(AppError::PaymentExecution(message))
            }
            Ok(Err(e)) => Err(AppError::PaymentExecution(e.to_string())),
            Err(_) =>
                Err(
                    AppError::PaymentExecution(
                        format!(
                            "Payment did not settle within {}s",
                            self.payment_timeout.as_secs()
                        )
                    )
                ),
        }
    }

    /// Once the rail has paid, the receipt is returned even if the history
    /// write fails. Only a failed `record_execution` is an error, and it
    /// carries the transaction id.
    async fn record_success(
        &self,
        owner: &str,
        transfer: &ScheduledTransfer,
        payment: PaymentReceipt
    ) -> Result<ExecutionReceipt> {
        let executed_at = self.clock.now();
        let sent = payment.amount.unwrap_or(transfer.amount);

        let updated = match
            self.store.record_execution(owner, transfer.transfer_id, executed_at).await
        {
            Ok(updated) => updated,
            Err(e) => {
                tracing::error!(
                    owner,
                    transfer_id = %transfer.transfer_id,
                    tx = %payment.transaction_id,
                    "payment settled but execution was not recorded: {}",
                    e
                );
                return Err(AppError::PaymentNotRecorded {
                    transaction_id: payment.transaction_id,
                    message: e.to_string(),
                });
            }
        };

        let record = self.append_history(ExecutionRecord {
            id: Uuid::new_v4(),
            transfer_id: transfer.transfer_id,
            owner_address: owner.to_string(),
            execution_index: 0,
            attempt_number: 0,
            amount: sent,
            fee: payment.fee,
            transaction_id: Some(payment.transaction_id.clone()),
            status: ExecutionStatus::Completed,
            error_message: None,
            executed_at,
        }).await;

        tracing::info!(
            owner,
            transfer_id = %transfer.transfer_id,
            tx = %payment.transaction_id,
            execution_index = record.map(|r| r.execution_index),
            "scheduled transfer executed"
        );

        Ok(ExecutionReceipt {
            transfer_id: transfer.transfer_id,
            transaction_id: payment.transaction_id,
            amount: sent,
            fee: payment.fee,
            executed_at,
            next_execution_at: schedule::next_execution_time(&updated),
        })
    }

    /// A partial send is kept in the history with what actually left the
    /// vault. `last_execution` is untouched, so the transfer stays due.
    async fn record_partial(
        &self,
        owner: &str,
        transfer: &ScheduledTransfer,
        payment: PaymentReceipt
    ) -> Result<ExecutionReceipt> {
        let sent = payment.amount.unwrap_or_default();

        tracing::warn!(
            owner,
            transfer_id = %transfer.transfer_id,
            tx = %payment.transaction_id,
            sent = %sent,
            requested = %transfer.amount,
            "Privacy Cash sent a partial withdrawal"
        );

        self.append_history(ExecutionRecord {
            id: Uuid::new_v4(),
            transfer_id: transfer.transfer_id,
            owner_address: owner.to_string(),
            execution_index: 0,
            attempt_number: 0,
            amount: sent,
            fee: payment.fee,
            transaction_id: Some(payment.transaction_id.clone()),
            status: ExecutionStatus::Partial,
            error_message: Some(format!("Sent {} of {}", sent, transfer.amount)),
            executed_at: self.clock.now(),
        }).await;

        Err(AppError::PartialPayment {
            transaction_id: payment.transaction_id,
            sent,
            requested: transfer.amount,
        })
    }

    async fn record_failure(&self, owner: &str, transfer: &ScheduledTransfer, error: &AppError) {
        self.append_history(ExecutionRecord {
            id: Uuid::new_v4(),
            transfer_id: transfer.transfer_id,
            owner_address: owner.to_string(),
            execution_index: 0,
            attempt_number: 0,
            amount: transfer.amount,
            fee: None,
            transaction_id: None,
            status: ExecutionStatus::Failed,
            error_message: Some(error.to_string()),
            executed_at: self.clock.now(),
        }).await;
    }

    /// Best effort; numbers the record from the stored history before
    /// appending it. The caller's outcome does not depend on this write.
    async fn append_history(&self, mut record: ExecutionRecord) -> Option<ExecutionRecord> {
        let history = match
            self.store.list_executions(&record.owner_address, record.transfer_id).await
        {
            Ok(history) => history,
            Err(e) => {
                tracing::error!(
                    transfer_id = %record.transfer_id,
                    tx = ?record.transaction_id,
                    "Failed to read execution history: {}",
                    e
                );
                return None;
            }
        };

        let completed = history
            .iter()
            .filter(|r| r.status == ExecutionStatus::Completed)
            .count() as i64;
        record.execution_index = completed + 1;
        record.attempt_number = history.len() as i64 + 1;

        let status = record.status;
        let transfer_id = record.transfer_id;
        match self.store.append_execution(record).await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::error!(
                    transfer_id = %transfer_id,
                    "Failed to record {} execution: {}",
                    status,
                    e
                );
                None
            }
        }
    }
}
