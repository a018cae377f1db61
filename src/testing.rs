//! Fakes shared by unit tests.

use std::sync::atomic::{ AtomicBool, AtomicUsize, Ordering };
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{ DateTime, Duration, Utc };
use sea_orm::prelude::Decimal;
use tokio::sync::{ Notify, Semaphore };
use uuid::Uuid;

use crate::clock::Clock;
use crate::db::{ InMemoryTransferStore, TransferStore };
use crate::error::{ AppError, Result };
use crate::models::{ ExecutionRecord, LastExecution, ScheduledTransfer };
use crate::providers::{ BalanceProvider, PaymentRail, PaymentReceipt };

pub const OWNER: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const RECIPIENT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

pub fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_767_225_600_000).unwrap()
}

pub fn sample_transfer(owner: &str, interval_seconds: i64) -> ScheduledTransfer {
    ScheduledTransfer {
        transfer_id: Uuid::new_v4(),
        owner_address: owner.to_string(),
        recipient_address: RECIPIENT.to_string(),
        recipient_name: "Acme Streaming".to_string(),
        amount: Decimal::new(50, 0),
        interval_seconds,
        created_at: t0(),
        last_execution: LastExecution::Never,
        is_active: true,
        memo: None,
    }
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub struct FixedBalance {
    balance: Mutex<Decimal>,
}

impl FixedBalance {
    pub fn new(balance: Decimal) -> Self {
        Self { balance: Mutex::new(balance) }
    }

    pub fn set(&self, balance: Decimal) {
        *self.balance.lock().unwrap() = balance;
    }
}

#[async_trait]
impl BalanceProvider for FixedBalance {
    async fn available_balance(&self, _owner: &str) -> Result<Decimal> {
        Ok(*self.balance.lock().unwrap())
    }
}

/// Payment rail whose outcome is scripted by the test. With a gate, every
/// call waits for a permit before resolving.
pub struct ScriptedRail {
    calls: AtomicUsize,
    failure: Mutex<Option<String>>,
    partial: Mutex<Option<Decimal>>,
    gate: Option<Semaphore>,
    pub entered: Notify,
}

impl ScriptedRail {
    pub fn succeeding() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failure: Mutex::new(None),
            partial: Mutex::new(None),
            gate: None,
            entered: Notify::new(),
        }
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::succeeding()
        }
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn succeed(&self) {
        *self.failure.lock().unwrap() = None;
        *self.partial.lock().unwrap() = None;
    }

    /// Settle every following call as a partial send of `sent`.
    pub fn send_partial(&self, sent: Decimal) {
        *self.partial.lock().unwrap() = Some(sent);
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentRail for ScriptedRail {
    async fn send_private(
        &self,
        _owner: &str,
        _recipient: &str,
        amount: Decimal
    ) -> Result<PaymentReceipt> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.entered.notify_one();

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(AppError::PaymentExecution(message));
        }

        let partial = *self.partial.lock().unwrap();
        Ok(PaymentReceipt {
            transaction_id: format!("pc_tx_{}", call),
            amount: Some(partial.unwrap_or(amount)),
            fee: Some(Decimal::new(25, 2)),
            is_partial: partial.is_some(),
        })
    }
}

/// In-memory store whose writes after a payment can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: InMemoryTransferStore,
    fail_record: AtomicBool,
    fail_history: AtomicBool,
}

impl FlakyStore {
    pub fn fail_record_execution(&self) {
        self.fail_record.store(true, Ordering::SeqCst);
    }

    pub fn fail_append_execution(&self) {
        self.fail_history.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl TransferStore for FlakyStore {
    async fn create(&self, transfer: ScheduledTransfer) -> Result<ScheduledTransfer> {
        self.inner.create(transfer).await
    }

    async fn list(&self, owner: &str) -> Result<Vec<ScheduledTransfer>> {
        self.inner.list(owner).await
    }

    async fn get(&self, owner: &str, transfer_id: Uuid) -> Result<ScheduledTransfer> {
        self.inner.get(owner, transfer_id).await
    }

    async fn record_execution(
        &self,
        owner: &str,
        transfer_id: Uuid,
        executed_at: DateTime<Utc>
    ) -> Result<ScheduledTransfer> {
        if self.fail_record.load(Ordering::SeqCst) {
            return Err(AppError::Database(sea_orm::DbErr::Custom("transfer write failed".into())));
        }
        self.inner.record_execution(owner, transfer_id, executed_at).await
    }

    async fn remove(&self, owner: &str, transfer_id: Uuid) -> Result<()> {
        self.inner.remove(owner, transfer_id).await
    }

    async fn append_execution(&self, record: ExecutionRecord) -> Result<ExecutionRecord> {
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(AppError::Database(sea_orm::DbErr::Custom("history write failed".into())));
        }
        self.inner.append_execution(record).await
    }

    async fn list_executions(&self, owner: &str, transfer_id: Uuid) -> Result<Vec<ExecutionRecord>> {
        self.inner.list_executions(owner, transfer_id).await
    }
}
