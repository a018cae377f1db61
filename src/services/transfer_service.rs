use std::sync::Arc;

use chrono::{ DateTime, Utc };
use sea_orm::prelude::Decimal;
use uuid::Uuid;

use crate::clock::Clock;
use crate::db::TransferStore;
use crate::enums::TransferInterval;
use crate::error::{ AppError, Result };
use crate::models::{ ExecutionTotals, LastExecution, NewTransfer, ScheduledTransfer };
use crate::schedule;

const MAX_MEMO_CHARS: usize = 200;
const MAX_RECIPIENT_NAME_CHARS: usize = 64;
/// Smallest USDC unit is 10^-6; the relay floors anything finer.
const USDC_DECIMALS: u32 = 6;

/// A transfer together with its due-date state at a given instant.
#[derive(Debug, Clone)]
pub struct TransferView {
    pub transfer: ScheduledTransfer,
    pub next_execution_at: DateTime<Utc>,
    pub is_due: bool,
    pub status_label: String,
    pub interval_label: String,
    pub totals: ExecutionTotals,
}

impl TransferView {
    pub fn at(transfer: ScheduledTransfer, totals: ExecutionTotals, now: DateTime<Utc>) -> Self {
        Self {
            next_execution_at: schedule::next_execution_time(&transfer),
            is_due: schedule::is_due(&transfer, now),
            status_label: schedule::humanize_remaining(&transfer, now),
            interval_label: schedule::interval_label(transfer.interval_seconds),
            totals,
            transfer,
        }
    }
}

/// Creates, lists and cancels an owner's scheduled transfers.
pub struct TransferService {
    store: Arc<dyn TransferStore>,
    clock: Arc<dyn Clock>,
}

impl TransferService {
    pub fn new(store: Arc<dyn TransferStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Validate and store a new recurring transfer
    pub async fn create(&self, owner: &str, input: NewTransfer) -> Result<ScheduledTransfer> {
        validate_new_transfer(owner, &input)?;

        let recipient_address = input.recipient_address.trim().to_string();
        let recipient_name = input.recipient_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| shorten_address(&recipient_address));

        let transfer = ScheduledTransfer {
            transfer_id: Uuid::new_v4(),
            owner_address: owner.to_string(),
            recipient_address,
            recipient_name,
            amount: input.amount.normalize(),
            interval_seconds: input.interval_seconds,
            created_at: self.clock.now(),
            last_execution: LastExecution::Never,
            is_active: true,
            memo: input.memo.filter(|memo| !memo.trim().is_empty()),
        };

        let transfer = self.store.create(transfer).await?;

        tracing::info!(
            owner,
            transfer_id = %transfer.transfer_id,
            amount = %transfer.amount,
            interval_seconds = transfer.interval_seconds,
            "scheduled transfer created"
        );

        Ok(transfer)
    }

    pub async fn get(&self, owner: &str, transfer_id: Uuid) -> Result<TransferView> {
        let transfer = self.store.get(owner, transfer_id).await?;
        let totals = self.totals(owner, transfer_id).await?;
        Ok(TransferView::at(transfer, totals, self.clock.now()))
    }

    /// All transfers in creation order, labelled against the current time
    pub async fn list(&self, owner: &str) -> Result<Vec<TransferView>> {
        let now = self.clock.now();
        let transfers = self.store.list(owner).await?;

        let mut views = Vec::with_capacity(transfers.len());
        for transfer in transfers {
            let totals = self.totals(owner, transfer.transfer_id).await?;
            views.push(TransferView::at(transfer, totals, now));
        }
        Ok(views)
    }

    /// Active transfers whose next execution time has passed
    pub async fn due(&self, owner: &str) -> Result<Vec<TransferView>> {
        Ok(
            self
                .list(owner).await?
                .into_iter()
                .filter(|view| view.is_due)
                .collect()
        )
    }

    /// Cancel a transfer. One-way; an execution already awaiting payment
    /// is not interrupted.
    pub async fn cancel(&self, owner: &str, transfer_id: Uuid) -> Result<()> {
        self.store.remove(owner, transfer_id).await?;
        tracing::info!(owner, transfer_id = %transfer_id, "scheduled transfer cancelled");
        Ok(())
    }

    async fn totals(&self, owner: &str, transfer_id: Uuid) -> Result<ExecutionTotals> {
        let history = self.store.list_executions(owner, transfer_id).await?;
        Ok(ExecutionTotals::from_history(&history))
    }
}

/// Base58 string decoding to a 32-byte public key.
pub fn validate_address(address: &str) -> bool {
    matches!(bs58::decode(address).into_vec(), Ok(bytes) if bytes.len() == 32)
}

fn validate_new_transfer(owner: &str, input: &NewTransfer) -> Result<()> {
    if !validate_address(owner) {
        return Err(AppError::InvalidInput(format!("Invalid owner address: {}", owner)));
    }

    let recipient = input.recipient_address.trim();
    if recipient.is_empty() {
        return Err(AppError::InvalidInput("Recipient address is required".to_string()));
    }
    if !validate_address(recipient) {
        return Err(AppError::InvalidInput(format!("Invalid recipient address: {}", recipient)));
    }
    if recipient == owner {
        return Err(AppError::InvalidInput("Recipient must differ from the owner".to_string()));
    }

    if input.amount <= Decimal::ZERO {
        return Err(AppError::InvalidInput("Amount must be greater than zero".to_string()));
    }
    if input.amount.normalize().scale() > USDC_DECIMALS {
        return Err(
            AppError::InvalidInput(
                format!("Amount has more than {} decimal places", USDC_DECIMALS)
            )
        );
    }

    if TransferInterval::from_seconds(input.interval_seconds).is_none() {
        return Err(
            AppError::InvalidInput(
                format!(
                    "Unsupported interval: {}s. Supported: hourly, daily, weekly, monthly",
                    input.interval_seconds
                )
            )
        );
    }

    if let Some(memo) = &input.memo {
        if memo.chars().count() > MAX_MEMO_CHARS {
            return Err(
                AppError::InvalidInput(format!("Memo exceeds {} characters", MAX_MEMO_CHARS))
            );
        }
    }

    if let Some(name) = &input.recipient_name {
        if name.chars().count() > MAX_RECIPIENT_NAME_CHARS {
            return Err(
                AppError::InvalidInput(
                    format!("Recipient name exceeds {} characters", MAX_RECIPIENT_NAME_CHARS)
                )
            );
        }
    }

    Ok(())
}

fn shorten_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..4], &address[address.len() - 4..])
}
