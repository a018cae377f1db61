use async_trait::async_trait;
use sea_orm::prelude::Decimal;

use crate::error::Result;

/// What the payment rail reports back for a settled transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    pub transaction_id: String,
    /// Amount the rail says it sent, when it reports one.
    pub amount: Option<Decimal>,
    pub fee: Option<Decimal>,
    /// The rail could only send part of the requested amount.
    pub is_partial: bool,
}

/// Reports how much of an owner's private balance can be spent.
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    async fn available_balance(&self, owner: &str) -> Result<Decimal>;
}

/// Withdraws from the owner's private balance and sends to a recipient.
///
/// The call may take arbitrarily long and may fail for reasons opaque to
/// the caller (user rejection, network, relayer errors).
#[async_trait]
pub trait PaymentRail: Send + Sync {
    async fn send_private(
        &self,
        owner: &str,
        recipient: &str,
        amount: Decimal
    ) -> Result<PaymentReceipt>;
}
