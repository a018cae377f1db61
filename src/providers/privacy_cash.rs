use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::prelude::Decimal;
use serde::{ Deserialize, Serialize };

use super::{ BalanceProvider, PaymentRail, PaymentReceipt };
use crate::error::{ AppError, Result };

// Privacy Cash relay API structures
#[derive(Debug, Deserialize)]
struct BalanceResponse {
    balance: serde_json::Number,
}

#[derive(Debug, Serialize)]
struct WithdrawRequest<'a> {
    #[serde(rename = "walletAddress")]
    wallet_address: &'a str,
    amount: f64,
    #[serde(rename = "recipientAddress")]
    recipient_address: &'a str,
}

#[derive(Debug, Deserialize)]
struct WithdrawResponse {
    #[serde(default)]
    success: Option<bool>,
    tx: Option<String>,
    amount: Option<serde_json::Number>,
    #[serde(rename = "feeUsdc")]
    fee_usdc: Option<serde_json::Number>,
    #[serde(rename = "isPartial", default)]
    is_partial: bool,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the Privacy Cash relay: balance lookups and private
/// withdrawals to a recipient.
pub struct PrivacyCashClient {
    api_url: String,
    client: reqwest::Client,
}

impl PrivacyCashClient {
    pub fn new(api_url: &str, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client
            ::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => format!("Privacy Cash returned {}", status),
        }
    }
}

fn number_to_decimal(number: &serde_json::Number) -> Result<Decimal> {
    Decimal::from_str(&number.to_string()).map_err(|e|
        AppError::External(format!("Invalid amount '{}' from Privacy Cash: {}", number, e))
    )
}

fn receipt_from(body: WithdrawResponse) -> Result<PaymentReceipt> {
    if let Some(error) = body.error {
        return Err(AppError::PaymentExecution(error));
    }

    if body.success == Some(false) {
        return Err(AppError::PaymentExecution("Privacy Cash reported failure".to_string()));
    }

    let transaction_id = body.tx.ok_or_else(||
        AppError::PaymentExecution("Privacy Cash response missing transaction id".to_string())
    )?;

    let amount = body.amount.as_ref().map(number_to_decimal).transpose()?;
    let fee = body.fee_usdc.as_ref().map(number_to_decimal).transpose()?;

    Ok(PaymentReceipt {
        transaction_id,
        amount,
        fee,
        is_partial: body.is_partial,
    })
}

#[async_trait]
impl BalanceProvider for PrivacyCashClient {
    async fn available_balance(&self, owner: &str) -> Result<Decimal> {
        let url = format!("{}/balance", self.api_url);

        let response = self.client
            .get(&url)
            .query(&[("walletAddress", owner)])
            .send().await
            .map_err(|e| AppError::External(format!("Privacy Cash balance error: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::External(Self::error_message(response).await));
        }

        let body: BalanceResponse = response
            .json().await
            .map_err(|e| AppError::External(format!("Failed to parse balance response: {}", e)))?;

        number_to_decimal(&body.balance)
    }
}

#[async_trait]
impl PaymentRail for PrivacyCashClient {
    async fn send_private(
        &self,
        owner: &str,
        recipient: &str,
        amount: Decimal
    ) -> Result<PaymentReceipt> {
        let url = format!("{}/withdraw", self.api_url);
        let amount = amount
            .to_string()
            .parse::<f64>()
            .map_err(|e| AppError::InvalidInput(format!("Invalid amount: {}", e)))?;

        let request = WithdrawRequest {
            wallet_address: owner,
            amount,
            recipient_address: recipient,
        };

        tracing::debug!(owner, recipient, amount, "submitting Privacy Cash withdrawal");

        let response = self.client
            .post(&url)
            .json(&request)
            .send().await
            .map_err(|e| AppError::PaymentExecution(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::PaymentExecution(Self::error_message(response).await));
        }

        let body: WithdrawResponse = response
            .json().await
            .map_err(|e| {
                AppError::PaymentExecution(format!("Failed to parse withdraw response: {}", e))
            })?;

        receipt_from(body)
    }
}
