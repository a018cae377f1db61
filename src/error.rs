use chrono::{ DateTime, Utc };
use sea_orm::prelude::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")] Database(#[from] sea_orm::DbErr),

    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("Scheduled transfer not found")]
    TransferNotFound,

    #[error("Scheduled transfer is not active")]
    TransferInactive,

    #[error("Scheduled transfer is not due until {next_execution_at}")] TransferNotDue {
        next_execution_at: DateTime<Utc>,
    },

    #[error("Insufficient balance: available {available}, required {required}")] InsufficientBalance {
        available: Decimal,
        required: Decimal,
    },

    #[error("An execution is already in progress for this transfer")]
    ConcurrentExecution,

    #[error("Payment failed: {0}")] PaymentExecution(String),

    #[error("Partial payment {transaction_id}: sent {sent} of {requested}")] PartialPayment {
        transaction_id: String,
        sent: Decimal,
        requested: Decimal,
    },

    #[error("Payment {transaction_id} settled but was not recorded: {message}")] PaymentNotRecorded {
        transaction_id: String,
        message: String,
    },

    #[error("External service error: {0}")] External(String),

    #[error("Configuration error: {0}")] Config(String),

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    /// Stable machine-readable code for the error.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::TransferNotFound => "TRANSFER_NOT_FOUND",
            AppError::TransferInactive => "TRANSFER_INACTIVE",
            AppError::TransferNotDue { .. } => "TRANSFER_NOT_DUE",
            AppError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            AppError::ConcurrentExecution => "CONCURRENT_EXECUTION",
            AppError::PaymentExecution(_) => "PAYMENT_FAILED",
            AppError::PartialPayment { .. } => "PARTIAL_PAYMENT",
            AppError::PaymentNotRecorded { .. } => "PAYMENT_NOT_RECORDED",
            AppError::External(_) => "EXTERNAL_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let field = match self {
            AppError::InsufficientBalance { .. } => Some("amount".to_string()),
            _ => None,
        };

        // Database internals stay out of client responses
        let message = match self {
            AppError::Database(_) => "Database error".to_string(),
            other => other.to_string(),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
                field,
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::TransferNotFound => axum::http::StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) | AppError::InsufficientBalance { .. } => {
                axum::http::StatusCode::BAD_REQUEST
            }
            | AppError::TransferInactive
            | AppError::TransferNotDue { .. }
            | AppError::ConcurrentExecution => axum::http::StatusCode::CONFLICT,
            | AppError::PaymentExecution(_)
            | AppError::PartialPayment { .. }
            | AppError::External(_) => {
                axum::http::StatusCode::BAD_GATEWAY
            }
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(code = self.code(), "request failed: {}", self);
        }

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::TransferNotFound.into_response().status(),
            axum::http::StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::ConcurrentExecution.into_response().status(),
            axum::http::StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::PaymentExecution("relayer offline".into()).into_response().status(),
            axum::http::StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::PartialPayment {
                transaction_id: "5abc".into(),
                sent: Decimal::new(20, 0),
                requested: Decimal::new(50, 0),
            }
                .into_response()
                .status(),
            axum::http::StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_unrecorded_payment_keeps_transaction_id() {
        let err = AppError::PaymentNotRecorded {
            transaction_id: "5abc".into(),
            message: "Database error".into(),
        };
        assert_eq!(err.code(), "PAYMENT_NOT_RECORDED");
        assert!(err.to_error_response().error.message.contains("5abc"));
        assert_eq!(err.into_response().status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_payment_message_is_kept_verbatim() {
        let response = AppError::PaymentExecution("User rejected the request".into())
            .to_error_response();
        assert_eq!(response.error.code, "PAYMENT_FAILED");
        assert_eq!(response.error.message, "Payment failed: User rejected the request");
    }
}
