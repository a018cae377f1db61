use std::fmt;
use std::str::FromStr;

use serde::{ Deserialize, Serialize };

use crate::error::AppError;

// ─── TransferInterval ───────────────────────────────────────────────

/// Recurrence periods a scheduled transfer can be created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferInterval {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl TransferInterval {
    pub const HOURLY_SECONDS: i64 = 3_600;
    pub const DAILY_SECONDS: i64 = 86_400;
    pub const WEEKLY_SECONDS: i64 = 604_800;
    /// Fixed 30-day month, no calendar arithmetic.
    pub const MONTHLY_SECONDS: i64 = 2_592_000;

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferInterval::Hourly => "hourly",
            TransferInterval::Daily => "daily",
            TransferInterval::Weekly => "weekly",
            TransferInterval::Monthly => "monthly",
        }
    }

    pub fn seconds(&self) -> i64 {
        match self {
            TransferInterval::Hourly => Self::HOURLY_SECONDS,
            TransferInterval::Daily => Self::DAILY_SECONDS,
            TransferInterval::Weekly => Self::WEEKLY_SECONDS,
            TransferInterval::Monthly => Self::MONTHLY_SECONDS,
        }
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            TransferInterval::Hourly => "Hourly",
            TransferInterval::Daily => "Daily",
            TransferInterval::Weekly => "Weekly",
            TransferInterval::Monthly => "Monthly",
        }
    }

    pub fn from_seconds(seconds: i64) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|interval| interval.seconds() == seconds)
    }

    pub fn all() -> &'static [TransferInterval] {
        &[
            TransferInterval::Hourly,
            TransferInterval::Daily,
            TransferInterval::Weekly,
            TransferInterval::Monthly,
        ]
    }
}

impl fmt::Display for TransferInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferInterval {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hourly" | "hour" => Ok(TransferInterval::Hourly),
            "daily" | "day" => Ok(TransferInterval::Daily),
            "weekly" | "week" => Ok(TransferInterval::Weekly),
            "monthly" | "month" => Ok(TransferInterval::Monthly),
            other =>
                other
                    .parse::<i64>()
                    .ok()
                    .and_then(TransferInterval::from_seconds)
                    .ok_or_else(|| {
                        AppError::InvalidInput(
                            format!(
                                "Unsupported interval: {}. Supported: hourly, daily, weekly, monthly",
                                s
                            )
                        )
                    }),
        }
    }
}

// ─── ExecutionStatus ────────────────────────────────────────────────

/// Outcome of a single execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Completed,
    /// The relay sent less than requested; the transfer stays due.
    Partial,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Partial => "partial",
            ExecutionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completed" => Ok(ExecutionStatus::Completed),
            "partial" => Ok(ExecutionStatus::Partial),
            "failed" => Ok(ExecutionStatus::Failed),
            _ => Err(AppError::InvalidInput(format!("Invalid execution status: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_from_seconds() {
        assert_eq!(TransferInterval::from_seconds(86_400), Some(TransferInterval::Daily));
        assert_eq!(TransferInterval::from_seconds(2_592_000), Some(TransferInterval::Monthly));
        assert_eq!(TransferInterval::from_seconds(90), None);
    }

    #[test]
    fn test_interval_from_str() {
        assert_eq!("HOURLY".parse::<TransferInterval>().unwrap(), TransferInterval::Hourly);
        assert_eq!("weekly".parse::<TransferInterval>().unwrap(), TransferInterval::Weekly);
        assert_eq!("604800".parse::<TransferInterval>().unwrap(), TransferInterval::Weekly);
        assert!("yearly".parse::<TransferInterval>().is_err());
        assert!("120".parse::<TransferInterval>().is_err());
    }

    #[test]
    fn test_execution_status_round_trip() {
        for status in [ExecutionStatus::Completed, ExecutionStatus::Partial, ExecutionStatus::Failed] {
            assert_eq!(status.as_str().parse::<ExecutionStatus>().unwrap(), status);
        }
    }
}
