pub mod config;
pub mod enums;
pub mod error;
pub mod clock;
pub mod models;
pub mod schedule;
pub mod db;
pub mod providers;
pub mod services;
pub mod api;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use enums::{ ExecutionStatus, TransferInterval };
pub use error::{ AppError, Result };
pub use models::{
    ExecutionReceipt,
    ExecutionRecord,
    ExecutionTotals,
    LastExecution,
    NewTransfer,
    ScheduledTransfer,
};
