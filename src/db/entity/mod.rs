pub mod scheduled_transfer;
pub mod transfer_execution;
