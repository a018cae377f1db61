pub mod transfer_service;
pub mod execution_service;

pub use transfer_service::{ TransferService, TransferView };
pub use execution_service::{ ExecutionGuard, ExecutionService };
