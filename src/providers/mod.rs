pub mod payment_rail;
pub mod privacy_cash;

pub use payment_rail::{ BalanceProvider, PaymentRail, PaymentReceipt };
pub use privacy_cash::PrivacyCashClient;
