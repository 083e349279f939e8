pub mod enums;
pub mod payment_webhook;
pub mod payments;
