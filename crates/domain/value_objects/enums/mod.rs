pub mod payment_methods;
pub mod payment_providers;
pub mod payment_statuses;
