pub mod providers;
pub mod signature;
