pub mod companies;
pub mod payments;
