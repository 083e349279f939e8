pub mod payment_store_gateway;
pub mod payment_webhook;
pub mod payments;
pub mod plan_activation;

#[cfg(test)]
pub(crate) mod test_support;
