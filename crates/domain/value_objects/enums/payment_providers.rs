use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// External payment processors that deliver webhooks to this service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    /// PIX charges.
    OpenPix,
    /// Card and boleto charges.
    Asaas,
}

impl PaymentProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentProvider::OpenPix => "openpix",
            PaymentProvider::Asaas => "asaas",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "openpix" => Some(PaymentProvider::OpenPix),
            "asaas" => Some(PaymentProvider::Asaas),
            _ => None,
        }
    }
}

impl Display for PaymentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
