use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::error::PaymentError;

/// Gateway order identifier (`order_xxx`).
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Result<Self, PaymentError> {
        let id = id.into();
        if !id.starts_with("order_") {
            return Err(PaymentError::Validation(format!(
                "OrderId must start with order_, got: {id}"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Gateway payment identifier (`pay_xxx`), assigned once the payer has
/// gone through checkout.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    pub fn new(id: impl Into<String>) -> Result<Self, PaymentError> {
        let id = id.into();
        if !id.starts_with("pay_") {
            return Err(PaymentError::Validation(format!(
                "PaymentId must start with pay_, got: {id}"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Gateway refund identifier (`rfnd_xxx`).
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefundId(String);

impl RefundId {
    pub fn new(id: impl Into<String>) -> Result<Self, PaymentError> {
        let id = id.into();
        if !id.starts_with("rfnd_") {
            return Err(PaymentError::Validation(format!(
                "RefundId must start with rfnd_, got: {id}"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Webhook delivery identifier. Opaque to us — the gateway promises
/// uniqueness per event, which is all the idempotency table needs.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Result<Self, PaymentError> {
        let id = id.into();
        if id.is_empty() || id.len() > 255 {
            return Err(PaymentError::Validation(
                "EventId must be non-empty and at most 255 chars".into(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
