pub mod mock;
pub mod razorpay;
pub mod signature;

use {
    crate::domain::{
        error::PaymentError,
        id::{OrderId, PaymentId, RefundId},
        money::{Currency, MoneyAmount},
    },
    std::{future::Future, pin::Pin},
};

/// Remote order as the gateway reports it back.
#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub order_id: OrderId,
}

/// Remote refund. `processed` is true when the gateway settled the
/// refund synchronously; otherwise a `refund.processed` webhook follows.
#[derive(Debug, Clone)]
pub struct GatewayRefund {
    pub refund_id: RefundId,
    pub processed: bool,
}

/// The external payment processor. Both calls are network I/O with
/// bounded timeouts and are never made while a payment row lock is held.
pub trait PaymentGateway: Send + Sync {
    fn create_order(
        &self,
        amount: MoneyAmount,
        currency: Currency,
        receipt: String,
    ) -> Pin<Box<dyn Future<Output = Result<GatewayOrder, PaymentError>> + Send + '_>>;

    fn create_refund(
        &self,
        payment_id: PaymentId,
        amount: MoneyAmount,
        reason: String,
    ) -> Pin<Box<dyn Future<Output = Result<GatewayRefund, PaymentError>> + Send + '_>>;
}
