use {
    super::{GatewayOrder, GatewayRefund, PaymentGateway},
    crate::domain::{
        error::PaymentError,
        id::{OrderId, PaymentId, RefundId},
        money::{Currency, MoneyAmount},
    },
    std::{
        future::Future,
        pin::Pin,
        sync::atomic::{AtomicUsize, Ordering},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    Succeed,
    Fail,
}

/// Scripted gateway for tests: counts calls so tests can assert that a
/// rejected precondition never reached the network.
pub struct MockGateway {
    behavior: MockBehavior,
    /// Whether refunds settle synchronously or wait for a webhook.
    refund_completes: bool,
    order_calls: AtomicUsize,
    refund_calls: AtomicUsize,
}

impl MockGateway {
    pub fn succeeding() -> Self {
        Self::with_behavior(MockBehavior::Succeed, false)
    }

    pub fn failing() -> Self {
        Self::with_behavior(MockBehavior::Fail, false)
    }

    pub fn with_behavior(behavior: MockBehavior, refund_completes: bool) -> Self {
        Self {
            behavior,
            refund_completes,
            order_calls: AtomicUsize::new(0),
            refund_calls: AtomicUsize::new(0),
        }
    }

    pub fn order_calls(&self) -> usize {
        self.order_calls.load(Ordering::SeqCst)
    }

    pub fn refund_calls(&self) -> usize {
        self.refund_calls.load(Ordering::SeqCst)
    }
}

impl PaymentGateway for MockGateway {
    fn create_order(
        &self,
        _amount: MoneyAmount,
        _currency: Currency,
        _receipt: String,
    ) -> Pin<Box<dyn Future<Output = Result<GatewayOrder, PaymentError>> + Send + '_>> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior;
        Box::pin(async move {
            match behavior {
                MockBehavior::Fail => {
                    Err(PaymentError::GatewayUnavailable("mock outage".into()))
                }
                MockBehavior::Succeed => Ok(GatewayOrder {
                    order_id: OrderId::new(format!("order_{}", uuid::Uuid::now_v7().simple()))?,
                }),
            }
        })
    }

    fn create_refund(
        &self,
        _payment_id: PaymentId,
        _amount: MoneyAmount,
        _reason: String,
    ) -> Pin<Box<dyn Future<Output = Result<GatewayRefund, PaymentError>> + Send + '_>> {
        self.refund_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior;
        let processed = self.refund_completes;
        Box::pin(async move {
            match behavior {
                MockBehavior::Fail => {
                    Err(PaymentError::GatewayUnavailable("mock outage".into()))
                }
                MockBehavior::Succeed => Ok(GatewayRefund {
                    refund_id: RefundId::new(format!("rfnd_{}", uuid::Uuid::now_v7().simple()))?,
                    processed,
                }),
            }
        })
    }
}
