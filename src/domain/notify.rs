use {
    super::booking::BookingRef,
    std::{future::Future, pin::Pin},
};

/// Outbound "payment happened" events, consumed by receipt and reporting
/// collaborators. Fire-and-forget: a failed notification must never fail
/// the payment transition it follows, so implementations return nothing
/// and log their own trouble.
pub trait PaymentNotifier: Send + Sync {
    fn payment_captured(&self, booking: BookingRef)
    -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    fn payment_failed(
        &self,
        booking: BookingRef,
        reason: &str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    fn payment_refunded(
        &self,
        booking: BookingRef,
        reason: &str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Default sink: structured log lines that downstream collectors pick up.
pub struct LogNotifier;

impl PaymentNotifier for LogNotifier {
    fn payment_captured(
        &self,
        booking: BookingRef,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            tracing::info!(kind = booking.kind(), target = %booking.target(), "payment captured");
        })
    }

    fn payment_failed(
        &self,
        booking: BookingRef,
        reason: &str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        let reason = reason.to_string();
        Box::pin(async move {
            tracing::info!(kind = booking.kind(), target = %booking.target(), %reason, "payment failed");
        })
    }

    fn payment_refunded(
        &self,
        booking: BookingRef,
        reason: &str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        let reason = reason.to_string();
        Box::pin(async move {
            tracing::info!(kind = booking.kind(), target = %booking.target(), %reason, "payment refunded");
        })
    }
}
