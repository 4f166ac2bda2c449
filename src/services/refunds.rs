use {
    crate::domain::{
        error::PaymentError,
        notify::PaymentNotifier,
        payment::{Payment, PaymentEvent, PaymentStatus},
    },
    crate::gateway::PaymentGateway,
    crate::infra::postgres::payment_repo,
    crate::services::transitions::{self, ApplyOutcome},
    sqlx::PgPool,
    uuid::Uuid,
};

const ACTOR: &str = "api:refund";

/// Initiate a refund for a captured payment. The precondition is
/// checked before the gateway call so an illegal request never reaches
/// the network, and re-checked under the row lock when the transition
/// applies. A gateway failure leaves the payment captured.
pub async fn refund(
    pool: &PgPool,
    gateway: &dyn PaymentGateway,
    notifier: &dyn PaymentNotifier,
    payment_id: Uuid,
    reason: String,
) -> Result<Payment, PaymentError> {
    let payment = payment_repo::get_by_id(pool, payment_id)
        .await?
        .ok_or(PaymentError::NotFound)?;

    if payment.status != PaymentStatus::Captured {
        return Err(PaymentError::IllegalTransition {
            from: payment.status,
            to: PaymentStatus::RefundInitiated,
        });
    }
    let gateway_payment_id = payment.payment_id.clone().ok_or_else(|| {
        PaymentError::Validation("captured payment has no gateway payment id".into())
    })?;

    // Network I/O with no lock held.
    let remote = gateway
        .create_refund(gateway_payment_id, payment.money.amount(), reason.clone())
        .await?;

    let outcome = transitions::apply_event(
        pool,
        &payment.order_id,
        &PaymentEvent::RefundInitiated {
            refund_id: remote.refund_id,
            reason,
        },
        ACTOR,
    )
    .await?;
    let mut current = outcome.into_payment();

    // Some refunds settle synchronously; the rest finalize when the
    // refund.processed webhook lands.
    if remote.processed {
        match transitions::apply_event(pool, &payment.order_id, &PaymentEvent::Refunded, ACTOR)
            .await?
        {
            ApplyOutcome::Transitioned(p) => {
                transitions::notify_transition(notifier, &p).await;
                current = p;
            }
            ApplyOutcome::Unchanged(p) => current = p,
        }
    }

    tracing::info!(
        order_id = %current.order_id,
        status = %current.status,
        "refund initiated"
    );
    Ok(current)
}
