use {
    crate::domain::{
        error::PaymentError,
        id::OrderId,
        notify::PaymentNotifier,
        payment::{Payment, PaymentEvent, PaymentStatus},
    },
    crate::infra::postgres::{
        audit_repo::{self, NewAuditEntry},
        booking_repo, payment_repo,
    },
    sqlx::{PgPool, Postgres, Transaction},
};

#[derive(Debug)]
pub enum ApplyOutcome {
    /// The event moved the payment to a new status.
    Transitioned(Payment),
    /// The payment was already at the event's target status — a legal
    /// no-op, which is what makes duplicate deliveries and the
    /// webhook/client-verification race safe.
    Unchanged(Payment),
}

impl ApplyOutcome {
    pub fn into_payment(self) -> Payment {
        match self {
            Self::Transitioned(p) | Self::Unchanged(p) => p,
        }
    }
}

/// Open a transaction holding the per-order advisory lock. All
/// transitions for one payment serialize through this lock; callers must
/// never hold it across a gateway call.
pub async fn begin_locked<'a>(
    pool: &PgPool,
    order_id: &OrderId,
) -> Result<Transaction<'a, Postgres>, PaymentError> {
    let mut tx = pool.begin().await?;

    sqlx::query("SET LOCAL lock_timeout = '5s'")
        .execute(&mut *tx)
        .await?;

    // Advisory lock works even before the row exists — no gap lock
    // issue, no insert race, no retry needed.
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(order_id.as_str())
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}

/// The single authoritative transition point. `payment` must have been
/// loaded inside `tx` (under the advisory lock), so the status checked
/// here is the status the update applies to.
///
/// A capture also flips the booking's paid flag in the same transaction:
/// money captured with the booking left unpaid is a correctness
/// violation, so the two succeed or fail together.
pub async fn apply_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    payment: &Payment,
    event: &PaymentEvent,
    actor: &str,
) -> Result<ApplyOutcome, PaymentError> {
    let target = event.target_status();

    if payment.status == target {
        return Ok(ApplyOutcome::Unchanged(payment.clone()));
    }
    if !payment.status.can_transition_to(&target) {
        return Err(PaymentError::IllegalTransition {
            from: payment.status,
            to: target,
        });
    }

    match event {
        PaymentEvent::Authorized { payment_id, method } => {
            payment_repo::mark_authorized(tx, payment.id, payment_id, method.as_ref()).await?;
        }
        PaymentEvent::Captured {
            payment_id,
            amount,
            method,
        } => {
            if let Some(amount) = amount {
                if *amount != payment.money.amount() {
                    return Err(PaymentError::Validation(format!(
                        "captured amount {amount} does not match order amount {}",
                        payment.money.amount()
                    )));
                }
            }
            payment_repo::mark_captured(tx, payment.id, payment_id, method.as_ref()).await?;
            booking_repo::mark_paid(tx, &payment.booking).await?;
        }
        PaymentEvent::Failed { payment_id, error } => {
            payment_repo::mark_failed(tx, payment.id, payment_id.as_ref(), error).await?;
        }
        PaymentEvent::RefundInitiated { refund_id, reason } => {
            payment_repo::mark_refund_initiated(tx, payment.id, refund_id, reason).await?;
        }
        PaymentEvent::Refunded => {
            payment_repo::mark_refunded(tx, payment.id).await?;
        }
    }

    let mut audit = NewAuditEntry::payment(
        payment.id,
        payment.order_id.as_str(),
        "status_changed",
        actor,
    );
    audit.detail = serde_json::json!({
        "old_status": payment.status.as_str(),
        "new_status": target.as_str(),
    });
    audit_repo::insert_audit_entry(tx, &audit).await?;

    let updated = payment_repo::get_by_id(&mut **tx, payment.id)
        .await?
        .ok_or(PaymentError::NotFound)?;
    Ok(ApplyOutcome::Transitioned(updated))
}

/// Lock, load, apply, commit — the path used by the client verification
/// handler and the refund processor. The webhook processor composes the
/// same pieces itself because it interleaves the idempotency record.
pub async fn apply_event(
    pool: &PgPool,
    order_id: &OrderId,
    event: &PaymentEvent,
    actor: &str,
) -> Result<ApplyOutcome, PaymentError> {
    let mut tx = begin_locked(pool, order_id).await?;
    let payment = payment_repo::get_by_order_id(&mut *tx, order_id)
        .await?
        .ok_or(PaymentError::NotFound)?;

    let outcome = apply_in_tx(&mut tx, &payment, event, actor).await?;
    tx.commit().await?;
    Ok(outcome)
}

/// Emit the outbound notification for a transition that just committed.
/// Only terminal facts are announced; duplicates never re-announce
/// because callers only pass `Transitioned` payments here.
pub async fn notify_transition(notifier: &dyn PaymentNotifier, payment: &Payment) {
    match payment.status {
        PaymentStatus::Captured => notifier.payment_captured(payment.booking).await,
        PaymentStatus::Failed => {
            let reason = payment.error_message.as_deref().unwrap_or("unknown");
            notifier.payment_failed(payment.booking, reason).await;
        }
        PaymentStatus::Refunded => {
            let reason = payment.refund_reason.as_deref().unwrap_or("unknown");
            notifier.payment_refunded(payment.booking, reason).await;
        }
        _ => {}
    }
}
