use {
    crate::domain::{
        error::PaymentError,
        id::{EventId, OrderId, PaymentId, RefundId},
        money::MoneyAmount,
        notify::PaymentNotifier,
        payment::{MethodInfo, PaymentEvent},
    },
    crate::infra::postgres::{
        audit_repo::{self, NewAuditEntry},
        event_repo, payment_repo,
    },
    crate::services::transitions::{self, ApplyOutcome},
    serde::Deserialize,
    sqlx::PgPool,
    uuid::Uuid,
};

const ACTOR: &str = "webhook:razorpay";

/// Closed dispatch over the gateway's event vocabulary. Adding a kind
/// means adding a variant — the compiler then walks every match arm.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    PaymentAuthorized {
        order_id: OrderId,
        payment_id: PaymentId,
        method: Option<MethodInfo>,
    },
    PaymentCaptured {
        order_id: OrderId,
        payment_id: PaymentId,
        amount: MoneyAmount,
        method: Option<MethodInfo>,
    },
    PaymentFailed {
        order_id: OrderId,
        payment_id: Option<PaymentId>,
        error: String,
    },
    RefundProcessed {
        order_id: OrderId,
        refund_id: RefundId,
    },
    /// Kinds we do not consume. Recorded and acknowledged so the
    /// gateway stops redelivering, never silently dropped.
    Unrecognized { event_type: String },
}

impl WebhookEvent {
    pub fn kind(&self) -> &str {
        match self {
            Self::PaymentAuthorized { .. } => "payment.authorized",
            Self::PaymentCaptured { .. } => "payment.captured",
            Self::PaymentFailed { .. } => "payment.failed",
            Self::RefundProcessed { .. } => "refund.processed",
            Self::Unrecognized { event_type } => event_type,
        }
    }
}

#[derive(Debug)]
pub enum WebhookOutcome {
    /// Event drove a transition.
    Applied(Uuid),
    /// Payment was already at the target status.
    AlreadyApplied(Uuid),
    /// Event id seen before — at-least-once redelivery.
    Duplicate,
    /// Unconsumed kind or unknown order id — recorded, acknowledged.
    Ignored,
    /// Transition was illegal or the payload inconsistent — recorded,
    /// acknowledged, flagged for operators.
    Anomaly(Uuid),
}

// ── Wire shape ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    payload: Payload,
}

#[derive(Deserialize, Default)]
struct Payload {
    payment: Option<Wrapped<PaymentEntity>>,
    refund: Option<Wrapped<RefundEntity>>,
}

#[derive(Deserialize)]
struct Wrapped<T> {
    entity: T,
}

#[derive(Deserialize)]
struct PaymentEntity {
    id: String,
    order_id: String,
    amount: i64,
    method: Option<String>,
    card: Option<CardEntity>,
    error_description: Option<String>,
}

#[derive(Deserialize)]
struct CardEntity {
    last4: Option<String>,
    network: Option<String>,
}

#[derive(Deserialize)]
struct RefundEntity {
    id: String,
}

fn method_info(entity: &PaymentEntity) -> Option<MethodInfo> {
    entity.method.as_ref().map(|method| MethodInfo {
        method: method.clone(),
        card_last4: entity.card.as_ref().and_then(|c| c.last4.clone()),
        card_network: entity.card.as_ref().and_then(|c| c.network.clone()),
    })
}

fn payment_entity(payload: &Payload) -> Result<&PaymentEntity, PaymentError> {
    payload
        .payment
        .as_ref()
        .map(|w| &w.entity)
        .ok_or_else(|| PaymentError::Validation("event missing payment entity".into()))
}

/// Parse a raw webhook body into the closed event enum. Signature
/// verification has already happened — this only shapes bytes.
pub fn parse_event(body: &str) -> Result<WebhookEvent, PaymentError> {
    let envelope: Envelope = serde_json::from_str(body)?;

    match envelope.event.as_str() {
        "payment.authorized" => {
            let entity = payment_entity(&envelope.payload)?;
            Ok(WebhookEvent::PaymentAuthorized {
                order_id: OrderId::new(entity.order_id.clone())?,
                payment_id: PaymentId::new(entity.id.clone())?,
                method: method_info(entity),
            })
        }
        "payment.captured" => {
            let entity = payment_entity(&envelope.payload)?;
            Ok(WebhookEvent::PaymentCaptured {
                order_id: OrderId::new(entity.order_id.clone())?,
                payment_id: PaymentId::new(entity.id.clone())?,
                amount: MoneyAmount::new(entity.amount)?,
                method: method_info(entity),
            })
        }
        "payment.failed" => {
            let entity = payment_entity(&envelope.payload)?;
            Ok(WebhookEvent::PaymentFailed {
                order_id: OrderId::new(entity.order_id.clone())?,
                payment_id: Some(PaymentId::new(entity.id.clone())?),
                error: entity
                    .error_description
                    .clone()
                    .unwrap_or_else(|| "payment failed".to_string()),
            })
        }
        "refund.processed" => {
            // The gateway ships the payment entity alongside the
            // refund, which is where the order id lives.
            let entity = payment_entity(&envelope.payload)?;
            let refund = envelope
                .payload
                .refund
                .as_ref()
                .ok_or_else(|| PaymentError::Validation("event missing refund entity".into()))?;
            Ok(WebhookEvent::RefundProcessed {
                order_id: OrderId::new(entity.order_id.clone())?,
                refund_id: RefundId::new(refund.entity.id.clone())?,
            })
        }
        other => Ok(WebhookEvent::Unrecognized {
            event_type: other.to_string(),
        }),
    }
}

fn to_payment_event(event: &WebhookEvent) -> Option<(OrderId, PaymentEvent)> {
    match event {
        WebhookEvent::PaymentAuthorized {
            order_id,
            payment_id,
            method,
        } => Some((
            order_id.clone(),
            PaymentEvent::Authorized {
                payment_id: payment_id.clone(),
                method: method.clone(),
            },
        )),
        WebhookEvent::PaymentCaptured {
            order_id,
            payment_id,
            amount,
            method,
        } => Some((
            order_id.clone(),
            PaymentEvent::Captured {
                payment_id: payment_id.clone(),
                amount: Some(*amount),
                method: method.clone(),
            },
        )),
        WebhookEvent::PaymentFailed {
            order_id,
            payment_id,
            error,
        } => Some((
            order_id.clone(),
            PaymentEvent::Failed {
                payment_id: payment_id.clone(),
                error: error.clone(),
            },
        )),
        WebhookEvent::RefundProcessed { order_id, .. } => {
            Some((order_id.clone(), PaymentEvent::Refunded))
        }
        WebhookEvent::Unrecognized { .. } => None,
    }
}

/// Drive one verified webhook delivery through dedup and the state
/// machine, all in a single advisory-locked transaction. Whatever the
/// outcome short of a database failure, the event id is recorded so the
/// gateway's at-least-once redelivery converges.
pub async fn process_event(
    pool: &PgPool,
    notifier: &dyn PaymentNotifier,
    event_id: &EventId,
    event: &WebhookEvent,
) -> Result<WebhookOutcome, PaymentError> {
    let Some((order_id, payment_event)) = to_payment_event(event) else {
        let WebhookEvent::Unrecognized { event_type } = event else {
            unreachable!("only unrecognized events lack a payment event");
        };
        return record_unmatched(pool, event_id, None, event_type).await;
    };

    let mut tx = transitions::begin_locked(pool, &order_id).await?;

    let Some(existing) = payment_repo::get_by_order_id(&mut *tx, &order_id).await? else {
        drop(tx);
        tracing::warn!(order_id = %order_id, "webhook for unknown order");
        return record_unmatched(pool, event_id, Some(order_id.as_str()), "unknown order").await;
    };

    let fresh = event_repo::insert_processed(&mut tx, event_id, Some(existing.id)).await?;
    if !fresh {
        tx.commit().await?;
        tracing::info!(event_id = %event_id, "duplicate event, already processed");
        return Ok(WebhookOutcome::Duplicate);
    }

    match transitions::apply_in_tx(&mut tx, &existing, &payment_event, ACTOR).await {
        Ok(ApplyOutcome::Transitioned(updated)) => {
            tx.commit().await?;
            tracing::info!(
                order_id = %order_id,
                status = %updated.status,
                "webhook applied"
            );
            transitions::notify_transition(notifier, &updated).await;
            Ok(WebhookOutcome::Applied(updated.id))
        }
        Ok(ApplyOutcome::Unchanged(p)) => {
            tx.commit().await?;
            Ok(WebhookOutcome::AlreadyApplied(p.id))
        }
        Err(
            err @ (PaymentError::IllegalTransition { .. } | PaymentError::Validation(_)),
        ) => {
            // No mutation happened. Keep the dedup row and flag the
            // event — rejecting it would only trigger more redelivery.
            let mut audit = NewAuditEntry::payment(
                existing.id,
                order_id.as_str(),
                "anomaly",
                ACTOR,
            );
            audit.event_id = Some(event_id.as_str().to_string());
            audit.detail = serde_json::json!({
                "current_status": existing.status.as_str(),
                "error": err.to_string(),
            });
            audit_repo::insert_audit_entry(&mut tx, &audit).await?;
            tx.commit().await?;

            tracing::warn!(
                order_id = %order_id,
                current = %existing.status,
                error = %err,
                "webhook event logged as anomaly"
            );
            Ok(WebhookOutcome::Anomaly(existing.id))
        }
        // Booking or database failure: the transaction rolls back,
        // nothing is recorded, and the gateway will redeliver.
        Err(err) => Err(err),
    }
}

async fn record_unmatched(
    pool: &PgPool,
    event_id: &EventId,
    order_id: Option<&str>,
    note: &str,
) -> Result<WebhookOutcome, PaymentError> {
    let mut tx = pool.begin().await?;
    let fresh = event_repo::insert_processed(&mut tx, event_id, None).await?;
    if !fresh {
        tx.commit().await?;
        return Ok(WebhookOutcome::Duplicate);
    }

    let audit = NewAuditEntry {
        id: Uuid::now_v7(),
        entity_type: "payment".to_string(),
        entity_id: None,
        order_id: order_id.map(str::to_string),
        event_id: Some(event_id.as_str().to_string()),
        action: "event_ignored".to_string(),
        actor: ACTOR.to_string(),
        detail: serde_json::json!({ "note": note }),
    };
    audit_repo::insert_audit_entry(&mut tx, &audit).await?;
    tx.commit().await?;

    tracing::info!(event_id = %event_id, note, "webhook event recorded without transition");
    Ok(WebhookOutcome::Ignored)
}
