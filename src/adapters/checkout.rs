use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{
            error::PaymentError,
            id::{OrderId, PaymentId},
            payment::{PaymentEvent, PaymentStatus},
        },
        gateway::signature,
        services::transitions::{self, ApplyOutcome},
    },
    axum::{Json, extract::State},
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub order_id: OrderId,
    pub payment_id: PaymentId,
    pub signature: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub order_id: OrderId,
    pub status: PaymentStatus,
}

/// Synchronous counterpart of the capture webhook, called by the client
/// right after checkout. Both paths converge on the same locked,
/// idempotent transition — whichever lands first wins and the other
/// becomes a no-op.
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let payload = signature::checkout_payload(&req.order_id, &req.payment_id);
    if !signature::verify(payload.as_bytes(), &req.signature, &state.keys.key_secret) {
        tracing::warn!(order_id = %req.order_id, "checkout verification with bad signature");
        return Err(PaymentError::SignatureInvalid.into());
    }

    let event = PaymentEvent::Captured {
        payment_id: req.payment_id,
        amount: None,
        method: None,
    };
    let outcome =
        transitions::apply_event(&state.pool, &req.order_id, &event, "client:checkout").await?;

    let payment = match outcome {
        ApplyOutcome::Transitioned(p) => {
            transitions::notify_transition(state.notifier.as_ref(), &p).await;
            p
        }
        ApplyOutcome::Unchanged(p) => p,
    };

    Ok(Json(VerifyResponse {
        order_id: payment.order_id,
        status: payment.status,
    }))
}
