use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{error::PaymentError, id::EventId},
        gateway::signature,
        services::webhook::{self, WebhookOutcome},
    },
    axum::{Json, extract::State, http::HeaderMap},
    serde::Serialize,
};

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, PaymentError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| PaymentError::Validation(format!("missing {name} header")))
}

/// Asynchronous notification entry point. Only a bad signature is
/// rejected; everything else is acknowledged once recorded, so the
/// gateway's at-least-once redelivery terminates.
#[tracing::instrument(
    name = "webhook",
    skip_all,
    fields(event_id = tracing::field::Empty, event_type = tracing::field::Empty)
)]
pub async fn gateway_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookResponse>, ApiError> {
    let provided = header(&headers, "X-Razorpay-Signature")?;
    if !signature::verify(body.as_bytes(), provided, &state.keys.webhook_secret) {
        // Security event: the payload is untrusted and goes unparsed.
        tracing::warn!("webhook rejected: signature verification failed");
        return Err(PaymentError::SignatureInvalid.into());
    }

    let event_id = EventId::new(header(&headers, "X-Razorpay-Event-Id")?)?;
    let event = webhook::parse_event(&body)?;

    tracing::Span::current()
        .record("event_id", tracing::field::display(&event_id))
        .record("event_type", tracing::field::display(event.kind()));

    let outcome =
        webhook::process_event(&state.pool, state.notifier.as_ref(), &event_id, &event).await?;

    let status = match outcome {
        WebhookOutcome::Applied(_) => "processed",
        WebhookOutcome::AlreadyApplied(_) => "already_processed",
        WebhookOutcome::Duplicate => "duplicate",
        WebhookOutcome::Ignored => "ignored",
        WebhookOutcome::Anomaly(_) => "anomaly",
    };
    Ok(Json(WebhookResponse { status }))
}
