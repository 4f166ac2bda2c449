use {
    crate::domain::{error::PaymentError, id::EventId},
    sqlx::{Postgres, Transaction},
    uuid::Uuid,
};

/// Record a webhook delivery. Returns false when the event id was seen
/// before — the caller must then treat the whole delivery as a no-op.
/// Runs inside the same transaction as the state transition, so a crash
/// between transition and record cannot happen.
pub async fn insert_processed(
    tx: &mut Transaction<'_, Postgres>,
    event_id: &EventId,
    payment_id: Option<Uuid>,
) -> Result<bool, PaymentError> {
    let result = sqlx::query(
        r#"
        INSERT INTO processed_webhook_events (event_id, payment_id)
        VALUES ($1, $2)
        ON CONFLICT (event_id) DO NOTHING
        "#,
    )
    .bind(event_id.as_str())
    .bind(payment_id)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() > 0)
}
