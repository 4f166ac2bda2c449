use {
    crate::domain::{
        booking::BookingRef,
        error::PaymentError,
        id::{OrderId, PaymentId, RefundId},
        money::{Currency, Money, MoneyAmount},
        payment::{MethodInfo, NewPayment, Payment, PaymentStatus},
    },
    sqlx::{Postgres, Row, Transaction, postgres::PgRow},
    uuid::Uuid,
};

const COLUMNS: &str = "id, order_id, payment_id, amount, currency, status, \
     method, card_last4, card_network, email, contact, \
     booking_kind, appointment_id, lab_test_id, \
     error_message, refund_id, refund_reason, \
     created_at, completed_at, refunded_at";

fn payment_from_row(row: &PgRow) -> Result<Payment, PaymentError> {
    let status: String = row.try_get("status")?;
    let currency: String = row.try_get("currency")?;
    let amount: i64 = row.try_get("amount")?;
    let booking_kind: String = row.try_get("booking_kind")?;

    let method = row
        .try_get::<Option<String>, _>("method")?
        .map(|method| -> Result<MethodInfo, PaymentError> {
            Ok(MethodInfo {
                method,
                card_last4: row.try_get("card_last4")?,
                card_network: row.try_get("card_network")?,
            })
        })
        .transpose()?;

    Ok(Payment {
        id: row.try_get("id")?,
        order_id: OrderId::new(row.try_get::<String, _>("order_id")?)?,
        payment_id: row
            .try_get::<Option<String>, _>("payment_id")?
            .map(PaymentId::new)
            .transpose()?,
        money: Money::new(MoneyAmount::new(amount)?, Currency::try_from(currency.as_str())?),
        status: PaymentStatus::try_from(status.as_str())?,
        method,
        email: row.try_get("email")?,
        contact: row.try_get("contact")?,
        booking: BookingRef::from_columns(
            &booking_kind,
            row.try_get("appointment_id")?,
            row.try_get("lab_test_id")?,
        )?,
        error_message: row.try_get("error_message")?,
        refund_id: row
            .try_get::<Option<String>, _>("refund_id")?
            .map(RefundId::new)
            .transpose()?,
        refund_reason: row.try_get("refund_reason")?,
        created_at: row.try_get("created_at")?,
        completed_at: row.try_get("completed_at")?,
        refunded_at: row.try_get("refunded_at")?,
    })
}

pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    payment: &NewPayment,
) -> Result<(), PaymentError> {
    let (appointment_id, lab_test_id) = match payment.booking {
        BookingRef::Appointment(id) => (Some(id), None),
        BookingRef::LabTest(id) => (None, Some(id)),
    };

    sqlx::query(
        r#"
        INSERT INTO payments
            (id, order_id, amount, currency, status, email, contact,
             booking_kind, appointment_id, lab_test_id)
        VALUES ($1, $2, $3, $4, 'created', $5, $6, $7, $8, $9)
        "#,
    )
    .bind(payment.id)
    .bind(payment.order_id.as_str())
    .bind(payment.money.amount().minor())
    .bind(payment.money.currency().as_str())
    .bind(&payment.email)
    .bind(&payment.contact)
    .bind(payment.booking.kind())
    .bind(appointment_id)
    .bind(lab_test_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn get_by_order_id(
    executor: impl sqlx::PgExecutor<'_>,
    order_id: &OrderId,
) -> Result<Option<Payment>, PaymentError> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM payments WHERE order_id = $1"))
        .bind(order_id.as_str())
        .fetch_optional(executor)
        .await?;
    row.as_ref().map(payment_from_row).transpose()
}

pub async fn get_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: Uuid,
) -> Result<Option<Payment>, PaymentError> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM payments WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    row.as_ref().map(payment_from_row).transpose()
}

/// Method columns use COALESCE so a metadata-free signal (the client
/// verification path) never erases what the webhook already recorded.
pub async fn mark_authorized(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    payment_id: &PaymentId,
    method: Option<&MethodInfo>,
) -> Result<(), PaymentError> {
    sqlx::query(
        r#"
        UPDATE payments
        SET status = 'authorized', payment_id = $1,
            method = COALESCE($2, method),
            card_last4 = COALESCE($3, card_last4),
            card_network = COALESCE($4, card_network),
            updated_at = now()
        WHERE id = $5
        "#,
    )
    .bind(payment_id.as_str())
    .bind(method.map(|m| m.method.as_str()))
    .bind(method.and_then(|m| m.card_last4.as_deref()))
    .bind(method.and_then(|m| m.card_network.as_deref()))
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn mark_captured(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    payment_id: &PaymentId,
    method: Option<&MethodInfo>,
) -> Result<(), PaymentError> {
    sqlx::query(
        r#"
        UPDATE payments
        SET status = 'captured', payment_id = $1,
            method = COALESCE($2, method),
            card_last4 = COALESCE($3, card_last4),
            card_network = COALESCE($4, card_network),
            completed_at = now(), updated_at = now()
        WHERE id = $5
        "#,
    )
    .bind(payment_id.as_str())
    .bind(method.map(|m| m.method.as_str()))
    .bind(method.and_then(|m| m.card_last4.as_deref()))
    .bind(method.and_then(|m| m.card_network.as_deref()))
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn mark_failed(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    payment_id: Option<&PaymentId>,
    error: &str,
) -> Result<(), PaymentError> {
    sqlx::query(
        r#"
        UPDATE payments
        SET status = 'failed', payment_id = COALESCE($1, payment_id),
            error_message = $2, updated_at = now()
        WHERE id = $3
        "#,
    )
    .bind(payment_id.map(PaymentId::as_str))
    .bind(error)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn mark_refund_initiated(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    refund_id: &RefundId,
    reason: &str,
) -> Result<(), PaymentError> {
    sqlx::query(
        r#"
        UPDATE payments
        SET status = 'refund_initiated', refund_id = $1, refund_reason = $2,
            updated_at = now()
        WHERE id = $3
        "#,
    )
    .bind(refund_id.as_str())
    .bind(reason)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn mark_refunded(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<(), PaymentError> {
    sqlx::query(
        "UPDATE payments SET status = 'refunded', refunded_at = now(), updated_at = now() WHERE id = $1",
    )
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
