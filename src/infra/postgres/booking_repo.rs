use {
    crate::domain::{
        booking::BookingRef,
        error::PaymentError,
        money::{Currency, Money, MoneyAmount},
    },
    sqlx::{Postgres, Row, Transaction},
};

/// What the payment core needs to know about a booking: its price and
/// whether it has already been paid for. The rest of the booking's
/// shape belongs to the scheduling collaborators.
#[derive(Debug, Clone)]
pub struct BookingState {
    pub money: Money,
    pub paid: bool,
}

fn table(booking: &BookingRef) -> &'static str {
    match booking {
        BookingRef::Appointment(_) => "appointments",
        BookingRef::LabTest(_) => "lab_test_bookings",
    }
}

pub async fn get(
    executor: impl sqlx::PgExecutor<'_>,
    booking: &BookingRef,
) -> Result<Option<BookingState>, PaymentError> {
    let sql = format!("SELECT amount, currency, paid FROM {} WHERE id = $1", table(booking));
    let row = sqlx::query(&sql)
        .bind(booking.target())
        .fetch_optional(executor)
        .await?;

    row.map(|r| {
        let amount: i64 = r.try_get("amount")?;
        let currency: String = r.try_get("currency")?;
        Ok(BookingState {
            money: Money::new(MoneyAmount::new(amount)?, Currency::try_from(currency.as_str())?),
            paid: r.try_get("paid")?,
        })
    })
    .transpose()
}

/// Flip the booking's paid flag. Called only from within a capture
/// transition's transaction, so the two commit or roll back together.
/// The flag is never reverted here — a refund is surfaced separately.
pub async fn mark_paid(
    tx: &mut Transaction<'_, Postgres>,
    booking: &BookingRef,
) -> Result<(), PaymentError> {
    let sql = format!("UPDATE {} SET paid = true WHERE id = $1", table(booking));
    let result = sqlx::query(&sql)
        .bind(booking.target())
        .execute(&mut **tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(PaymentError::BookingUpdateFailed(format!(
            "{} {} not found",
            booking.kind(),
            booking.target()
        )));
    }
    Ok(())
}
