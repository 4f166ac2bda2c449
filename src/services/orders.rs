use {
    crate::domain::{
        booking::BookingRef,
        error::PaymentError,
        id::OrderId,
        money::{Currency, Money, MoneyAmount},
        payment::NewPayment,
    },
    crate::gateway::PaymentGateway,
    crate::infra::postgres::{
        audit_repo::{self, NewAuditEntry},
        booking_repo, payment_repo,
    },
    sqlx::PgPool,
    uuid::Uuid,
};

#[derive(Debug)]
pub struct CreateOrder {
    pub booking: BookingRef,
    pub amount: MoneyAmount,
    pub currency: Currency,
    pub email: String,
    pub contact: String,
}

/// What the client needs to open the gateway's checkout.
#[derive(Debug)]
pub struct OrderCreated {
    pub order_id: OrderId,
    pub key_id: String,
    pub amount: MoneyAmount,
    pub currency: Currency,
}

/// Create a gateway order for an unpaid booking and persist the
/// `created` payment row. The gateway call happens first: if the remote
/// order never existed, no local row exists either, so retries are safe
/// and there are no orphaned rows to reconcile.
pub async fn create_order(
    pool: &PgPool,
    gateway: &dyn PaymentGateway,
    key_id: &str,
    req: CreateOrder,
) -> Result<OrderCreated, PaymentError> {
    let booking = booking_repo::get(pool, &req.booking)
        .await?
        .ok_or_else(|| {
            PaymentError::Validation(format!(
                "{} {} not found",
                req.booking.kind(),
                req.booking.target()
            ))
        })?;

    if booking.paid {
        return Err(PaymentError::Validation("booking is already paid".into()));
    }
    if booking.money.amount() != req.amount || booking.money.currency() != req.currency {
        return Err(PaymentError::Validation(format!(
            "amount mismatch: booking is {} {}, request is {} {}",
            booking.money.amount(),
            booking.money.currency(),
            req.amount,
            req.currency,
        )));
    }

    let receipt = req.booking.target().simple().to_string();
    let order = gateway.create_order(req.amount, req.currency, receipt).await?;

    let payment = NewPayment {
        id: Uuid::now_v7(),
        order_id: order.order_id.clone(),
        money: Money::new(req.amount, req.currency),
        email: req.email,
        contact: req.contact,
        booking: req.booking,
    };

    let mut tx = pool.begin().await?;
    payment_repo::insert(&mut tx, &payment).await?;

    let mut audit = NewAuditEntry::payment(
        payment.id,
        payment.order_id.as_str(),
        "created",
        "api:order",
    );
    audit.detail = serde_json::json!({
        "amount": payment.money.amount().minor(),
        "currency": payment.money.currency().as_str(),
        "booking_kind": payment.booking.kind(),
        "booking_id": payment.booking.target(),
    });
    audit_repo::insert_audit_entry(&mut tx, &audit).await?;
    tx.commit().await?;

    tracing::info!(
        order_id = %payment.order_id,
        booking = payment.booking.kind(),
        "order created"
    );

    Ok(OrderCreated {
        order_id: payment.order_id,
        key_id: key_id.to_string(),
        amount: req.amount,
        currency: req.currency,
    })
}
