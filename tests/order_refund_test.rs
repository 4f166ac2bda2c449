mod common;

use common::*;
use medipay::domain::error::PaymentError;
use medipay::domain::money::{Currency, MoneyAmount};
use medipay::domain::notify::LogNotifier;
use medipay::domain::payment::PaymentEvent;
use medipay::gateway::mock::{MockBehavior, MockGateway};
use medipay::services::orders::{self, CreateOrder};
use medipay::services::refunds;
use medipay::services::transitions::apply_event;
use uuid::Uuid;

const DB: &str = "medipay_test_orders";

fn order_request(booking: medipay::domain::booking::BookingRef, amount: i64) -> CreateOrder {
    CreateOrder {
        booking,
        amount: MoneyAmount::new(amount).unwrap(),
        currency: Currency::Inr,
        email: "patient@example.com".into(),
        contact: "+919999999999".into(),
    }
}

async fn capture(pool: &sqlx::PgPool, order_id: &medipay::domain::id::OrderId) {
    apply_event(
        pool,
        order_id,
        &PaymentEvent::Captured {
            payment_id: pay_id(),
            amount: Some(MoneyAmount::new(AMOUNT).unwrap()),
            method: None,
        },
        "test",
    )
    .await
    .unwrap();
}

// ── 1. create_order_persists_created_row ───────────────────────────────────

#[tokio::test]
async fn create_order_persists_created_row() {
    let pool = setup_pool(DB).await;
    let booking = seed_appointment(&pool).await;
    let gateway = MockGateway::succeeding();

    let created = orders::create_order(&pool, &gateway, "rzp_test_key", order_request(booking, AMOUNT))
        .await
        .unwrap();
    assert_eq!(created.key_id, "rzp_test_key");
    assert_eq!(created.amount.minor(), AMOUNT);

    let row = get_payment(&pool, &created.order_id).await.unwrap();
    assert_eq!(row.status, "created");
    assert_eq!(row.amount, AMOUNT);
    assert_eq!(row.currency, "inr");
    assert!(row.payment_id.is_none());
    assert!(!booking_paid(&pool, &booking).await);
    assert_eq!(count_audit(&pool, &created.order_id, "created").await, 1);
}

// ── 2. gateway_failure_persists_nothing ────────────────────────────────────
// No remote order, no local row — the whole operation is retryable.

#[tokio::test]
async fn gateway_failure_persists_nothing() {
    let pool = setup_pool(DB).await;
    let booking = seed_appointment(&pool).await;
    let gateway = MockGateway::failing();

    let err = orders::create_order(&pool, &gateway, "rzp_test_key", order_request(booking, AMOUNT))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::GatewayUnavailable(_)));
    assert_eq!(count_payments_for(&pool, &booking).await, 0);
    assert!(!booking_paid(&pool, &booking).await);
}

// ── 3. amount_mismatch_never_reaches_gateway ───────────────────────────────

#[tokio::test]
async fn amount_mismatch_never_reaches_gateway() {
    let pool = setup_pool(DB).await;
    let booking = seed_appointment(&pool).await;
    let gateway = MockGateway::succeeding();

    let err = orders::create_order(
        &pool,
        &gateway,
        "rzp_test_key",
        order_request(booking, AMOUNT + 500),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, PaymentError::Validation(_)));
    assert_eq!(gateway.order_calls(), 0);
    assert_eq!(count_payments_for(&pool, &booking).await, 0);
}

// ── 4. paid_booking_rejected ───────────────────────────────────────────────

#[tokio::test]
async fn paid_booking_rejected() {
    let pool = setup_pool(DB).await;
    let booking = seed_appointment(&pool).await;
    sqlx::query("UPDATE appointments SET paid = true WHERE id = $1")
        .bind(booking.target())
        .execute(&pool)
        .await
        .unwrap();

    let gateway = MockGateway::succeeding();
    let err = orders::create_order(&pool, &gateway, "rzp_test_key", order_request(booking, AMOUNT))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::Validation(_)));
    assert_eq!(gateway.order_calls(), 0);
}

// ── 5. missing_booking_rejected ────────────────────────────────────────────

#[tokio::test]
async fn missing_booking_rejected() {
    let pool = setup_pool(DB).await;
    let booking = medipay::domain::booking::BookingRef::Appointment(Uuid::now_v7());
    let gateway = MockGateway::succeeding();

    let err = orders::create_order(&pool, &gateway, "rzp_test_key", order_request(booking, AMOUNT))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::Validation(_)));
    assert_eq!(gateway.order_calls(), 0);
}

// ── 6. lab_test_capture_marks_lab_booking ──────────────────────────────────

#[tokio::test]
async fn lab_test_capture_marks_lab_booking() {
    let pool = setup_pool(DB).await;
    let booking = seed_lab_test(&pool).await;
    let order_id = seed_order_for(&pool, booking).await;

    capture(&pool, &order_id).await;

    assert!(booking_paid(&pool, &booking).await);
    assert_eq!(get_payment(&pool, &order_id).await.unwrap().status, "captured");
}

// ── 7. refund_on_created_never_reaches_gateway ─────────────────────────────

#[tokio::test]
async fn refund_on_created_never_reaches_gateway() {
    let pool = setup_pool(DB).await;
    let (_, order_id) = seed_order(&pool).await;
    let row = get_payment(&pool, &order_id).await.unwrap();

    let gateway = MockGateway::succeeding();
    let err = refunds::refund(&pool, &gateway, &LogNotifier, row.id, "too early".into())
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::IllegalTransition { .. }));
    assert_eq!(gateway.refund_calls(), 0);
    assert_eq!(get_payment(&pool, &order_id).await.unwrap().status, "created");
}

// ── 8. refund_waits_for_webhook_when_pending ───────────────────────────────

#[tokio::test]
async fn refund_waits_for_webhook_when_pending() {
    let pool = setup_pool(DB).await;
    let (_, order_id) = seed_order(&pool).await;
    capture(&pool, &order_id).await;
    let row = get_payment(&pool, &order_id).await.unwrap();

    let gateway = MockGateway::with_behavior(MockBehavior::Succeed, false);
    let payment = refunds::refund(&pool, &gateway, &LogNotifier, row.id, "cancelled".into())
        .await
        .unwrap();

    assert_eq!(payment.status.as_str(), "refund_initiated");
    let row = get_payment(&pool, &order_id).await.unwrap();
    assert_eq!(row.status, "refund_initiated");
    assert!(row.refund_id.is_some());
    assert_eq!(row.refund_reason.as_deref(), Some("cancelled"));
    assert!(row.refunded_at.is_none());
}

// ── 9. synchronous_refund_settles_immediately ──────────────────────────────

#[tokio::test]
async fn synchronous_refund_settles_immediately() {
    let pool = setup_pool(DB).await;
    let (booking, order_id) = seed_order(&pool).await;
    capture(&pool, &order_id).await;
    let row = get_payment(&pool, &order_id).await.unwrap();

    let notifier = RecordingNotifier::default();
    let gateway = MockGateway::with_behavior(MockBehavior::Succeed, true);
    let payment = refunds::refund(&pool, &gateway, &notifier, row.id, "duplicate charge".into())
        .await
        .unwrap();

    assert_eq!(payment.status.as_str(), "refunded");
    let row = get_payment(&pool, &order_id).await.unwrap();
    assert_eq!(row.status, "refunded");
    assert!(row.refunded_at.is_some());
    assert_eq!(
        notifier.lines(),
        vec![format!("refunded:{}:duplicate charge", booking.target())]
    );
}

// ── 10. refund_gateway_failure_leaves_payment_captured ─────────────────────

#[tokio::test]
async fn refund_gateway_failure_leaves_payment_captured() {
    let pool = setup_pool(DB).await;
    let (_, order_id) = seed_order(&pool).await;
    capture(&pool, &order_id).await;
    let row = get_payment(&pool, &order_id).await.unwrap();

    let gateway = MockGateway::failing();
    let err = refunds::refund(&pool, &gateway, &LogNotifier, row.id, "cancelled".into())
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::GatewayUnavailable(_)));

    let row = get_payment(&pool, &order_id).await.unwrap();
    assert_eq!(row.status, "captured");
    assert!(row.refund_id.is_none());
}

// ── 11. refund_of_unknown_payment_is_not_found ─────────────────────────────

#[tokio::test]
async fn refund_of_unknown_payment_is_not_found() {
    let pool = setup_pool(DB).await;
    let gateway = MockGateway::succeeding();

    let err = refunds::refund(&pool, &gateway, &LogNotifier, Uuid::now_v7(), "nope".into())
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::NotFound));
    assert_eq!(gateway.refund_calls(), 0);
}
