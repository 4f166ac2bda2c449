mod common;

use common::*;
use medipay::domain::money::MoneyAmount;
use medipay::domain::notify::LogNotifier;
use medipay::domain::payment::PaymentEvent;
use medipay::services::transitions::{ApplyOutcome, apply_event};
use medipay::services::webhook::{WebhookOutcome, parse_event, process_event};
use std::sync::Arc;

const DB: &str = "medipay_test_concurrency";

// ── 1. concurrent_duplicate_webhooks ───────────────────────────────────────
// 10 tasks deliver the same event id. Exactly 1 applies, the rest are
// absorbed by the idempotency record; the booking is paid once.

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicate_webhooks() {
    let pool = setup_pool(DB).await;
    let (booking, order_id) = seed_order(&pool).await;
    let pay = pay_id();

    let body = payment_webhook_body("payment.captured", &order_id, pay.as_str(), AMOUNT);
    let event = Arc::new(parse_event(&body).unwrap());
    let evt_id = Arc::new(event_id("conc_dup"));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let pool = pool.clone();
        let event = event.clone();
        let evt_id = evt_id.clone();
        handles.push(tokio::spawn(async move {
            process_event(&pool, &LogNotifier, &evt_id, &event)
                .await
                .unwrap()
        }));
    }

    let mut applied = 0;
    let mut duplicates = 0;
    for h in handles {
        match h.await.unwrap() {
            WebhookOutcome::Applied(_) => applied += 1,
            WebhookOutcome::Duplicate => duplicates += 1,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    assert_eq!(applied, 1, "exactly 1 Applied");
    assert_eq!(duplicates, 9, "9 Duplicates");
    assert_eq!(count_processed_events(&pool, &evt_id).await, 1);
    assert_eq!(count_audit(&pool, &order_id, "status_changed").await, 1);
    assert!(booking_paid(&pool, &booking).await);
}

// ── 2. webhook_races_client_verification ───────────────────────────────────
// The gateway's server callback and the user's browser callback hit the
// same payment at once. The advisory lock serializes them: exactly one
// capture transition, exactly one booking-paid update.

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn webhook_races_client_verification() {
    let pool = setup_pool(DB).await;
    let (booking, order_id) = seed_order(&pool).await;
    let pay = pay_id();

    let body = payment_webhook_body("payment.captured", &order_id, pay.as_str(), AMOUNT);
    let event = parse_event(&body).unwrap();
    let evt_id = event_id("conc_race");

    let webhook_task = {
        let pool = pool.clone();
        tokio::spawn(async move {
            process_event(&pool, &LogNotifier, &evt_id, &event)
                .await
                .unwrap()
        })
    };
    let verify_task = {
        let pool = pool.clone();
        let order_id = order_id.clone();
        tokio::spawn(async move {
            let event = PaymentEvent::Captured {
                payment_id: pay,
                amount: None,
                method: None,
            };
            apply_event(&pool, &order_id, &event, "client:checkout")
                .await
                .unwrap()
        })
    };

    let webhook_outcome = webhook_task.await.unwrap();
    let verify_outcome = verify_task.await.unwrap();

    let mut transitions = 0;
    if matches!(webhook_outcome, WebhookOutcome::Applied(_)) {
        transitions += 1;
    }
    if matches!(verify_outcome, ApplyOutcome::Transitioned(_)) {
        transitions += 1;
    }

    assert_eq!(transitions, 1, "exactly one path wins the capture");
    assert_eq!(count_audit(&pool, &order_id, "status_changed").await, 1);
    assert_eq!(get_payment(&pool, &order_id).await.unwrap().status, "captured");
    assert!(booking_paid(&pool, &booking).await);
}

// ── 3. concurrent_distinct_capture_events ──────────────────────────────────
// 5 deliveries with different event ids for the same order: all are
// recorded, only the first transitions.

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_distinct_capture_events() {
    let pool = setup_pool(DB).await;
    let (_, order_id) = seed_order(&pool).await;
    let pay = pay_id();

    let body = payment_webhook_body("payment.captured", &order_id, pay.as_str(), AMOUNT);
    let event = Arc::new(parse_event(&body).unwrap());

    let mut handles = Vec::new();
    for i in 0..5 {
        let pool = pool.clone();
        let event = event.clone();
        let evt_id = event_id(&format!("conc_distinct_{i}"));
        handles.push(tokio::spawn(async move {
            process_event(&pool, &LogNotifier, &evt_id, &event)
                .await
                .unwrap()
        }));
    }

    let mut applied = 0;
    let mut already = 0;
    for h in handles {
        match h.await.unwrap() {
            WebhookOutcome::Applied(_) => applied += 1,
            WebhookOutcome::AlreadyApplied(_) => already += 1,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    assert_eq!(applied, 1, "exactly 1 Applied");
    assert_eq!(already, 4, "4 AlreadyApplied");
    assert_eq!(count_audit(&pool, &order_id, "status_changed").await, 1);

    let event = PaymentEvent::Captured {
        payment_id: pay_id(),
        amount: Some(MoneyAmount::new(AMOUNT).unwrap()),
        method: None,
    };
    let outcome = apply_event(&pool, &order_id, &event, "test").await.unwrap();
    assert!(matches!(outcome, ApplyOutcome::Unchanged(_)));
}
