use medipay::domain::money::MoneyAmount;
use medipay::domain::payment::PaymentStatus;
use medipay::gateway::signature;
use proptest::prelude::*;

fn arb_status() -> impl Strategy<Value = PaymentStatus> {
    prop_oneof![
        Just(PaymentStatus::Created),
        Just(PaymentStatus::Authorized),
        Just(PaymentStatus::Captured),
        Just(PaymentStatus::Failed),
        Just(PaymentStatus::RefundInitiated),
        Just(PaymentStatus::Refunded),
    ]
}

/// Lifecycle rank — higher means further along. Failed sorts last so
/// that "transitions only move forward" is a single comparison.
fn rank(status: &PaymentStatus) -> u8 {
    match status {
        PaymentStatus::Created => 0,
        PaymentStatus::Authorized => 1,
        PaymentStatus::Captured => 2,
        PaymentStatus::RefundInitiated => 3,
        PaymentStatus::Refunded => 4,
        PaymentStatus::Failed => 5,
    }
}

proptest! {
    /// Terminal states (Failed, Refunded) can never transition to anything.
    #[test]
    fn terminal_states_reject_all_transitions(target in arb_status()) {
        use PaymentStatus::*;
        for terminal in [Failed, Refunded] {
            prop_assert!(!terminal.can_transition_to(&target));
        }
    }

    /// No legal transition ever moves backward along the lifecycle.
    #[test]
    fn transitions_only_move_forward(from in arb_status(), to in arb_status()) {
        if from.can_transition_to(&to) {
            prop_assert!(rank(&to) > rank(&from), "{from} -> {to} moved backward");
        }
    }

    /// Failure only exits the pre-capture stretch — captured money never
    /// silently becomes "failed".
    #[test]
    fn capture_is_a_point_of_no_return(from in arb_status()) {
        if from.can_transition_to(&PaymentStatus::Failed) {
            prop_assert!(rank(&from) < rank(&PaymentStatus::Captured));
        }
    }

    /// Any random walk from Created performs at most 4 transitions —
    /// the longest path is created→authorized→captured→refund_initiated→refunded.
    #[test]
    fn random_walk_is_bounded(steps in prop::collection::vec(arb_status(), 1..30)) {
        let mut current = PaymentStatus::Created;
        let mut transitions = 0u32;
        for next in &steps {
            if current.can_transition_to(next) {
                current = *next;
                transitions += 1;
            }
        }
        prop_assert!(transitions <= 4, "got {transitions} transitions in walk: {steps:?}");
    }

    /// as_str → try_from roundtrip is identity for any status.
    #[test]
    fn status_roundtrip(status in arb_status()) {
        let roundtripped = PaymentStatus::try_from(status.as_str()).unwrap();
        prop_assert_eq!(roundtripped, status);
    }

    /// MoneyAmount accepts exactly the strictly positive range.
    #[test]
    fn money_amount_is_strictly_positive(minor in any::<i64>()) {
        match MoneyAmount::new(minor) {
            Ok(amount) => {
                prop_assert!(minor > 0);
                prop_assert_eq!(amount.minor(), minor);
            }
            Err(_) => prop_assert!(minor <= 0),
        }
    }

    /// A signature over the exact payload bytes verifies.
    #[test]
    fn exact_signature_verifies(
        payload in prop::collection::vec(any::<u8>(), 0..256),
        secret in "[a-zA-Z0-9]{8,40}",
    ) {
        let sig = signature::sign(&payload, &secret);
        prop_assert!(signature::verify(&payload, &sig, &secret));
    }

    /// Flipping any single bit of the signature makes it invalid.
    #[test]
    fn flipped_signature_bit_rejected(
        payload in prop::collection::vec(any::<u8>(), 0..256),
        secret in "[a-zA-Z0-9]{8,40}",
        bit in 0usize..512,
    ) {
        let sig = signature::sign(&payload, &secret);
        let mut bytes = sig.clone().into_bytes();
        let idx = (bit / 8) % bytes.len();
        bytes[idx] ^= 1 << (bit % 8);
        let tampered = String::from_utf8_lossy(&bytes).into_owned();
        prop_assert!(!signature::verify(&payload, &tampered, &secret));
    }

    /// Flipping any single bit of the payload invalidates the signature.
    #[test]
    fn flipped_payload_bit_rejected(
        payload in prop::collection::vec(any::<u8>(), 1..256),
        secret in "[a-zA-Z0-9]{8,40}",
        bit in 0usize..2048,
    ) {
        let sig = signature::sign(&payload, &secret);
        let mut tampered = payload.clone();
        let idx = (bit / 8) % tampered.len();
        tampered[idx] ^= 1 << (bit % 8);
        prop_assert!(!signature::verify(&tampered, &sig, &secret));
    }

    /// Different secrets produce signatures that do not cross-verify.
    #[test]
    fn wrong_secret_rejected(
        payload in prop::collection::vec(any::<u8>(), 0..256),
        secret_a in "[a-z]{8,20}",
        secret_b in "[A-Z]{8,20}",
    ) {
        let sig = signature::sign(&payload, &secret_a);
        prop_assert!(!signature::verify(&payload, &sig, &secret_b));
    }
}
