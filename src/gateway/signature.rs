use {
    crate::domain::id::{OrderId, PaymentId},
    hmac::{Hmac, Mac},
    sha2::Sha256,
    subtle::ConstantTimeEq,
};

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 over the exact payload bytes, hex-encoded. Used to
/// generate client-side checkout signatures and by tests.
pub fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Validate a gateway-issued signature. A malformed signature and a
/// wrong signature are the same `false` — callers get no hint which.
/// The secret is never logged.
pub fn verify(payload: &[u8], signature: &str, secret: &str) -> bool {
    let expected = sign(payload, secret);
    let expected = expected.as_bytes();
    let provided = signature.as_bytes();

    // Length is not secret — a SHA-256 hex signature is always 64 chars.
    if expected.len() != provided.len() {
        return false;
    }
    expected.ct_eq(provided).into()
}

/// The gateway's client-checkout convention: the signature covers
/// `"{order_id}|{payment_id}"` signed with the key secret.
pub fn checkout_payload(order_id: &OrderId, payment_id: &PaymentId) -> String {
    format!("{order_id}|{payment_id}")
}
