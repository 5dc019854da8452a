//! Razorpay checkout signatures.
//!
//! The gateway signs `order_id|payment_id` with the merchant key secret using
//! HMAC-SHA256 and hands the hex digest to the browser, which forwards it to
//! `verifyPayment`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str, order_id: &str, payment_id: &str) -> HmacSha256 {
    // HMAC accepts keys of any length
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("hmac keys have no length limit"));
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac
}

/// Hex-encoded signature the gateway is expected to produce.
pub fn compute_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    hex::encode(mac_for(secret, order_id, payment_id).finalize().into_bytes())
}

/// Constant-time comparison of `signature` against the expected digest.
pub fn verify_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(provided) = hex::decode(signature.trim()) else {
        return false;
    };

    mac_for(secret, order_id, payment_id)
        .verify_slice(&provided)
        .is_ok()
}
