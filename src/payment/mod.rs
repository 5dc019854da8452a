mod error;
pub use error::{PaymentError, PaymentResult};

mod gateway;
pub use gateway::{GatewayOrder, OrderRequest, PaymentGateway, RazorpayGateway};

pub mod signature;
pub use signature::{compute_signature, verify_signature};

/// Converts a total in whole currency units to gateway sub-units.
pub fn to_subunits(total: i64) -> Option<i64> {
    total.checked_mul(100)
}

/// Random receipt attached to each gateway order.
pub fn generate_receipt() -> String {
    format!("rcpt_{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn subunits_test() {
        assert_eq!(to_subunits(499), Some(49_900));
        assert_eq!(to_subunits(0), Some(0));
        assert_eq!(to_subunits(i64::MAX), None);
    }

    #[test]
    fn receipt_is_unique_test() {
        let a = generate_receipt();
        let b = generate_receipt();
        assert!(a.starts_with("rcpt_"));
        // razorpay caps receipts at 40 chars
        assert!(a.len() <= 40);
        assert_ne!(a, b);
    }
}
