use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::payment::GatewayOrder;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CapturePaymentBody {
    #[serde(default)]
    pub courses: Vec<String>,
}

/// Parses every id, `None` as soon as one is not a UUID.
fn parse_course_ids(raw: &[String]) -> Option<Vec<Uuid>> {
    raw.iter().map(|id| Uuid::parse_str(id.trim()).ok()).collect()
}

impl CapturePaymentBody {
    pub fn course_ids(&self) -> Option<Vec<Uuid>> {
        parse_course_ids(&self.courses)
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CapturePaymentResponse {
    pub key: String,
    pub order: GatewayOrder,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct VerifyPaymentBody {
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,
    #[serde(default)]
    pub razorpay_signature: Option<String>,
    #[serde(default)]
    pub courses: Vec<String>,
}

/// The checked fields of a verification request.
#[derive(Debug, PartialEq)]
pub struct VerifiedFields<'a> {
    pub order_id: &'a str,
    pub payment_id: &'a str,
    pub signature: &'a str,
    pub course_ids: Vec<Uuid>,
}

impl VerifyPaymentBody {
    /// `None` when any of the gateway fields is missing or the course list
    /// is empty or malformed.
    pub fn fields(&self) -> Option<VerifiedFields<'_>> {
        let order_id = self.razorpay_order_id.as_deref().filter(|v| !v.is_empty())?;
        let payment_id = self.razorpay_payment_id.as_deref().filter(|v| !v.is_empty())?;
        let signature = self.razorpay_signature.as_deref().filter(|v| !v.is_empty())?;
        let course_ids = parse_course_ids(&self.courses).filter(|ids| !ids.is_empty())?;
        Some(VerifiedFields {
            order_id,
            payment_id,
            signature,
            course_ids,
        })
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PaymentSuccessEmailBody {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
    /// Sub-units, as charged by the gateway.
    #[serde(default)]
    pub amount: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct KeyResponse {
    pub key: String,
}
