use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::payment::{PaymentError, PaymentResult, signature};

/// Order creation request, `amount` in currency sub-units (paise for INR).
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

/// Order as returned by the gateway and forwarded to the checkout widget.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
}

#[async_trait]
pub trait PaymentGateway: std::fmt::Debug + Send + Sync {
    /// Public key id handed to the browser checkout.
    fn key_id(&self) -> &str;

    async fn create_order(&self, request: OrderRequest) -> PaymentResult<GatewayOrder>;

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct RazorpayGateway {
    client: Client,
    api_base: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    const TIMEOUT: Duration = Duration::from_secs(15);

    pub fn new(api_base: &str, key_id: &str, key_secret: &str) -> PaymentResult<Self> {
        let client = Client::builder().timeout(Self::TIMEOUT).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            key_id: key_id.to_string(),
            key_secret: key_secret.to_string(),
        })
    }

    pub fn from_config(config: &crate::config::Payment) -> PaymentResult<Self> {
        Self::new(config.api_base(), config.key_id(), config.key_secret())
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn key_id(&self) -> &str {
        &self.key_id
    }

    #[tracing::instrument(skip(self), fields(receipt = %request.receipt))]
    async fn create_order(&self, request: OrderRequest) -> PaymentResult<GatewayOrder> {
        if request.amount <= 0 {
            return Err(PaymentError::InvalidAmount(request.amount));
        }

        let response = self
            .client
            .post(format!("{}/orders", self.api_base))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::GatewayRejected {
                status: status.as_u16(),
                body,
            });
        }

        let order: GatewayOrder = response.json().await?;
        tracing::debug!("gateway order {} created", order.id);
        Ok(order)
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        signature::verify_signature(&self.key_secret, order_id, payment_id, signature)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn zero_amount_is_rejected_locally_test() {
        let gateway = RazorpayGateway::new("http://127.0.0.1:9/v1/", "rzp", "secret").unwrap();
        let result = gateway
            .create_order(OrderRequest {
                amount: 0,
                currency: String::from("INR"),
                receipt: String::from("rcpt"),
            })
            .await;

        assert!(matches!(result, Err(PaymentError::InvalidAmount(0))));
    }

    #[test]
    fn gateway_verifies_with_its_secret_test() {
        let gateway = RazorpayGateway::new("http://127.0.0.1:9/v1", "rzp", "secret").unwrap();
        let signature = signature::compute_signature("secret", "order_1", "pay_1");
        assert!(gateway.verify_signature("order_1", "pay_1", &signature));
        assert!(!gateway.verify_signature("order_1", "pay_2", &signature));
        assert_eq!(gateway.key_id(), "rzp");
    }

    #[test]
    fn order_response_parsing_test() {
        let raw = r#"{
            "id": "order_EKwxwAgItmmXdp",
            "entity": "order",
            "amount": 50000,
            "amount_paid": 0,
            "amount_due": 50000,
            "currency": "INR",
            "receipt": "receipt#1",
            "offer_id": null,
            "status": "created",
            "attempts": 0,
            "notes": [],
            "created_at": 1582628071
        }"#;

        let order: GatewayOrder = serde_json::from_str(raw).unwrap();
        assert_eq!(order.id, "order_EKwxwAgItmmXdp");
        assert_eq!(order.amount, 50000);
        assert_eq!(order.status, "created");
    }
}
