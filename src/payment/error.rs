use thiserror::Error;

pub type PaymentResult<T> = std::result::Result<T, PaymentError>;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("gateway transport error: {0}")]
    TransportError(#[from] reqwest::Error),
    #[error("gateway rejected request ({status}): {body}")]
    GatewayRejected { status: u16, body: String },
    #[error("invalid order amount: {0}")]
    InvalidAmount(i64),
}
