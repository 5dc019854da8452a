use thiserror::Error;

pub type MailResult<T> = std::result::Result<T, MailError>;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    AddressError(#[from] lettre::address::AddressError),
    #[error("message build error: {0}")]
    BuildError(#[from] lettre::error::Error),
    #[error("smtp error: {0}")]
    SmtpError(#[from] lettre::transport::smtp::Error),
}
