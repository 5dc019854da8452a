use async_trait::async_trait;

mod error;
pub use error::{MailError, MailResult};

mod smtp;
pub use smtp::SmtpMailer;

pub mod templates;

/// Outgoing HTML message.
#[derive(Debug, Clone, PartialEq)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl Mail {
    pub fn new<T: Into<String>, S: Into<String>, H: Into<String>>(to: T, subject: S, html: H) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
        }
    }
}

#[async_trait]
pub trait Mailer: std::fmt::Debug + Send + Sync {
    async fn send(&self, mail: Mail) -> MailResult<()>;

    /// Where contact-form submissions are forwarded.
    fn contact_inbox(&self) -> Option<&str>;
}

/// Used when no SMTP relay is configured: messages are only traced.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: Mail) -> MailResult<()> {
        tracing::info!(to = %mail.to, subject = %mail.subject, "mail transport disabled, message dropped");
        Ok(())
    }

    fn contact_inbox(&self) -> Option<&str> {
        None
    }
}

/// Sends `mail`, logging instead of failing. Used for notifications that
/// must not undo the operation that triggered them.
pub async fn send_best_effort(mailer: &dyn Mailer, mail: Mail) {
    let to = mail.to.clone();
    if let Err(e) = mailer.send(mail).await {
        tracing::warn!("unable to deliver mail to {}: {}", to, e);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn log_mailer_never_fails_test() {
        let mailer = LogMailer;
        let result = mailer
            .send(Mail::new("a@example.com", "subject", "<p>body</p>"))
            .await;
        assert!(result.is_ok());
        assert!(mailer.contact_inbox().is_none());
    }
}
