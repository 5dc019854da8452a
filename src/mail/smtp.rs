use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::mail::{Mail, MailResult, Mailer};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    contact_inbox: String,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("from", &self.from)
            .field("contact_inbox", &self.contact_inbox)
            .finish_non_exhaustive()
    }
}

impl SmtpMailer {
    pub fn from_config(config: &crate::config::Mail) -> MailResult<Self> {
        let credentials = Credentials::new(
            config.username().to_string(),
            config.password().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(config.smtp_host())?
            .port(config.smtp_port())
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from: config.from().parse()?,
            contact_inbox: config.contact_inbox().to_string(),
        })
    }

    pub fn build_message(&self, mail: Mail) -> MailResult<Message> {
        build_message(self.from.clone(), mail)
    }
}

fn build_message(from: Mailbox, mail: Mail) -> MailResult<Message> {
    let message = Message::builder()
        .from(from)
        .to(mail.to.parse()?)
        .subject(mail.subject)
        .header(ContentType::TEXT_HTML)
        .body(mail.html)?;
    Ok(message)
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[tracing::instrument(skip(self, mail), fields(to = %mail.to))]
    async fn send(&self, mail: Mail) -> MailResult<()> {
        let message = self.build_message(mail)?;
        let response = self.transport.send(message).await?;
        tracing::debug!("smtp accepted message: {:?}", response.code());
        Ok(())
    }

    fn contact_inbox(&self) -> Option<&str> {
        Some(&self.contact_inbox)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mail::MailError;

    #[test]
    fn build_message_test() {
        let from: Mailbox = "coursebay <noreply@example.com>".parse().unwrap();
        let message = build_message(
            from,
            Mail::new("student@example.com", "Welcome", "<h1>Hi</h1>"),
        )
        .unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Welcome"));
        assert!(raw.contains("To: student@example.com"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn build_message_bad_recipient_test() {
        let from: Mailbox = "noreply@example.com".parse().unwrap();
        let result = build_message(from, Mail::new("not an address", "x", "y"));
        assert!(matches!(result, Err(MailError::AddressError(_))));
    }
}
