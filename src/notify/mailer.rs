use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message as Email, Tokio1Executor};
use tracing::info;

use super::{DeliveryError, Mailer};

/// Sends mail through an SMTP relay with STARTTLS.
pub struct SmtpMailer {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        port: u16,
        credentials: Option<(String, String)>,
        from: &str,
    ) -> Result<Self, DeliveryError> {
        let from = from
            .parse::<Mailbox>()
            .map_err(|e| DeliveryError::InvalidAddress(format!("{from}: {e}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| DeliveryError::Transport(format!("SMTP relay error: {e}")))?
            .port(port);
        if let Some((username, password)) = credentials {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            from,
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), DeliveryError> {
        let to = to
            .parse::<Mailbox>()
            .map_err(|e| DeliveryError::InvalidAddress(format!("{to}: {e}")))?;

        let email = Email::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| DeliveryError::Build(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        Ok(())
    }
}

/// Used when no SMTP host is configured: the email only goes to the log.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        _html_body: &str,
    ) -> Result<(), DeliveryError> {
        info!(to, subject, "SMTP not configured, email logged only");
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[cfg(test)]
#[derive(Default)]
pub struct RecordingMailer {
    fail: bool,
    sent: std::sync::Mutex<Vec<SentEmail>>,
}

#[cfg(test)]
impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Transport("connection refused".into()));
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: html_body.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_sender() {
        let err = SmtpMailer::new("smtp.example.com", 587, None, "not an address")
            .err()
            .unwrap();
        assert!(matches!(err, DeliveryError::InvalidAddress(_)));
    }

    #[actix_web::test]
    async fn log_mailer_always_succeeds() {
        assert!(
            LogMailer
                .send_email("a@b.rw", "Salary Payment Notification - 1/2025", "<p/>")
                .await
                .is_ok()
        );
    }
}
