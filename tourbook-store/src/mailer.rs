//! SMTP delivery using Lettre.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use tourbook_core::mail::{MailError, Mailer, OutgoingEmail};

use crate::app_config::MailConfig;

/// Sends HTML mail through an authenticated SMTP relay.
#[derive(Clone)]
pub struct SmtpMailer {
    smtp_server: String,
    smtp_port: u16,
    credentials: Credentials,
    from_email: String,
    from_name: String,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Self {
        Self {
            smtp_server: config.smtp_server.clone(),
            smtp_port: config.smtp_port,
            credentials: Credentials::new(config.username.clone(), config.password.clone()),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        }
    }

    /// A fresh transport per message; bulk sends run concurrently and must
    /// not share one SMTP session.
    fn build_transport(&self) -> Result<SmtpTransport, MailError> {
        Ok(SmtpTransport::relay(&self.smtp_server)
            .map_err(|e| MailError::Transport(format!("SMTP relay error: {}", e)))?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build())
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, MailError> {
        Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| MailError::InvalidAddress(format!("from: {}", e)))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|e| MailError::InvalidAddress(format!("to: {}", e)))?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(email.html.clone())
            .map_err(|e| MailError::Transport(format!("Failed to build email: {}", e)))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = self.build_message(email)?;
        let mailer = self.build_transport()?;

        tokio::task::spawn_blocking(move || {
            mailer
                .send(&message)
                .map_err(|e| MailError::Transport(format!("Failed to send email: {}", e)))
        })
        .await
        .map_err(|e| MailError::Transport(format!("Email task failed: {}", e)))?
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer() -> SmtpMailer {
        SmtpMailer::new(&MailConfig {
            smtp_server: "smtp.example.com".to_string(),
            smtp_port: 587,
            username: "user".to_string(),
            password: "secret".to_string(),
            from_email: "tours@example.com".to_string(),
            from_name: "Tourbook".to_string(),
        })
    }

    #[test]
    fn test_invalid_recipient_is_rejected_before_sending() {
        let email = OutgoingEmail {
            to: "not an address".to_string(),
            subject: "Hello".to_string(),
            html: "<p>Hi</p>".to_string(),
        };
        assert!(matches!(mailer().build_message(&email), Err(MailError::InvalidAddress(_))));
    }

    #[test]
    fn test_message_builds_for_valid_recipient() {
        let email = OutgoingEmail {
            to: "ana@example.com".to_string(),
            subject: "Hello".to_string(),
            html: "<p>Hi</p>".to_string(),
        };
        assert!(mailer().build_message(&email).is_ok());
    }
}
