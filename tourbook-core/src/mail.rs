use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;

use tourbook_shared::Masked;

use crate::identity::Role;
use crate::repository::UserRepository;
use crate::{CoreError, CoreResult};

pub const NAME_PLACEHOLDER: &str = "{{name}}";
pub const FALLBACK_NAME: &str = "Customer";

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Delivery failed: {0}")]
    Transport(String),
}

/// Outbound mail transport
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// Writes messages to the log instead of delivering them. Used when no SMTP
/// relay is configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(
            "Mail to {} with subject {:?} ({} bytes)",
            Masked(email.to.as_str()),
            email.subject,
            email.html.len()
        );
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Recipient {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FailedDelivery {
    pub email: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct BulkEmailReport {
    pub total: usize,
    pub sent: Vec<String>,
    pub failed: Vec<FailedDelivery>,
}

/// Substitute every `{{name}}` with the recipient's name, or the fallback
/// when the name is missing or blank.
pub fn render_template(content: &str, name: Option<&str>) -> String {
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(FALLBACK_NAME);
    content.replace(NAME_PLACEHOLDER, name)
}

/// Send one personalised email per recipient, all concurrently. Every
/// outcome is collected; one failed delivery does not abort the rest.
pub async fn dispatch_bulk(
    mailer: &dyn Mailer,
    subject: &str,
    content: &str,
    recipients: Vec<Recipient>,
) -> BulkEmailReport {
    let total = recipients.len();

    let sends = recipients.into_iter().map(|recipient| async move {
        let email = OutgoingEmail {
            to: recipient.email.clone(),
            subject: subject.to_string(),
            html: render_template(content, recipient.name.as_deref()),
        };
        let outcome = mailer.send(&email).await;
        (recipient.email, outcome)
    });

    let mut report = BulkEmailReport {
        total,
        ..Default::default()
    };

    for (email, outcome) in join_all(sends).await {
        match outcome {
            Ok(()) => report.sent.push(email),
            Err(e) => {
                tracing::warn!("Bulk email to {} failed: {}", Masked(email.as_str()), e);
                report.failed.push(FailedDelivery {
                    email,
                    error: e.to_string(),
                });
            }
        }
    }

    report
}

/// Resolve recipients (optionally by role) and dispatch.
pub async fn send_bulk_email(
    users: &dyn UserRepository,
    mailer: &dyn Mailer,
    subject: &str,
    content: &str,
    role: Option<Role>,
) -> CoreResult<BulkEmailReport> {
    if subject.trim().is_empty() || content.trim().is_empty() {
        return Err(CoreError::InvalidInput("Subject and content are required".to_string()));
    }

    let recipients = users
        .list_users(role)
        .await?
        .into_iter()
        .map(|u| Recipient {
            email: u.email,
            name: u.name,
        })
        .collect();

    Ok(dispatch_bulk(mailer, subject, content, recipients).await)
}
