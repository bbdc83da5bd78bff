//! Outbound email
//!
//! - `Notifier`: the delivery collaborator (SMTP via lettre, or disabled)
//! - `MailQueue` / `MailWorker`: a bounded channel that decouples delivery from
//!   the request that produced the message
//! - `WelcomeMessage`: the message sent after an account is created

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::config::MailConfig;
use crate::models::User;

/// Error returned when a message cannot be queued or delivered
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("SMTP is not configured")]
    NotConfigured,

    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("Failed to send email: {0}")]
    Transport(String),

    #[error("Mail queue is full")]
    QueueFull,

    #[error("Mail queue is closed")]
    QueueClosed,
}

/// A message waiting for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body_html: String,
}

/// Email delivery collaborator
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body_html: &str) -> Result<(), DeliveryError>;
}

/// SMTP delivery through a relay
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build an SMTP notifier from mail configuration.
    ///
    /// Credentials are only used when both username and password are set.
    pub fn from_config(config: &MailConfig) -> Result<Self, DeliveryError> {
        let host = config
            .smtp_host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or(DeliveryError::NotConfigured)?;

        let from = parse_mailbox(&config.from)?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| DeliveryError::Transport(e.to_string()))?
            .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, to: &str, subject: &str, body_html: &str) -> Result<(), DeliveryError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(to)?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body_html.to_string())
            .map_err(|e| DeliveryError::Build(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        Ok(())
    }
}

/// Notifier used when no SMTP relay is configured; every send fails.
#[derive(Debug, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, _to: &str, _subject: &str, _body_html: &str) -> Result<(), DeliveryError> {
        Err(DeliveryError::NotConfigured)
    }
}

/// Pick the notifier matching the configuration
pub fn notifier_from_config(config: &MailConfig) -> Result<Arc<dyn Notifier>, DeliveryError> {
    if config.is_smtp_configured() {
        Ok(Arc::new(SmtpNotifier::from_config(config)?))
    } else {
        tracing::warn!("SMTP is not configured; outbound mail will not be delivered");
        Ok(Arc::new(DisabledNotifier))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| DeliveryError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// Subject and body of the welcome message
#[derive(Debug, Clone)]
pub struct WelcomeMessage {
    pub subject: String,
    pub body_html: String,
}

impl WelcomeMessage {
    pub fn from_config(config: &MailConfig) -> Self {
        Self {
            subject: config.welcome_subject.clone(),
            body_html: config.welcome_body_html.clone(),
        }
    }

    /// Address the welcome message to a user
    pub fn for_user(&self, user: &User) -> OutboundEmail {
        OutboundEmail {
            to: user.email.clone(),
            subject: self.subject.clone(),
            body_html: self.body_html.clone(),
        }
    }
}

impl Default for WelcomeMessage {
    fn default() -> Self {
        Self::from_config(&MailConfig::default())
    }
}

/// Producer half of the outbound mail queue
#[derive(Clone)]
pub struct MailQueue {
    sender: mpsc::Sender<OutboundEmail>,
}

impl MailQueue {
    /// Create a queue with the given capacity and the worker that drains it
    pub fn new(capacity: usize) -> (Self, MailWorker) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, MailWorker { receiver })
    }

    /// Queue a message without waiting. Fails if the queue is full or the
    /// worker has stopped.
    pub fn enqueue(&self, email: OutboundEmail) -> Result<(), DeliveryError> {
        self.sender.try_send(email).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::QueueFull,
            TrySendError::Closed(_) => DeliveryError::QueueClosed,
        })
    }
}

/// Delivery counters reported when the worker stops
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MailWorkerStats {
    pub delivered: usize,
    pub failed: usize,
}

/// Consumer half of the outbound mail queue.
///
/// Each message is attempted once; failures are logged and counted.
pub struct MailWorker {
    receiver: mpsc::Receiver<OutboundEmail>,
}

impl MailWorker {
    /// Deliver queued messages until every `MailQueue` handle is dropped
    pub async fn run(mut self, notifier: Arc<dyn Notifier>) -> MailWorkerStats {
        tracing::info!("Mail worker started");
        let mut stats = MailWorkerStats::default();

        while let Some(email) = self.receiver.recv().await {
            match notifier.send(&email.to, &email.subject, &email.body_html).await {
                Ok(()) => {
                    stats.delivered += 1;
                    tracing::info!(to = %email.to, "Email delivered");
                }
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(to = %email.to, error = %e, "Email delivery failed");
                }
            }
        }

        tracing::info!(
            delivered = stats.delivered,
            failed = stats.failed,
            "Mail worker stopped"
        );
        stats
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{FailingNotifier, RecordingNotifier};
    use super::*;

    fn email(to: &str) -> OutboundEmail {
        OutboundEmail {
            to: to.to_string(),
            subject: "Subject".to_string(),
            body_html: "<p>Body</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_worker_delivers_queued_mail() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (queue, worker) = MailQueue::new(4);

        queue.enqueue(email("a@actu.news")).unwrap();
        queue.enqueue(email("b@actu.news")).unwrap();
        drop(queue);

        let stats = worker.run(notifier.clone()).await;

        assert_eq!(stats, MailWorkerStats { delivered: 2, failed: 0 });
        let recipients: Vec<String> = notifier.sent().into_iter().map(|e| e.to).collect();
        assert_eq!(recipients, vec!["a@actu.news", "b@actu.news"]);
    }

    #[tokio::test]
    async fn test_worker_keeps_running_after_failure() {
        let (queue, worker) = MailQueue::new(4);

        queue.enqueue(email("a@actu.news")).unwrap();
        queue.enqueue(email("b@actu.news")).unwrap();
        drop(queue);

        let stats = worker.run(Arc::new(FailingNotifier)).await;

        assert_eq!(stats, MailWorkerStats { delivered: 0, failed: 2 });
    }

    #[tokio::test]
    async fn test_enqueue_full_queue() {
        let (queue, _worker) = MailQueue::new(1);

        queue.enqueue(email("a@actu.news")).unwrap();
        let result = queue.enqueue(email("b@actu.news"));

        assert!(matches!(result, Err(DeliveryError::QueueFull)));
    }

    #[tokio::test]
    async fn test_enqueue_after_worker_dropped() {
        let (queue, worker) = MailQueue::new(1);
        drop(worker);

        let result = queue.enqueue(email("a@actu.news"));

        assert!(matches!(result, Err(DeliveryError::QueueClosed)));
    }

    #[tokio::test]
    async fn test_disabled_notifier_fails() {
        let result = DisabledNotifier.send("a@actu.news", "s", "b").await;
        assert!(matches!(result, Err(DeliveryError::NotConfigured)));
    }

    #[test]
    fn test_smtp_notifier_requires_host() {
        let result = SmtpNotifier::from_config(&MailConfig::default());
        assert!(matches!(result, Err(DeliveryError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_smtp_notifier_rejects_invalid_from() {
        let config = MailConfig {
            smtp_host: Some("smtp.actu.news".to_string()),
            from: "not an address".to_string(),
            ..MailConfig::default()
        };

        let result = SmtpNotifier::from_config(&config);
        assert!(matches!(result, Err(DeliveryError::InvalidAddress { .. })));
    }

    #[test]
    fn test_welcome_message_for_user() {
        let user = User::new(
            "new@actu.news".to_string(),
            "New".to_string(),
            "Reader".to_string(),
            "secret".to_string(),
        );

        let message = WelcomeMessage::default().for_user(&user);

        assert_eq!(message.to, "new@actu.news");
        assert_eq!(message.subject, "Bienvenue sur notre site Actunews !");
        assert_eq!(message.body_html, "<p>Bonjour, Bienvenue chez ActuNews !</p>");
    }
}
