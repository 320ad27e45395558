//! Outbound alert delivery.
//!
//! The engine only ever talks to the [`Notifier`] trait; the SMTP
//! implementation below is wired in at startup so tests can substitute a
//! fake. Delivery failure is reported through the return value, never as an
//! error that could fail the domain operation that triggered it.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Collaborator that delivers caregiver alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver an alert; returns whether delivery succeeded.
    async fn send(&self, subject: &str, body: &str) -> bool;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub to_emails: Vec<String>,
}

impl Default for AlertEmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            username: String::new(),
            password: String::new(),
            from_email: String::new(),
            to_emails: Vec::new(),
        }
    }
}

impl AlertEmailConfig {
    /// Read the alert configuration from `ALERT_*` environment variables.
    /// Returns None when the required variables are absent.
    pub fn from_env() -> Option<Self> {
        let smtp_server = std::env::var("ALERT_SMTP_SERVER").ok()?;
        let username = std::env::var("ALERT_SMTP_USERNAME").ok()?;
        let password = std::env::var("ALERT_SMTP_PASSWORD").ok()?;
        let from_email = std::env::var("ALERT_FROM_EMAIL").ok()?;
        let to_emails = std::env::var("ALERT_TO_EMAILS")
            .ok()?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let smtp_port = std::env::var("ALERT_SMTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(587);

        Some(Self {
            smtp_server,
            smtp_port,
            username,
            password,
            from_email,
            to_emails,
        })
    }
}

/// Notifier that sends alert emails over SMTP
pub struct SmtpNotifier {
    config: AlertEmailConfig,
    transport: SmtpTransport,
}

impl SmtpNotifier {
    pub fn new(config: AlertEmailConfig) -> anyhow::Result<Self> {
        info!(
            "Initializing alert email transport for SMTP server: {}:{}",
            config.smtp_server, config.smtp_port
        );

        let tls_params = TlsParameters::new(config.smtp_server.clone())?;
        let transport = SmtpTransport::relay(&config.smtp_server)?
            .port(config.smtp_port)
            .tls(Tls::Required(tls_params))
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { config, transport })
    }

    fn build_message(&self, subject: &str, body: &str) -> anyhow::Result<Message> {
        let mut builder = Message::builder().from(self.config.from_email.parse::<Mailbox>()?);

        // BCC so recipients do not see each other
        for email in &self.config.to_emails {
            builder = builder.bcc(email.parse::<Mailbox>()?);
        }

        Ok(builder.subject(subject).body(body.to_string())?)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, subject: &str, body: &str) -> bool {
        if self.config.to_emails.is_empty() {
            info!("No alert recipients configured, skipping email send");
            return false;
        }

        let message = match self.build_message(subject, body) {
            Ok(message) => message,
            Err(e) => {
                warn!("Failed to build alert email: {}", e);
                return false;
            }
        };

        // SmtpTransport::send is blocking; keep it off the async workers
        let transport = self.transport.clone();
        match tokio::task::spawn_blocking(move || transport.send(&message)).await {
            Ok(Ok(_)) => {
                info!(
                    "Alert email sent to {} recipients",
                    self.config.to_emails.len()
                );
                true
            }
            Ok(Err(e)) => {
                warn!("Failed to send alert email: {}", e);
                false
            }
            Err(e) => {
                warn!("Alert email task failed: {}", e);
                false
            }
        }
    }
}

/// Fallback notifier used when no SMTP configuration is present.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, subject: &str, _body: &str) -> bool {
        warn!("No notifier configured, dropping alert: {}", subject);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_targets_standard_submission_port() {
        let config = AlertEmailConfig::default();
        assert_eq!(config.smtp_server, "smtp.gmail.com");
        assert_eq!(config.smtp_port, 587);
        assert!(config.to_emails.is_empty());
    }

    #[tokio::test]
    async fn test_smtp_notifier_without_recipients_reports_undelivered() {
        let notifier = SmtpNotifier::new(AlertEmailConfig {
            username: "robot".to_string(),
            password: "secret".to_string(),
            from_email: "robot@example.com".to_string(),
            ..AlertEmailConfig::default()
        })
        .unwrap();

        // Short-circuits before any network traffic
        assert!(!notifier.send("EMERGENCY ALERT", "test").await);
    }

    #[tokio::test]
    async fn test_noop_notifier_never_delivers() {
        assert!(!NoopNotifier.send("EMERGENCY ALERT", "test").await);
    }
}
