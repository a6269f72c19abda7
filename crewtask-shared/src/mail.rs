/// Mail dispatch
///
/// The account flows send two kinds of transactional mail: the
/// confirmation code after registration (and on login while unconfirmed)
/// and the password-reset code. Delivery is an external collaborator
/// behind the [`Mailer`] trait, and it is fire-and-forget: the token and
/// account writes that precede a send are never rolled back because a
/// mail failed. Handlers use [`dispatch`] to spawn the send and move on.
///
/// Two implementations ship:
///
/// - [`HttpMailer`] posts the message to a transactional-mail HTTP API.
/// - [`LogMailer`] logs the code instead of sending; used in development
///   and tests.

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info};

/// Kind of transactional mail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailKind {
    /// Account confirmation code
    Confirmation,

    /// Password reset code
    PasswordReset,
}

impl MailKind {
    /// Subject line for the message
    pub fn subject(&self) -> &'static str {
        match self {
            MailKind::Confirmation => "Crewtask - Confirm your account",
            MailKind::PasswordReset => "Crewtask - Reset your password",
        }
    }

    /// Template identifier sent to the mail provider
    pub fn template(&self) -> &'static str {
        match self {
            MailKind::Confirmation => "account_confirmation",
            MailKind::PasswordReset => "password_reset",
        }
    }
}

/// Error type for mail dispatch
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// The mail provider rejected or failed the request
    #[error("Mail delivery failed: {0}")]
    DeliveryError(String),
}

/// A transactional mail sender
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one message carrying a verification code.
    async fn send(
        &self,
        kind: MailKind,
        to: &str,
        name: &str,
        code: &str,
    ) -> Result<(), MailError>;
}

/// Sends via a transactional-mail HTTP API
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    /// Creates a mailer posting to `endpoint` with bearer `api_key`,
    /// sending from the `from` address.
    pub fn new(endpoint: String, api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(
        &self,
        kind: MailKind,
        to: &str,
        name: &str,
        code: &str,
    ) -> Result<(), MailError> {
        let body = json!({
            "from": self.from,
            "to": to,
            "subject": kind.subject(),
            "template": kind.template(),
            "variables": {
                "name": name,
                "code": code,
            },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::DeliveryError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(MailError::DeliveryError(format!(
                "Provider returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// Logs instead of sending. The code appears in the log stream, which is
/// what you want in development and exactly what you must not run in
/// production.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(
        &self,
        kind: MailKind,
        to: &str,
        name: &str,
        code: &str,
    ) -> Result<(), MailError> {
        info!(
            kind = kind.template(),
            to, name, code, "Mail dispatch (log only)"
        );
        Ok(())
    }
}

/// Fire-and-forget dispatch.
///
/// Spawns the send so the request handler returns without waiting on the
/// provider; a failure is logged and nothing is retried or rolled back.
pub fn dispatch(
    mailer: std::sync::Arc<dyn Mailer>,
    kind: MailKind,
    to: String,
    name: String,
    code: String,
) {
    tokio::spawn(async move {
        if let Err(e) = mailer.send(kind, &to, &name, &code).await {
            error!(kind = kind.template(), %to, "Mail dispatch failed: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingMailer {
        sent: AtomicUsize,
    }

    #[async_trait]
    impl Mailer for CountingMailer {
        async fn send(
            &self,
            _kind: MailKind,
            _to: &str,
            _name: &str,
            _code: &str,
        ) -> Result<(), MailError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_mail_kind_metadata() {
        assert_eq!(MailKind::Confirmation.template(), "account_confirmation");
        assert_eq!(MailKind::PasswordReset.template(), "password_reset");
        assert!(MailKind::Confirmation.subject().contains("Confirm"));
        assert!(MailKind::PasswordReset.subject().contains("Reset"));
    }

    #[tokio::test]
    async fn test_log_mailer_succeeds() {
        let mailer = LogMailer;
        let result = mailer
            .send(MailKind::Confirmation, "dev@example.com", "Dev", "123456")
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_dispatch_is_fire_and_forget() {
        let mailer = Arc::new(CountingMailer {
            sent: AtomicUsize::new(0),
        });

        dispatch(
            mailer.clone(),
            MailKind::PasswordReset,
            "dev@example.com".to_string(),
            "Dev".to_string(),
            "654321".to_string(),
        );

        // The spawned send completes without the caller awaiting it.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(mailer.sent.load(Ordering::SeqCst), 1);
    }
}
