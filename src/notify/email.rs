// src/notify/email.rs

//! E-mail notifier.
//!
//! Mails the HTML rendering of available flights over SMTP (STARTTLS),
//! only when a flight was added or got cheaper.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::{AppError, Result};
use crate::models::EmailConfig;
use crate::pipeline::SearchStates;

use super::Notifier;
use super::render::render_html;

const SUBJECT: &str = "Southwest Flight Price Update";

/// Delivers a built message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: Message) -> Result<()>;
}

/// SMTP relay with credentials.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig, password: String) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| AppError::config(format!("SMTP host '{}': {e}", config.smtp_host)))?
            .port(config.smtp_port)
            .credentials(Credentials::new(config.login().to_string(), password))
            .build();
        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: Message) -> Result<()> {
        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::notify("email", e))?;
        Ok(())
    }
}

/// Read the SMTP password from the first line of `path`.
///
/// The file must be readable and writable by its owner only (mode 0600).
pub fn load_password(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mode = fs::metadata(path)?.permissions().mode() & 0o777;
        if mode != 0o600 {
            return Err(AppError::config(format!(
                "Password file {} must have mode 0600, not {mode:04o}",
                path.display()
            )));
        }
    }

    let content = fs::read_to_string(path)?;
    let password = content.lines().next().unwrap_or_default().to_string();
    if password.is_empty() {
        return Err(AppError::config(format!(
            "Password file {} is empty",
            path.display()
        )));
    }
    Ok(password)
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| AppError::config(format!("Invalid e-mail address '{address}': {e}")))
}

/// Mails the available flights whenever a flight was added or got cheaper.
pub struct EmailNotifier {
    transport: Box<dyn MailTransport>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    pub fn new(transport: impl MailTransport + 'static, from: &str, to: &str) -> Result<Self> {
        Ok(Self {
            transport: Box::new(transport),
            from: parse_mailbox(from)?,
            to: parse_mailbox(to)?,
        })
    }

    /// Load the password and connect the SMTP transport described by `config`.
    pub fn from_config(config: &EmailConfig) -> Result<Self> {
        let password = load_password(&config.password_file)?;
        let mailer = SmtpMailer::new(config, password)?;
        Self::new(mailer, &config.from, config.recipient())
    }

    /// HTML message for an already filtered table.
    pub fn build_message(&self, available: &SearchStates) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(SUBJECT)
            .header(ContentType::TEXT_HTML)
            .body(render_html(available))
            .map_err(|e| AppError::notify("email", e))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    async fn notify(&self, states: &SearchStates) -> Result<()> {
        let (available, improved) = states.only_available();
        if !improved {
            log::debug!("No added or cheaper flights, not sending e-mail");
            return Ok(());
        }

        let message = self.build_message(&available)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| match e {
                AppError::Notify { .. } => e,
                other => AppError::notify(self.name(), other),
            })?;
        log::info!("E-mailed {} available flights to {}", available.len(), self.to);
        Ok(())
    }
}
