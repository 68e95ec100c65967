//! Notification outputs for the state table.
//!
//! Notifiers consume the whole search state table once per cycle, after
//! every search has been diffed.
//!
//! - `ConsoleNotifier`: full table, every cycle
//! - `EmailNotifier`: available flights over SMTP, only when something was
//!   added or got cheaper
//! - `HtmlReportNotifier`: available flights, only when something was added
//!   or got cheaper
//! - `JsonReportNotifier`: available flights, every cycle

pub mod console;
pub mod email;
pub mod render;
pub mod report;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::SearchStates;

// Re-export for convenience
pub use console::ConsoleNotifier;
pub use email::EmailNotifier;
pub use render::{render_html, render_text};
pub use report::{HtmlReportNotifier, JsonReportNotifier};

/// Consumer of the state table after each cycle.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    async fn notify(&self, states: &SearchStates) -> Result<()>;
}

/// Runs notifiers in order, stopping at the first failure.
#[derive(Default)]
pub struct NotifierChain {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifiers.push(Box::new(notifier));
        self
    }

    pub fn push(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// Build the chain the configuration asks for.
    ///
    /// Fails when the e-mail notifier cannot be set up.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut chain = Self::new();
        if config.notify.console_enabled {
            chain.push(Box::new(ConsoleNotifier::new()));
        }
        if let Some(path) = &config.notify.html_report {
            chain.push(Box::new(HtmlReportNotifier::new(path)));
        }
        if let Some(path) = &config.notify.json_report {
            chain.push(Box::new(JsonReportNotifier::new(path)));
        }
        if let Some(email) = &config.notify.email {
            chain.push(Box::new(EmailNotifier::from_config(email)?));
        }
        Ok(chain)
    }
}

#[async_trait]
impl Notifier for NotifierChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn notify(&self, states: &SearchStates) -> Result<()> {
        for notifier in &self.notifiers {
            log::debug!("Notifying {}", notifier.name());
            notifier.notify(states).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::AppError;

    struct Recording {
        name: &'static str,
        fail: bool,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Notifier for Recording {
        fn name(&self) -> &str {
            self.name
        }

        async fn notify(&self, _states: &SearchStates) -> Result<()> {
            self.calls.lock().unwrap().push(self.name);
            if self.fail {
                return Err(AppError::notify(self.name, "boom"));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn chain_stops_at_first_failure() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let chain = NotifierChain::new()
            .with(Recording { name: "a", fail: false, calls: Arc::clone(&calls) })
            .with(Recording { name: "b", fail: true, calls: Arc::clone(&calls) })
            .with(Recording { name: "c", fail: false, calls: Arc::clone(&calls) });

        let err = chain.notify(&SearchStates::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Notify { .. }));
        assert_eq!(*calls.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn from_config_follows_notify_section() {
        let mut config = Config::default();
        assert_eq!(NotifierChain::from_config(&config).unwrap().len(), 1);

        config.notify.console_enabled = false;
        assert!(NotifierChain::from_config(&config).unwrap().is_empty());

        config.notify.html_report = Some("report.html".to_string());
        config.notify.json_report = Some("current.json".to_string());
        assert_eq!(NotifierChain::from_config(&config).unwrap().len(), 2);
    }

    #[test]
    fn from_config_fails_without_password_file() {
        let mut config = Config::default();
        config.notify.email = Some(crate::models::EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            from: "fares@example.com".to_string(),
            to: None,
            username: None,
            password_file: "/definitely/not/here/smtp.pass".to_string(),
        });
        assert!(NotifierChain::from_config(&config).is_err());
    }
}
