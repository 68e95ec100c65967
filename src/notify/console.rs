// src/notify/console.rs

//! Console notifier.

use async_trait::async_trait;

use crate::error::Result;
use crate::pipeline::SearchStates;

use super::Notifier;
use super::render::render_text;

/// Prints the full state table, removed flights included, to stdout.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> &str {
        "console"
    }

    async fn notify(&self, states: &SearchStates) -> Result<()> {
        if states.search_count() == 0 {
            return Ok(());
        }
        print!("{}", render_text(states));
        Ok(())
    }
}
