//! Alert delivery sinks.

use std::io::Write;
use std::sync::Arc;

use crate::affect::types::AffectLabel;
use crate::config::NotifierConfig;

/// Human-readable alert line, matching what the console sink prints and
/// what the command sink passes to its child process.
pub fn alert_message(label: AffectLabel) -> String {
    format!("⚠ Frequent {} detected!", label.as_str().to_uppercase())
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notifier io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("notifier command failed: {0}")]
    Command(String),
}

/// Delivers one alert. Implementations may block; the dispatcher always
/// calls them from a blocking task.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, label: AffectLabel) -> Result<(), NotifyError>;
}

/// Default sink: warning log plus a terminal bell.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, label: AffectLabel) -> Result<(), NotifyError> {
        tracing::warn!(label = %label, "{}", alert_message(label));
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        Ok(())
    }
}

/// Sink that runs an external program per alert, e.g. `notify-send` or a
/// site-specific escalation script.
///
/// The program receives two arguments: the machine label and the
/// human-readable message. A non-zero exit status is a delivery failure.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    program: String,
}

impl CommandNotifier {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl NotificationSink for CommandNotifier {
    fn notify(&self, label: AffectLabel) -> Result<(), NotifyError> {
        let status = std::process::Command::new(&self.program)
            .arg(label.as_str())
            .arg(alert_message(label))
            .status()?;

        if !status.success() {
            return Err(NotifyError::Command(format!(
                "{} exited with {}",
                self.program, status
            )));
        }
        Ok(())
    }
}

pub fn from_config(config: &NotifierConfig) -> Arc<dyn NotificationSink> {
    match &config.command {
        Some(program) => Arc::new(CommandNotifier::new(program.clone())),
        None => Arc::new(ConsoleNotifier),
    }
}
