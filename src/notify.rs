//! User-facing toast notifications.
//!
//! The shell never blocks on the UI: toasts are pushed onto an unbounded
//! channel that the host drains at its own pace. Every toast is also logged.

use std::fmt;

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            ToastLevel::Info => "info",
            ToastLevel::Success => "ok",
            ToastLevel::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

/// Sending half of the toast channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Toast>,
}

impl Notifier {
    /// Create a notifier and the receiver the host should drain.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Toast>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(ToastLevel::Info, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message.into());
    }

    fn push(&self, level: ToastLevel, message: String) {
        match level {
            ToastLevel::Error => tracing::warn!(%message, "toast"),
            ToastLevel::Info | ToastLevel::Success => tracing::info!(%message, "toast"),
        }
        if self.tx.send(Toast { level, message }).is_err() {
            tracing::debug!("toast receiver dropped");
        }
    }
}

#[cfg(test)]
#[path = "notify_test.rs"]
mod tests;
