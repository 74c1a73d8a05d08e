//! UI feedback capability.
//!
//! The synchronizer reports outcomes through a [`Notifier`] it is handed at
//! construction. Environments without a UI pass [`NoopNotifier`].

use tracing::{info, warn};

/// Toast styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastLevel {
    Success,
    Error,
}

/// Receives user-facing feedback from cart operations.
pub trait Notifier: Send + Sync {
    /// Show a transient message.
    fn notify(&self, message: &str, level: ToastLevel);

    /// Enable or disable the quantity +/- controls. Called with `false` when a
    /// quantity update starts and `true` when it finishes, whatever the outcome.
    fn set_quantity_controls_enabled(&self, _enabled: bool) {}
}

/// Discards all feedback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _message: &str, _level: ToastLevel) {}
}

/// Writes toasts to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, level: ToastLevel) {
        match level {
            ToastLevel::Success => info!(toast = message, "Notification"),
            ToastLevel::Error => warn!(toast = message, "Notification"),
        }
    }
}
