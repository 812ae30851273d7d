//! User-notification collaborator
//!
//! The client surfaces human-readable success and error messages through a
//! [`Notifier`]. A desktop or web host plugs in its toast system; the
//! default writes them to the log.

use std::fmt;

use courier_domain::NormalizedError;
use tracing::{info, warn};

/// Receives the toasts of finished calls
pub trait Notifier: Send + Sync + fmt::Debug {
    /// Called with the server's message after a successful call.
    fn notify_success(&self, message: &str);

    /// Receives the classified error; only its message is meant for users.
    fn notify_error(&self, error: &NormalizedError);
}

/// Writes notifications as tracing events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_success(&self, message: &str) {
        info!(target: "courier::notify", text = message, "success");
    }

    fn notify_error(&self, error: &NormalizedError) {
        warn!(target: "courier::notify", code = error.code(), text = error.message(), "error");
    }
}
