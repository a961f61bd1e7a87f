//! Session-finished notifications.
//!
//! Desktop toasts live outside the core; anything that can deliver a title
//! and body implements [`Notifier`].

use crate::error::NotifyError;
use crate::timer::{SessionKind, SessionMode};

pub const FINISHED_TITLE: &str = "Timer finished";

pub trait Notifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Message shown when a session of `mode` ends.
pub fn finish_message(mode: SessionMode) -> &'static str {
    match mode.kind() {
        SessionKind::Focus => "Session complete. Time for a break.",
        SessionKind::Break => "Break over. Back to work.",
    }
}

/// Writes notifications to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(title, body, "notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_depend_on_kind() {
        assert_eq!(finish_message(SessionMode::Focus50), "Session complete. Time for a break.");
        assert_eq!(finish_message(SessionMode::Break15), "Break over. Back to work.");
    }
}
