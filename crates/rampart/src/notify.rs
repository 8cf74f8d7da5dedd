//! Transient notifications ("snackbar").
//!
//! At most one notification is visible. Showing a new one replaces the
//! current one; each is dismissed after its own duration.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rampart_common::{Notification, Severity};

use crate::config::NotificationConfig;

/// Notification surface
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

#[derive(Default)]
struct Slot {
    generation: u64,
    current: Option<Notification>,
}

/// Single-slot, auto-dismissing notification surface
#[derive(Default)]
pub struct Snackbar {
    slot: Arc<Mutex<Slot>>,
    generation: AtomicU64,
}

impl Snackbar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently visible notification, if any
    pub fn current(&self) -> Option<Notification> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let now = chrono::Utc::now().timestamp_millis();
        slot.current.clone().filter(|n| !n.is_expired(now))
    }

    pub fn dismiss(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.current = None;
    }
}

impl Notifier for Snackbar {
    fn notify(&self, notification: Notification) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let duration = Duration::from_millis(notification.duration_ms);

        tracing::info!(
            severity = ?notification.severity,
            duration_ms = notification.duration_ms,
            message = %notification.message,
            "Notification shown"
        );

        {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            slot.generation = generation;
            slot.current = Some(notification);
        }

        // Without a runtime the expiry check in `current` still hides it
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let slot = self.slot.clone();
            handle.spawn(async move {
                tokio::time::sleep(duration).await;
                let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
                if slot.generation == generation {
                    slot.current = None;
                }
            });
        }
    }
}

/// Builds notifications with the configured durations
pub struct Announcer {
    notifier: Arc<dyn Notifier>,
    durations: NotificationConfig,
}

impl Announcer {
    pub fn new(notifier: Arc<dyn Notifier>, durations: NotificationConfig) -> Self {
        Self { notifier, durations }
    }

    pub fn show(&self, message: &str, severity: Severity) {
        let duration_ms = match severity {
            Severity::Success => self.durations.success_ms,
            Severity::Error => self.durations.error_ms,
            Severity::Info => self.durations.info_ms,
        };
        self.notifier
            .notify(Notification::new(message, severity, duration_ms));
    }

    pub fn success(&self, message: &str) {
        self.show(message, Severity::Success);
    }

    pub fn error(&self, message: &str) {
        self.show(message, Severity::Error);
    }
}

/// Notifier that keeps everything it is shown
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    shown: Mutex<Vec<Notification>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.shown.lock().unwrap().push(notification);
    }
}
