//! Transient user notifications ("toasts") and the observer trait.
//!
//! Inject an [`Arc<dyn Notifier>`] into
//! [`crate::controller::UploadController`] to receive every toast and every
//! phase transition as it happens. A terminal front end prints them; a GUI
//! forwards them to its event loop.
//!
//! Independently of any observer, the controller keeps the current toast in
//! a [`ToastSlot`]: one toast at a time, the newest replaces the previous
//! one and restarts its dismiss timer.
//!
//! # Example
//!
//! ```rust
//! use invoice_extract::notify::{Notification, Notifier};
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct Collect(Mutex<Vec<String>>);
//!
//! impl Notifier for Collect {
//!     fn notify(&self, n: &Notification) {
//!         self.0.lock().unwrap().push(n.message.clone());
//!     }
//! }
//! ```

use crate::controller::Phase;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Visual style of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Default,
    Success,
    Error,
}

/// A transient, auto-dismissing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    /// How long the toast stays visible.
    #[serde(skip)]
    pub duration: Duration,
}

impl Notification {
    pub fn new(message: impl Into<String>, kind: NotificationKind, duration: Duration) -> Self {
        Self {
            message: message.into(),
            kind,
            duration,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

/// Receives toasts and phase transitions from the controller.
///
/// All methods default to no-ops so implementors override only what they
/// use. Implementations must be `Send + Sync`.
pub trait Notifier: Send + Sync {
    /// Called for every toast, success and error alike.
    fn notify(&self, notification: &Notification) {
        let _ = notification;
    }

    /// Called whenever the controller changes phase.
    ///
    /// # Arguments
    /// * `from` — phase before the transition
    /// * `to`   — phase after the transition
    fn on_transition(&self, from: Phase, to: Phase) {
        let _ = (from, to);
    }
}

/// A notifier that ignores everything. The controller's default.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {}

/// Convenience alias for the type held by the controller.
pub type SharedNotifier = Arc<dyn Notifier>;

/// Holds the toast currently on screen.
#[derive(Debug, Default)]
pub struct ToastSlot {
    current: Option<(Notification, Instant)>,
}

impl ToastSlot {
    /// Show `notification` from `now`, replacing whatever was visible.
    pub fn show_at(&mut self, notification: Notification, now: Instant) {
        self.current = Some((notification, now));
    }

    /// The toast visible at `now`, if its duration has not elapsed.
    pub fn visible_at(&self, now: Instant) -> Option<&Notification> {
        self.current.as_ref().and_then(|(n, shown)| {
            (now.saturating_duration_since(*shown) < n.duration).then_some(n)
        })
    }

    /// The toast visible right now.
    pub fn visible(&self) -> Option<&Notification> {
        self.visible_at(Instant::now())
    }

    /// The last toast shown, whether or not it has been dismissed.
    pub fn last(&self) -> Option<&Notification> {
        self.current.as_ref().map(|(n, _)| n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn toast(msg: &str, kind: NotificationKind) -> Notification {
        Notification::new(msg, kind, Duration::from_millis(3000))
    }

    #[test]
    fn toast_dismisses_after_duration() {
        let mut slot = ToastSlot::default();
        let t0 = Instant::now();
        slot.show_at(toast("Extraction successful!", NotificationKind::Success), t0);

        assert!(slot.visible_at(t0).is_some());
        assert!(slot.visible_at(t0 + Duration::from_millis(2999)).is_some());
        assert!(slot.visible_at(t0 + Duration::from_millis(3000)).is_none());
        assert_eq!(slot.last().unwrap().message, "Extraction successful!");
    }

    #[test]
    fn newer_toast_replaces_and_restarts_timer() {
        let mut slot = ToastSlot::default();
        let t0 = Instant::now();
        slot.show_at(toast("first", NotificationKind::Default), t0);
        let t1 = t0 + Duration::from_millis(2500);
        slot.show_at(toast("second", NotificationKind::Error), t1);

        let visible = slot.visible_at(t0 + Duration::from_millis(4000)).unwrap();
        assert_eq!(visible.message, "second");
        assert!(visible.is_error());
    }

    #[test]
    fn empty_slot_shows_nothing() {
        let slot = ToastSlot::default();
        assert!(slot.visible().is_none());
        assert!(slot.last().is_none());
    }

    struct Tracking {
        toasts: Mutex<Vec<String>>,
        transitions: AtomicUsize,
    }

    impl Notifier for Tracking {
        fn notify(&self, n: &Notification) {
            self.toasts.lock().unwrap().push(n.message.clone());
        }

        fn on_transition(&self, _from: Phase, _to: Phase) {
            self.transitions.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_notifier_does_not_panic() {
        let n: SharedNotifier = Arc::new(NoopNotifier);
        n.notify(&toast("x", NotificationKind::Default));
        n.on_transition(Phase::Idle, Phase::FileSelected);
    }

    #[test]
    fn tracking_notifier_receives_events() {
        let t = Tracking {
            toasts: Mutex::new(Vec::new()),
            transitions: AtomicUsize::new(0),
        };
        t.notify(&toast("JSON copied to clipboard", NotificationKind::Success));
        t.on_transition(Phase::Results, Phase::Idle);
        assert_eq!(t.toasts.lock().unwrap().as_slice(), ["JSON copied to clipboard"]);
        assert_eq!(t.transitions.load(Ordering::SeqCst), 1);
    }
}
