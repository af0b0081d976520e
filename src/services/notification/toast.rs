//! Toast queue for brief feedback messages.
//!
//! Toasts are queued here and drained by whatever renders the grid. They
//! expire after a few seconds; the renderer can fade them using `opacity`.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Types of toast notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A single toast notification
#[derive(Debug, Clone)]
pub struct Toast {
    /// The message to display
    pub message: String,
    /// The severity level
    pub level: ToastLevel,
    /// When this toast was created
    pub created_at: Instant,
    /// How long to show this toast
    pub duration: Duration,
}

impl Toast {
    pub const DEFAULT_DURATION: Duration = Duration::from_secs(3);
    const FADE: Duration = Duration::from_millis(500);

    pub fn new(message: impl Into<String>, level: ToastLevel) -> Self {
        Self {
            message: message.into(),
            level,
            created_at: Instant::now(),
            duration: Self::DEFAULT_DURATION,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.duration
    }

    /// Opacity for fading out over the last half second.
    pub fn opacity_at(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.created_at);
        let fade_start = self.duration.saturating_sub(Self::FADE);

        if elapsed >= self.duration {
            0.0
        } else if elapsed >= fade_start {
            ((self.duration - elapsed).as_secs_f32() / Self::FADE.as_secs_f32()).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

/// Pending toasts, oldest first
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, toast: Toast) {
        self.toasts.push_back(toast);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.add(Toast::new(message, ToastLevel::Success));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.add(Toast::new(message, ToastLevel::Info));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.add(Toast::new(message, ToastLevel::Warning));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.add(Toast::new(message, ToastLevel::Error));
    }

    /// Remove expired toasts
    pub fn cleanup(&mut self) {
        let now = Instant::now();
        self.toasts.retain(|t| !t.is_expired_at(now));
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    /// Hand every queued toast to the caller.
    pub fn drain(&mut self) -> impl Iterator<Item = Toast> + '_ {
        self.toasts.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_order() {
        let mut queue = ToastQueue::new();
        queue.success("Saved");
        queue.error("Failed");

        let messages: Vec<String> = queue.drain().map(|t| t.message).collect();
        assert_eq!(messages, vec!["Saved", "Failed"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_expiry_and_fade() {
        let toast = Toast::new("Moved", ToastLevel::Info);
        let start = toast.created_at;

        assert!(!toast.is_expired_at(start));
        assert_eq!(toast.opacity_at(start), 1.0);
        let halfway_through_fade = start + Duration::from_millis(2750);
        assert!((toast.opacity_at(halfway_through_fade) - 0.5).abs() < 1e-3);
        assert!(toast.is_expired_at(start + Duration::from_secs(3)));
        assert_eq!(toast.opacity_at(start + Duration::from_secs(4)), 0.0);
    }

    #[test]
    fn test_cleanup_removes_expired() {
        let mut queue = ToastQueue::new();
        queue.add(Toast::new("Gone", ToastLevel::Info).with_duration(Duration::ZERO));
        queue.info("Still here");

        queue.cleanup();

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().next().map(|t| t.message.as_str()), Some("Still here"));
    }
}
