mod toast;

pub use toast::{Toast, ToastLevel, ToastQueue};

use crate::grid::interaction::{GestureError, Rejection};
use crate::models::appointment::AppointmentId;
use crate::services::mutation::ApplyError;

/// Receives the user-facing signals the grid emits.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    /// A release was refused; the card snaps back.
    fn rejected(&mut self, rejection: &Rejection);

    /// Persistence failed and the change was rolled back.
    fn persistence_failed(&mut self, appointment_id: AppointmentId, error: &ApplyError);

    /// A gesture could not start.
    fn gesture_refused(&mut self, error: &GestureError);
}

/// Notifier that only writes to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn rejected(&mut self, rejection: &Rejection) {
        log::warn!(
            "Appointment {}: {} ({})",
            rejection.appointment_id,
            rejection.message(),
            rejection.reason.as_str()
        );
    }

    fn persistence_failed(&mut self, appointment_id: AppointmentId, error: &ApplyError) {
        log::error!("Failed to save appointment {}: {}", appointment_id, error);
    }

    fn gesture_refused(&mut self, error: &GestureError) {
        log::info!("Gesture refused: {}", error);
    }
}

impl Notifier for ToastQueue {
    fn rejected(&mut self, rejection: &Rejection) {
        self.warning(rejection.message());
    }

    fn persistence_failed(&mut self, _appointment_id: AppointmentId, error: &ApplyError) {
        self.error(format!("Couldn't save the change: {}", error));
    }

    fn gesture_refused(&mut self, error: &GestureError) {
        match error {
            // Nothing to tell the user; the pointer simply did nothing
            GestureError::Busy => {}
            other => self.info(other.to_string()),
        }
    }
}
