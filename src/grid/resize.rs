// Appointment Resize
//
// Dragging the bottom edge of a card changes its end time. The start never
// moves; the new length is snapped to 5 minutes and floored at 5 minutes.

use chrono::NaiveDate;

use super::interaction::{GestureOutcome, Rejection};
use crate::models::appointment::{Appointment, AppointmentId, ResourceId};
use crate::models::settings::{MIN_DURATION_MINUTES, SNAP_INTERVAL_MINUTES};
use crate::models::time_of_day::{TimeOfDay, MINUTES_PER_HOUR};
use crate::models::working_hours::WorkingHoursSource;
use crate::services::mutation::MutationRequest;

/// Convert a vertical pointer distance into a duration change, snapped to
/// the 5-minute grid (nearest, halves away from zero).
pub fn snapped_delta_minutes(delta_px: f32, hour_height_px: f32) -> i64 {
    if !delta_px.is_finite() || !hour_height_px.is_finite() || hour_height_px <= 0.0 {
        return 0;
    }
    let step = SNAP_INTERVAL_MINUTES as f64;
    let minutes = (delta_px as f64 / hour_height_px as f64) * MINUTES_PER_HOUR as f64;
    (minutes / step).round() as i64 * SNAP_INTERVAL_MINUTES as i64
}

/// State of an active resize
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    /// The appointment being resized
    pub appointment_id: AppointmentId,
    /// Column the appointment sits in, for the working-hours lookup
    pub resource_id: ResourceId,
    pub date: NaiveDate,
    /// Fixed start of the appointment
    pub start: TimeOfDay,
    /// Length before the gesture began
    pub original_duration_minutes: i64,
    /// Pointer position when the handle was grabbed
    pub pointer_start_y: f32,
    /// Length the card would have if released now
    pub candidate_duration_minutes: i64,
    /// Candidate end lies past the working-hours end
    pub rejected: bool,
}

impl ResizeSession {
    pub fn from_appointment(appointment: &Appointment, pointer_y: f32) -> Self {
        let duration = appointment.duration_minutes();
        Self {
            appointment_id: appointment.id,
            resource_id: appointment.resource_id,
            date: appointment.date,
            start: appointment.start,
            original_duration_minutes: duration,
            pointer_start_y: pointer_y,
            candidate_duration_minutes: duration,
            rejected: false,
        }
    }

    /// Recompute the candidate length for the current pointer position.
    pub fn update(&mut self, pointer_y: f32, hour_height_px: f32, hours: &dyn WorkingHoursSource) {
        let delta = snapped_delta_minutes(pointer_y - self.pointer_start_y, hour_height_px);
        self.candidate_duration_minutes =
            (self.original_duration_minutes + delta).max(MIN_DURATION_MINUTES);

        self.rejected = match hours.hours_for(self.resource_id, self.date) {
            Some(window) => !window.allows_end(self.candidate_end_minutes()),
            None => true,
        };

        log::debug!(
            "Resize {} -> {} minutes (rejected: {})",
            self.appointment_id,
            self.candidate_duration_minutes,
            self.rejected
        );
    }

    pub fn candidate_end_minutes(&self) -> i64 {
        self.start.minutes() as i64 + self.candidate_duration_minutes
    }

    pub fn candidate_end(&self) -> Option<TimeOfDay> {
        self.start.checked_add_minutes(self.candidate_duration_minutes)
    }

    pub fn outcome(&self) -> GestureOutcome {
        if self.candidate_duration_minutes == self.original_duration_minutes {
            return GestureOutcome::Unchanged(self.appointment_id);
        }
        match self.candidate_end() {
            Some(new_end) if !self.rejected => GestureOutcome::Committed(MutationRequest::Resize {
                appointment_id: self.appointment_id,
                new_end,
            }),
            _ => GestureOutcome::Rejected(Rejection::outside_working_hours(self.appointment_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::working_hours::WorkingHours;
    use test_case::test_case;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn session(start: &str, end: &str) -> ResizeSession {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        ResizeSession::from_appointment(&Appointment::new(4, 2, date, t(start), t(end)), 500.0)
    }

    #[test_case(0.0, 0 ; "no movement")]
    #[test_case(40.0, 10 ; "ten minutes")]
    #[test_case(30.0, 10 ; "seven and a half rounds up")]
    #[test_case(28.0, 5 ; "seven minutes")]
    #[test_case(-40.0, -10 ; "upwards")]
    #[test_case(240.0, 60 ; "one hour")]
    fn test_snapped_delta(delta_px: f32, expected: i64) {
        assert_eq!(snapped_delta_minutes(delta_px, 240.0), expected);
    }

    #[test]
    fn test_snapped_delta_degenerate_inputs() {
        assert_eq!(snapped_delta_minutes(f32::NAN, 240.0), 0);
        assert_eq!(snapped_delta_minutes(100.0, 0.0), 0);
    }

    #[test]
    fn test_extend_within_hours() {
        let mut s = session("10:00", "10:30");
        s.update(560.0, 240.0, &WorkingHours::default());

        assert_eq!(s.candidate_duration_minutes, 45);
        assert!(!s.rejected);
        assert_eq!(
            s.outcome(),
            GestureOutcome::Committed(MutationRequest::Resize {
                appointment_id: 4,
                new_end: t("10:45"),
            })
        );
    }

    #[test]
    fn test_duration_floor() {
        let mut s = session("10:00", "10:30");
        s.update(-1000.0, 240.0, &WorkingHours::default());
        assert_eq!(s.candidate_duration_minutes, MIN_DURATION_MINUTES);
        assert_eq!(s.candidate_end(), Some(t("10:05")));
    }

    #[test]
    fn test_past_closing_rejected() {
        let mut s = session("17:30", "18:00");
        s.update(520.0, 240.0, &WorkingHours::default());

        assert_eq!(s.candidate_end_minutes(), 18 * 60 + 5);
        assert!(s.rejected);
        assert_eq!(s.outcome(), GestureOutcome::Rejected(Rejection::outside_working_hours(4)));
    }

    #[test]
    fn test_start_before_opening_is_not_checked() {
        let mut s = session("08:00", "08:30");
        s.update(520.0, 240.0, &WorkingHours::default());
        assert!(!s.rejected);
    }

    #[test]
    fn test_release_at_origin_is_unchanged() {
        let mut s = session("10:00", "10:30");
        s.update(505.0, 240.0, &WorkingHours::default());
        assert_eq!(s.outcome(), GestureOutcome::Unchanged(4));
    }
}
