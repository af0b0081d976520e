use chrono::NaiveDate;

use super::interaction::{GestureOutcome, Rejection};
use super::time_axis::TimeAxis;
use crate::models::appointment::{Appointment, AppointmentId, ResourceId};
use crate::models::time_of_day::TimeOfDay;
use crate::models::working_hours::WorkingHoursSource;
use crate::services::mutation::MutationRequest;

/// Pointer position over a resource column during a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragHover {
    pub resource_id: ResourceId,
    pub date: NaiveDate,
    /// Vertical pointer position, in the same coordinate space as the drag origin.
    pub pointer_y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub appointment_id: AppointmentId,
    pub original_start: TimeOfDay,
    pub original_resource_id: ResourceId,
    pub original_date: NaiveDate,
    pub duration_minutes: i64,
    pub pointer_origin_y: f32,
    pub candidate_start: TimeOfDay,
    pub candidate_resource_id: ResourceId,
    pub candidate_date: NaiveDate,
    pub rejected: bool,
}

impl DragSession {
    pub fn from_appointment(appointment: &Appointment, pointer_y: f32) -> Self {
        Self {
            appointment_id: appointment.id,
            original_start: appointment.start,
            original_resource_id: appointment.resource_id,
            original_date: appointment.date,
            duration_minutes: appointment.duration_minutes(),
            pointer_origin_y: pointer_y,
            candidate_start: appointment.start,
            candidate_resource_id: appointment.resource_id,
            candidate_date: appointment.date,
            rejected: false,
        }
    }

    /// Recompute the candidate slot for a new hover position.
    pub fn retarget(&mut self, hover: DragHover, axis: &TimeAxis, hours: &dyn WorkingHoursSource) {
        let offset = axis.time_to_offset(self.original_start) + (hover.pointer_y - self.pointer_origin_y);
        self.candidate_start = axis.offset_to_time(offset);
        self.candidate_resource_id = hover.resource_id;
        self.candidate_date = hover.date;

        let start = self.candidate_start.minutes() as i64;
        self.rejected = match hours.hours_for(hover.resource_id, hover.date) {
            Some(window) => !window.contains_span(start, self.candidate_end_minutes()),
            None => true,
        };

        log::debug!(
            "Drag {} -> resource {} on {} at {} (rejected: {})",
            self.appointment_id,
            self.candidate_resource_id,
            self.candidate_date,
            self.candidate_start,
            self.rejected
        );
    }

    /// Candidate end in minutes since midnight; may run past `24:00`.
    pub fn candidate_end_minutes(&self) -> i64 {
        self.candidate_start.minutes() as i64 + self.duration_minutes
    }

    pub fn candidate_end(&self) -> Option<TimeOfDay> {
        self.candidate_start.checked_add_minutes(self.duration_minutes)
    }

    pub fn is_unchanged(&self) -> bool {
        self.candidate_start == self.original_start
            && self.candidate_resource_id == self.original_resource_id
            && self.candidate_date == self.original_date
    }

    pub fn to_request(&self) -> Option<MutationRequest> {
        let new_end = self.candidate_end()?;
        Some(MutationRequest::Move {
            appointment_id: self.appointment_id,
            new_start: self.candidate_start,
            new_end,
            new_resource_id: (self.candidate_resource_id != self.original_resource_id)
                .then_some(self.candidate_resource_id),
            new_date: (self.candidate_date != self.original_date).then_some(self.candidate_date),
        })
    }

    pub fn outcome(&self) -> GestureOutcome {
        if self.is_unchanged() {
            return GestureOutcome::Unchanged(self.appointment_id);
        }
        if self.rejected {
            return GestureOutcome::Rejected(Rejection::outside_working_hours(self.appointment_id));
        }
        match self.to_request() {
            Some(request) => GestureOutcome::Committed(request),
            None => GestureOutcome::Rejected(Rejection::outside_working_hours(self.appointment_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::working_hours::{DayHours, WeeklyHours, WorkingHours};
    use chrono::Weekday;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn appointment(start: &str, end: &str) -> Appointment {
        Appointment::new(7, 1, date(), t(start), t(end))
    }

    fn hover(pointer_y: f32) -> DragHover {
        DragHover {
            resource_id: 1,
            date: date(),
            pointer_y,
        }
    }

    #[test]
    fn test_drag_down_seventeen_minutes_snaps_to_quarter_past() {
        let axis = TimeAxis::full_day(240.0);
        let mut session = DragSession::from_appointment(&appointment("09:00", "09:30"), 100.0);

        // 17 minutes at 240px/h is 68px
        session.retarget(hover(168.0), &axis, &WorkingHours::default());

        assert_eq!(session.candidate_start, t("09:15"));
        assert_eq!(session.candidate_end(), Some(t("09:45")));
        assert!(!session.rejected);
        assert_eq!(
            session.to_request(),
            Some(MutationRequest::Move {
                appointment_id: 7,
                new_start: t("09:15"),
                new_end: t("09:45"),
                new_resource_id: None,
                new_date: None,
            })
        );
    }

    #[test]
    fn test_drop_past_closing_is_rejected() {
        let axis = TimeAxis::full_day(240.0);
        let mut session = DragSession::from_appointment(&appointment("16:00", "17:00"), 0.0);

        // 16:00 -> 17:10, ending 18:10
        session.retarget(hover(280.0), &axis, &WorkingHours::default());

        assert_eq!(session.candidate_start, t("17:10"));
        assert_eq!(session.candidate_end_minutes(), 18 * 60 + 10);
        assert!(session.rejected);
        assert_eq!(
            session.outcome(),
            GestureOutcome::Rejected(Rejection::outside_working_hours(7))
        );
    }

    #[test]
    fn test_rejection_clears_when_back_inside() {
        let axis = TimeAxis::full_day(240.0);
        let mut session = DragSession::from_appointment(&appointment("10:00", "11:00"), 0.0);

        session.retarget(hover(-480.0), &axis, &WorkingHours::default());
        assert!(session.rejected);

        session.retarget(hover(-240.0), &axis, &WorkingHours::default());
        assert!(!session.rejected);
        assert_eq!(session.candidate_start, t("09:00"));
    }

    #[test]
    fn test_closed_day_rejects() {
        let axis = TimeAxis::full_day(240.0);
        let week = WeeklyHours {
            default: WorkingHours::default(),
            days: vec![DayHours {
                weekday: Weekday::Fri,
                hours: None,
            }],
        };

        let mut session = DragSession::from_appointment(&appointment("10:00", "11:00"), 0.0);
        session.retarget(hover(240.0), &axis, &week);
        assert!(session.rejected);
    }

    #[test]
    fn test_move_to_other_resource_and_day() {
        let axis = TimeAxis::full_day(240.0);
        let mut session = DragSession::from_appointment(&appointment("10:00", "10:45"), 50.0);
        let next_day = date().succ_opt().unwrap();

        session.retarget(
            DragHover {
                resource_id: 3,
                date: next_day,
                pointer_y: 50.0,
            },
            &axis,
            &WorkingHours::default(),
        );

        assert!(!session.is_unchanged());
        assert_eq!(
            session.outcome(),
            GestureOutcome::Committed(MutationRequest::Move {
                appointment_id: 7,
                new_start: t("10:00"),
                new_end: t("10:45"),
                new_resource_id: Some(3),
                new_date: Some(next_day),
            })
        );
    }

    #[test]
    fn test_drop_in_place_is_unchanged() {
        let axis = TimeAxis::full_day(240.0);
        let mut session = DragSession::from_appointment(&appointment("10:00", "10:45"), 50.0);
        // One pixel is a quarter of a minute and snaps back
        session.retarget(hover(51.0), &axis, &WorkingHours::default());
        assert_eq!(session.outcome(), GestureOutcome::Unchanged(7));
    }
}
