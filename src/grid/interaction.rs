//! Gesture state machine for the scheduling grid.
//!
//! One gesture at a time: `Idle -> Dragging -> Idle` or
//! `Idle -> Resizing -> Idle`. Drag-over positions are buffered and only
//! evaluated once per animation frame, so the last position of a frame wins.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use super::drag::{DragHover, DragSession};
use super::layout::{compute_geometry, Geometry, LayoutPolicy};
use super::overlap::SubColumnAssignment;
use super::resize::ResizeSession;
use super::time_axis::TimeAxis;
use crate::models::appointment::{Appointment, AppointmentId, AppointmentStatus, ResourceId};
use crate::models::time_of_day::TimeOfDay;
use crate::models::working_hours::WorkingHoursSource;
use crate::services::mutation::MutationRequest;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GestureError {
    #[error("appointment {id} is {status} and cannot be moved or resized")]
    Immutable {
        id: AppointmentId,
        status: AppointmentStatus,
    },
    #[error("no permission to edit appointments of resource {0}")]
    PermissionDenied(ResourceId),
    #[error("appointment {0} has an invalid time range")]
    Malformed(AppointmentId),
    #[error("another gesture is already in progress")]
    Busy,
    #[error("appointment {0} has a change awaiting confirmation")]
    PendingMutation(AppointmentId),
    #[error("appointment {0} is not on the board")]
    UnknownAppointment(AppointmentId),
}

/// Decides whether the current user may edit a resource's appointments.
pub trait EditPermission {
    fn can_edit(&self, resource_id: ResourceId) -> bool;
}

impl<F> EditPermission for F
where
    F: Fn(ResourceId) -> bool,
{
    fn can_edit(&self, resource_id: ResourceId) -> bool {
        self(resource_id)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl EditPermission for AllowAll {
    fn can_edit(&self, _resource_id: ResourceId) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    OutsideWorkingHours,
}

impl RejectionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectionReason::OutsideWorkingHours => "outside-working-hours",
        }
    }
}

/// Signal sent to the notifier when a release is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub appointment_id: AppointmentId,
    pub reason: RejectionReason,
}

impl Rejection {
    pub fn outside_working_hours(appointment_id: AppointmentId) -> Self {
        Self {
            appointment_id,
            reason: RejectionReason::OutsideWorkingHours,
        }
    }

    pub fn message(&self) -> String {
        match self.reason {
            RejectionReason::OutsideWorkingHours => {
                "Appointment can't be placed outside working hours".to_string()
            }
        }
    }
}

/// Result of releasing a gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    Committed(MutationRequest),
    Rejected(Rejection),
    /// Released where it started; nothing to persist.
    Unchanged(AppointmentId),
    /// No gesture was active.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize,
}

/// Where the card would land if released now.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreviewGeometry {
    pub appointment_id: AppointmentId,
    pub resource_id: ResourceId,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    /// `None` when the candidate runs past midnight.
    pub end: Option<TimeOfDay>,
    /// Offset of `start` from the top of the axis.
    pub offset_px: f32,
    pub geometry: Geometry,
    pub rejected: bool,
}

#[derive(Debug, Clone, Default)]
enum GestureState {
    #[default]
    Idle,
    Dragging(DragSession),
    Resizing(ResizeSession),
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    axis: TimeAxis,
    state: GestureState,
    pending_hover: Option<DragHover>,
}

impl InteractionController {
    pub fn new(axis: TimeAxis) -> Self {
        Self {
            axis,
            state: GestureState::Idle,
            pending_hover: None,
        }
    }

    pub fn axis(&self) -> &TimeAxis {
        &self.axis
    }

    /// Swap the axis, e.g. after a zoom change. Any running gesture is cancelled.
    pub fn set_axis(&mut self, axis: TimeAxis) {
        self.cancel();
        self.axis = axis;
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    pub fn active_gesture(&self) -> Option<(GestureKind, AppointmentId)> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::Dragging(s) => Some((GestureKind::Drag, s.appointment_id)),
            GestureState::Resizing(s) => Some((GestureKind::Resize, s.appointment_id)),
        }
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        match &self.state {
            GestureState::Dragging(session) => Some(session),
            _ => None,
        }
    }

    pub fn resize_session(&self) -> Option<&ResizeSession> {
        match &self.state {
            GestureState::Resizing(session) => Some(session),
            _ => None,
        }
    }

    pub fn on_drag_start(
        &mut self,
        appointment: &Appointment,
        pointer_y: f32,
        permission: &dyn EditPermission,
    ) -> Result<(), GestureError> {
        self.check_can_start(appointment, permission)?;
        log::debug!("Drag start: appointment {}", appointment.id);
        self.state = GestureState::Dragging(DragSession::from_appointment(appointment, pointer_y));
        self.pending_hover = None;
        Ok(())
    }

    /// Record the pointer position; it is evaluated on the next frame.
    pub fn on_drag_over(&mut self, hover: DragHover) {
        if matches!(self.state, GestureState::Dragging(_)) {
            self.pending_hover = Some(hover);
        }
    }

    /// Evaluate the buffered drag position. Returns whether the candidate was updated.
    pub fn on_animation_frame(&mut self, hours: &dyn WorkingHoursSource) -> bool {
        let Some(hover) = self.pending_hover.take() else {
            return false;
        };
        match &mut self.state {
            GestureState::Dragging(session) => {
                session.retarget(hover, &self.axis, hours);
                true
            }
            _ => false,
        }
    }

    pub fn on_drop(&mut self, hours: &dyn WorkingHoursSource) -> GestureOutcome {
        self.on_animation_frame(hours);
        match std::mem::take(&mut self.state) {
            GestureState::Dragging(session) => {
                let outcome = session.outcome();
                log::debug!("Drop: appointment {} -> {:?}", session.appointment_id, outcome);
                outcome
            }
            other => {
                self.state = other;
                GestureOutcome::Idle
            }
        }
    }

    pub fn on_resize_start(
        &mut self,
        appointment: &Appointment,
        pointer_y: f32,
        permission: &dyn EditPermission,
    ) -> Result<(), GestureError> {
        self.check_can_start(appointment, permission)?;
        log::debug!("Resize start: appointment {}", appointment.id);
        self.state = GestureState::Resizing(ResizeSession::from_appointment(appointment, pointer_y));
        Ok(())
    }

    pub fn on_resize_move(&mut self, pointer_y: f32, hours: &dyn WorkingHoursSource) -> bool {
        let hour_height = self.axis.hour_height_px();
        match &mut self.state {
            GestureState::Resizing(session) => {
                session.update(pointer_y, hour_height, hours);
                true
            }
            _ => false,
        }
    }

    pub fn on_resize_end(&mut self) -> GestureOutcome {
        match std::mem::take(&mut self.state) {
            GestureState::Resizing(session) => {
                let outcome = session.outcome();
                log::debug!("Resize end: appointment {} -> {:?}", session.appointment_id, outcome);
                outcome
            }
            other => {
                self.state = other;
                GestureOutcome::Idle
            }
        }
    }

    /// Abandon the active gesture. Returns the appointment it was acting on.
    pub fn cancel(&mut self) -> Option<AppointmentId> {
        self.pending_hover = None;
        let cancelled = self.active_gesture().map(|(_, id)| id);
        if let Some(id) = cancelled {
            log::debug!("Gesture cancelled: appointment {}", id);
        }
        self.state = GestureState::Idle;
        cancelled
    }

    /// Geometry of the card under the pointer, drawn as a solo card.
    pub fn preview(&self, policy: LayoutPolicy) -> Option<PreviewGeometry> {
        let (appointment_id, resource_id, date, start, duration, end, rejected) = match &self.state {
            GestureState::Idle => return None,
            GestureState::Dragging(s) => (
                s.appointment_id,
                s.candidate_resource_id,
                s.candidate_date,
                s.candidate_start,
                s.duration_minutes,
                s.candidate_end(),
                s.rejected,
            ),
            GestureState::Resizing(s) => (
                s.appointment_id,
                s.resource_id,
                s.date,
                s.start,
                s.candidate_duration_minutes,
                s.candidate_end(),
                s.rejected,
            ),
        };

        Some(PreviewGeometry {
            appointment_id,
            resource_id,
            date,
            start,
            end,
            offset_px: self.axis.time_to_offset(start),
            geometry: compute_geometry(start, duration, SubColumnAssignment::SOLO, policy),
            rejected,
        })
    }

    fn check_can_start(
        &self,
        appointment: &Appointment,
        permission: &dyn EditPermission,
    ) -> Result<(), GestureError> {
        if !self.is_idle() {
            return Err(GestureError::Busy);
        }
        if appointment.status.is_immutable() {
            return Err(GestureError::Immutable {
                id: appointment.id,
                status: appointment.status,
            });
        }
        if !appointment.is_well_formed() {
            return Err(GestureError::Malformed(appointment.id));
        }
        if !permission.can_edit(appointment.resource_id) {
            return Err(GestureError::PermissionDenied(appointment.resource_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::working_hours::WorkingHours;
    use pretty_assertions::assert_eq;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn appointment(id: AppointmentId, start: &str, end: &str) -> Appointment {
        Appointment::new(id, 1, date(), t(start), t(end))
    }

    fn hover(pointer_y: f32) -> DragHover {
        DragHover {
            resource_id: 1,
            date: date(),
            pointer_y,
        }
    }

    fn controller() -> InteractionController {
        InteractionController::new(TimeAxis::full_day(240.0))
    }

    #[test]
    fn test_drag_lifecycle() {
        let mut ctl = controller();
        let hours = WorkingHours::default();

        ctl.on_drag_start(&appointment(1, "09:00", "09:30"), 0.0, &AllowAll)
            .unwrap();
        assert_eq!(ctl.active_gesture(), Some((GestureKind::Drag, 1)));

        ctl.on_drag_over(hover(68.0));
        let outcome = ctl.on_drop(&hours);

        assert_eq!(
            outcome,
            GestureOutcome::Committed(MutationRequest::Move {
                appointment_id: 1,
                new_start: t("09:15"),
                new_end: t("09:45"),
                new_resource_id: None,
                new_date: None,
            })
        );
        assert!(ctl.is_idle());
    }

    #[test]
    fn test_last_position_in_frame_wins() {
        let mut ctl = controller();
        let hours = WorkingHours::default();
        ctl.on_drag_start(&appointment(1, "10:00", "10:30"), 0.0, &AllowAll)
            .unwrap();

        ctl.on_drag_over(hover(120.0));
        ctl.on_drag_over(hover(-2000.0));
        ctl.on_drag_over(hover(240.0));
        // Not yet evaluated
        assert_eq!(ctl.drag_session().unwrap().candidate_start, t("10:00"));

        assert!(ctl.on_animation_frame(&hours));
        assert_eq!(ctl.drag_session().unwrap().candidate_start, t("11:00"));
        assert!(!ctl.on_animation_frame(&hours));
    }

    #[test]
    fn test_rejected_drop_produces_no_mutation() {
        let mut ctl = controller();
        ctl.on_drag_start(&appointment(2, "16:00", "17:00"), 0.0, &AllowAll)
            .unwrap();
        ctl.on_drag_over(hover(280.0));

        let outcome = ctl.on_drop(&WorkingHours::default());

        assert_eq!(
            outcome,
            GestureOutcome::Rejected(Rejection {
                appointment_id: 2,
                reason: RejectionReason::OutsideWorkingHours,
            })
        );
    }

    #[test]
    fn test_paid_appointment_cannot_be_resized() {
        let mut ctl = controller();
        let mut paid = appointment(3, "10:00", "11:00");
        paid.status = AppointmentStatus::Paid;

        let err = ctl.on_resize_start(&paid, 0.0, &AllowAll).unwrap_err();

        assert_eq!(
            err,
            GestureError::Immutable {
                id: 3,
                status: AppointmentStatus::Paid
            }
        );
        assert!(ctl.is_idle());
        assert_eq!(ctl.on_resize_end(), GestureOutcome::Idle);
    }

    #[test]
    fn test_deleted_appointment_cannot_be_dragged() {
        let mut ctl = controller();
        let mut deleted = appointment(3, "10:00", "11:00");
        deleted.status = AppointmentStatus::Deleted;
        assert!(matches!(
            ctl.on_drag_start(&deleted, 0.0, &AllowAll),
            Err(GestureError::Immutable { .. })
        ));
    }

    #[test]
    fn test_permission_and_malformed_checks() {
        let mut ctl = controller();
        let deny = |_: ResourceId| false;
        assert_eq!(
            ctl.on_drag_start(&appointment(1, "10:00", "11:00"), 0.0, &deny),
            Err(GestureError::PermissionDenied(1))
        );
        assert_eq!(
            ctl.on_drag_start(&appointment(1, "11:00", "10:00"), 0.0, &AllowAll),
            Err(GestureError::Malformed(1))
        );
    }

    #[test]
    fn test_second_gesture_is_busy() {
        let mut ctl = controller();
        ctl.on_drag_start(&appointment(1, "10:00", "11:00"), 0.0, &AllowAll)
            .unwrap();
        assert_eq!(
            ctl.on_resize_start(&appointment(2, "12:00", "13:00"), 0.0, &AllowAll),
            Err(GestureError::Busy)
        );
        // Resize release does not end a drag
        assert_eq!(ctl.on_resize_end(), GestureOutcome::Idle);
        assert_eq!(ctl.active_gesture(), Some((GestureKind::Drag, 1)));
    }

    #[test]
    fn test_cancel_clears_pending_frame() {
        let mut ctl = controller();
        ctl.on_drag_start(&appointment(1, "10:00", "11:00"), 0.0, &AllowAll)
            .unwrap();
        ctl.on_drag_over(hover(240.0));

        assert_eq!(ctl.cancel(), Some(1));
        assert!(ctl.is_idle());
        assert!(!ctl.on_animation_frame(&WorkingHours::default()));
        assert_eq!(ctl.on_drop(&WorkingHours::default()), GestureOutcome::Idle);
        assert_eq!(ctl.cancel(), None);
    }

    #[test]
    fn test_drag_over_while_idle_is_ignored() {
        let mut ctl = controller();
        ctl.on_drag_over(hover(240.0));
        assert!(!ctl.on_animation_frame(&WorkingHours::default()));
    }

    #[test]
    fn test_resize_lifecycle() {
        let mut ctl = controller();
        let hours = WorkingHours::default();
        ctl.on_resize_start(&appointment(5, "14:00", "14:30"), 300.0, &AllowAll)
            .unwrap();

        assert!(ctl.on_resize_move(360.0, &hours));
        assert_eq!(ctl.resize_session().unwrap().candidate_duration_minutes, 45);

        assert_eq!(
            ctl.on_resize_end(),
            GestureOutcome::Committed(MutationRequest::Resize {
                appointment_id: 5,
                new_end: t("14:45"),
            })
        );
        assert!(!ctl.on_resize_move(400.0, &hours));
    }

    #[test]
    fn test_preview_follows_candidate() {
        let mut ctl = controller();
        assert!(ctl.preview(LayoutPolicy::default()).is_none());

        ctl.on_drag_start(&appointment(1, "09:00", "09:30"), 0.0, &AllowAll)
            .unwrap();
        ctl.on_drag_over(hover(120.0));
        ctl.on_animation_frame(&WorkingHours::default());

        let preview = ctl.preview(LayoutPolicy::default()).unwrap();
        assert_eq!(preview.start, t("09:30"));
        assert_eq!(preview.end, Some(t("10:00")));
        assert_eq!(preview.offset_px, 9.5 * 240.0);
        assert_eq!(preview.geometry.top, 50.0);
        assert_eq!(preview.geometry.width, 80.0);
        assert!(!preview.rejected);
    }

    #[test]
    fn test_rejection_serializes_kebab_case() {
        let json = serde_json::to_value(Rejection::outside_working_hours(9)).unwrap();
        assert_eq!(json["reason"], "outside-working-hours");
        assert_eq!(json["appointment_id"], 9);
    }
}
