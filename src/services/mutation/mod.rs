//! Boundary between the grid engine and the persistence layer.
//!
//! Committed gestures become a [`MutationRequest`]; an implementation of
//! [`MutationApplier`] writes it to storage and reports success or failure.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::appointment::{Appointment, AppointmentId, AppointmentStatus, ResourceId};
use crate::models::time_of_day::TimeOfDay;

/// A committed change to an appointment's placement or length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MutationRequest {
    Move {
        appointment_id: AppointmentId,
        new_start: TimeOfDay,
        new_end: TimeOfDay,
        /// Set only when the appointment changes team member.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_resource_id: Option<ResourceId>,
        /// Set only when the appointment changes day.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_date: Option<NaiveDate>,
    },
    Resize {
        appointment_id: AppointmentId,
        new_end: TimeOfDay,
    },
}

impl MutationRequest {
    pub fn appointment_id(&self) -> AppointmentId {
        match self {
            MutationRequest::Move { appointment_id, .. }
            | MutationRequest::Resize { appointment_id, .. } => *appointment_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MutationRequest::Move { .. } => "move",
            MutationRequest::Resize { .. } => "resize",
        }
    }

    /// Write the requested placement into `appointment`.
    pub fn apply_to(&self, appointment: &mut Appointment) {
        match self {
            MutationRequest::Move {
                new_start,
                new_end,
                new_resource_id,
                new_date,
                ..
            } => {
                appointment.start = *new_start;
                appointment.end = *new_end;
                if let Some(resource_id) = new_resource_id {
                    appointment.resource_id = *resource_id;
                }
                if let Some(date) = new_date {
                    appointment.date = *date;
                }
            }
            MutationRequest::Resize { new_end, .. } => {
                appointment.end = *new_end;
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            MutationRequest::Move {
                appointment_id,
                new_start,
                new_end,
                ..
            } => format!(
                "Move appointment {} to {}-{}",
                appointment_id, new_start, new_end
            ),
            MutationRequest::Resize {
                appointment_id,
                new_end,
            } => format!("Resize appointment {} to end at {}", appointment_id, new_end),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("appointment {0} not found")]
    NotFound(AppointmentId),
    #[error("appointment {id} is {status} and cannot be changed")]
    Immutable {
        id: AppointmentId,
        status: AppointmentStatus,
    },
    #[error("change refused: {0}")]
    Refused(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Persistence collaborator for committed gestures.
#[cfg_attr(test, mockall::automock)]
pub trait MutationApplier {
    fn apply_move(
        &self,
        appointment_id: AppointmentId,
        new_start: TimeOfDay,
        new_end: TimeOfDay,
        new_resource_id: Option<ResourceId>,
        new_date: Option<NaiveDate>,
    ) -> Result<(), ApplyError>;

    fn apply_resize(&self, appointment_id: AppointmentId, new_end: TimeOfDay)
        -> Result<(), ApplyError>;
}

/// Route a request to the matching applier call.
pub fn apply_request(
    applier: &dyn MutationApplier,
    request: &MutationRequest,
) -> Result<(), ApplyError> {
    match request {
        MutationRequest::Move {
            appointment_id,
            new_start,
            new_end,
            new_resource_id,
            new_date,
        } => applier.apply_move(
            *appointment_id,
            *new_start,
            *new_end,
            *new_resource_id,
            *new_date,
        ),
        MutationRequest::Resize {
            appointment_id,
            new_end,
        } => applier.apply_resize(*appointment_id, *new_end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_apply_move_to_appointment() {
        let mut appointment = Appointment::new(1, 1, date(), t("09:00"), t("09:30"));
        let request = MutationRequest::Move {
            appointment_id: 1,
            new_start: t("10:00"),
            new_end: t("10:30"),
            new_resource_id: Some(4),
            new_date: None,
        };

        request.apply_to(&mut appointment);

        assert_eq!(appointment.start, t("10:00"));
        assert_eq!(appointment.end, t("10:30"));
        assert_eq!(appointment.resource_id, 4);
        assert_eq!(appointment.date, date());
    }

    #[test]
    fn test_apply_resize_keeps_start() {
        let mut appointment = Appointment::new(1, 1, date(), t("09:00"), t("09:30"));
        MutationRequest::Resize {
            appointment_id: 1,
            new_end: t("09:50"),
        }
        .apply_to(&mut appointment);

        assert_eq!(appointment.start, t("09:00"));
        assert_eq!(appointment.duration_minutes(), 50);
    }

    #[test]
    fn test_request_json_shape() {
        let request = MutationRequest::Resize {
            appointment_id: 9,
            new_end: t("12:05"),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["kind"], "resize");
        assert_eq!(json["new_end"], "12:05");
        assert_eq!(request.kind(), "resize");
    }

    #[test]
    fn test_apply_request_routes_move() {
        let mut applier = MockMutationApplier::new();
        applier
            .expect_apply_move()
            .with(eq(5), eq(t("11:00")), eq(t("11:45")), eq(None), eq(None))
            .times(1)
            .returning(|_, _, _, _, _| Ok(()));
        applier.expect_apply_resize().never();

        let request = MutationRequest::Move {
            appointment_id: 5,
            new_start: t("11:00"),
            new_end: t("11:45"),
            new_resource_id: None,
            new_date: None,
        };
        assert!(apply_request(&applier, &request).is_ok());
    }

    #[test]
    fn test_apply_request_passes_errors_through() {
        let mut applier = MockMutationApplier::new();
        applier
            .expect_apply_resize()
            .returning(|id, _| Err(ApplyError::NotFound(id)));

        let request = MutationRequest::Resize {
            appointment_id: 3,
            new_end: t("10:00"),
        };
        assert!(matches!(
            apply_request(&applier, &request),
            Err(ApplyError::NotFound(3))
        ));
    }
}
