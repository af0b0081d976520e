//! Card geometry for the scheduling grid.
//!
//! Geometry is expressed in percentages: `top` and `height` relative to the
//! hour row the appointment starts in, `left` and `width` relative to the
//! resource column.

use std::collections::HashMap;

use serde::Serialize;

use super::overlap::{resolve_day, AssignmentMap, SubColumnAssignment};
use crate::models::appointment::{Appointment, AppointmentId};
use crate::models::settings::{AlignmentPolicy, GridSettings, SizingPolicy};
use crate::models::time_of_day::{TimeOfDay, MINUTES_PER_HOUR};

/// Shortest card height, so 5-minute appointments stay clickable.
pub const MIN_VISIBLE_PERCENT: f32 = 8.0;
/// Horizontal gap between side-by-side cards.
pub const GAP_PERCENT: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geometry {
    pub top: f32,
    pub height: f32,
    pub left: f32,
    pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutPolicy {
    pub sizing: SizingPolicy,
    pub alignment: AlignmentPolicy,
}

impl LayoutPolicy {
    pub fn from_settings(settings: &GridSettings) -> Self {
        Self {
            sizing: settings.sizing,
            alignment: settings.alignment,
        }
    }
}

/// Geometry for a card starting at `start` and lasting `duration_minutes`.
pub fn compute_geometry(
    start: TimeOfDay,
    duration_minutes: i64,
    assignment: SubColumnAssignment,
    policy: LayoutPolicy,
) -> Geometry {
    let hour = MINUTES_PER_HOUR as f32;
    let top = start.minute() as f32 / hour * 100.0;
    let height = (duration_minutes as f32 / hour * 100.0).max(MIN_VISIBLE_PERCENT);
    let target = policy.sizing.target_width_percent();

    let (left, width) = if assignment.is_overlapping && assignment.total_sub_columns > 1 {
        let lanes = assignment.total_sub_columns as f32;
        let width = (target - (lanes - 1.0) * GAP_PERCENT) / lanes;
        (assignment.sub_column as f32 * (width + GAP_PERCENT), width)
    } else {
        let left = match policy.alignment {
            AlignmentPolicy::Left => 0.0,
            AlignmentPolicy::Center => (100.0 - target) / 2.0,
            AlignmentPolicy::Right => 100.0 - target,
        };
        (left, target)
    };

    Geometry {
        top,
        height,
        left,
        width,
    }
}

/// Geometry of an appointment, `None` when its time range is malformed.
pub fn geometry_for(
    appointment: &Appointment,
    assignment: SubColumnAssignment,
    policy: LayoutPolicy,
) -> Option<Geometry> {
    appointment.is_well_formed().then(|| {
        compute_geometry(
            appointment.start,
            appointment.duration_minutes(),
            assignment,
            policy,
        )
    })
}

/// Output of one render pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayLayout {
    pub assignments: AssignmentMap,
    pub geometry: HashMap<AppointmentId, Geometry>,
}

impl DayLayout {
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Resolve overlaps and compute geometry for every visible appointment.
pub fn layout_day(appointments: &[Appointment], settings: &GridSettings) -> DayLayout {
    let assignments = resolve_day(appointments, settings);
    let policy = LayoutPolicy::from_settings(settings);

    let geometry = appointments
        .iter()
        .filter_map(|appointment| {
            let assignment = assignments.get(&appointment.id)?;
            geometry_for(appointment, *assignment, policy).map(|g| (appointment.id, g))
        })
        .collect();

    DayLayout {
        assignments,
        geometry,
    }
}
