//! Appointment store backed by SQLite.
//!
//! Also the persistence side of the grid: committed moves and resizes are
//! written through its [`MutationApplier`] implementation.

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::models::appointment::{AppointmentId, ResourceId};
use crate::models::time_of_day::TimeOfDay;
use crate::services::mutation::{ApplyError, MutationApplier};

pub mod crud;
pub mod queries;
mod shared;

/// Service for managing appointments stored in SQLite.
pub struct AppointmentService<'a> {
    pub(crate) conn: &'a Connection,
}

impl<'a> AppointmentService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl MutationApplier for AppointmentService<'_> {
    fn apply_move(
        &self,
        appointment_id: AppointmentId,
        new_start: TimeOfDay,
        new_end: TimeOfDay,
        new_resource_id: Option<ResourceId>,
        new_date: Option<NaiveDate>,
    ) -> Result<(), ApplyError> {
        self.update_times(appointment_id, new_start, new_end, new_resource_id, new_date)
    }

    fn apply_resize(
        &self,
        appointment_id: AppointmentId,
        new_end: TimeOfDay,
    ) -> Result<(), ApplyError> {
        self.update_end(appointment_id, new_end)
    }
}
