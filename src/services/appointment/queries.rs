use super::shared::{into_appointment, map_appointment_row, APPOINTMENT_COLUMNS};
use super::AppointmentService;
use crate::models::appointment::{Appointment, ResourceId};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{self, params};

impl<'a> AppointmentService<'a> {
    /// Every appointment on `date`, ordered by column then start.
    pub fn list_for_day(&self, date: NaiveDate) -> Result<Vec<Appointment>> {
        self.list_for_range(date, date)
    }

    /// Appointments between `from` and `to`, both inclusive.
    pub fn list_for_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Appointment>> {
        let sql = format!(
            "SELECT {} FROM appointments
             WHERE date >= ? AND date <= ?
             ORDER BY date ASC, resource_id ASC, start_time ASC",
            APPOINTMENT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let rows = stmt
            .query_map(params![from, to], map_appointment_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list appointments")?;

        Ok(rows.into_iter().filter_map(into_appointment).collect())
    }

    /// One team member's appointments on `date`.
    pub fn list_for_resource(
        &self,
        resource_id: ResourceId,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>> {
        Ok(self
            .list_for_day(date)?
            .into_iter()
            .filter(|appointment| appointment.resource_id == resource_id)
            .collect())
    }
}
