use super::shared::{into_appointment, map_appointment_row, APPOINTMENT_COLUMNS};
use super::AppointmentService;
use crate::models::appointment::{Appointment, AppointmentId, AppointmentStatus, ResourceId};
use crate::models::time_of_day::TimeOfDay;
use crate::services::mutation::ApplyError;
use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use rusqlite::{params, OptionalExtension};

impl<'a> AppointmentService<'a> {
    /// Insert an appointment. A positive `id` is kept, otherwise SQLite assigns one.
    pub fn create(&self, mut appointment: Appointment) -> Result<Appointment> {
        appointment.validate().map_err(|e| anyhow!(e))?;

        let now = Local::now().to_rfc3339();
        let explicit_id = (appointment.id > 0).then_some(appointment.id);

        self.conn
            .execute(
                "INSERT INTO appointments (
                    id, resource_id, date, start_time, end_time, status,
                    client_name, service, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    explicit_id,
                    appointment.resource_id,
                    appointment.date,
                    appointment.start.to_string(),
                    appointment.end.to_string(),
                    appointment.status.as_str(),
                    appointment.client_name,
                    appointment.service,
                    &now,
                    &now,
                ],
            )
            .context("Failed to insert appointment")?;

        appointment.id = self.conn.last_insert_rowid();
        log::debug!("Created appointment {}", appointment.id);
        Ok(appointment)
    }

    /// Retrieve an appointment by ID. Unparseable rows read as missing.
    pub fn get(&self, id: AppointmentId) -> Result<Option<Appointment>> {
        let sql = format!("SELECT {} FROM appointments WHERE id = ?", APPOINTMENT_COLUMNS);
        let row = self
            .conn
            .query_row(&sql, [id], map_appointment_row)
            .optional()
            .context("Failed to load appointment")?;

        Ok(row.and_then(into_appointment))
    }

    pub fn set_status(&self, id: AppointmentId, status: AppointmentStatus) -> Result<()> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE appointments SET status = ?, updated_at = ? WHERE id = ?",
                params![status.as_str(), Local::now().to_rfc3339(), id],
            )
            .context("Failed to update appointment status")?;

        if rows_affected == 0 {
            return Err(anyhow!("Appointment with id {} not found", id));
        }

        Ok(())
    }

    /// Soft delete: the row stays, marked `deleted`.
    pub fn delete(&self, id: AppointmentId) -> Result<()> {
        self.set_status(id, AppointmentStatus::Deleted)
    }

    /// Move an appointment. Column and date change only when given.
    pub fn update_times(
        &self,
        id: AppointmentId,
        new_start: TimeOfDay,
        new_end: TimeOfDay,
        new_resource_id: Option<ResourceId>,
        new_date: Option<NaiveDate>,
    ) -> Result<(), ApplyError> {
        self.editable(id)?;
        if new_start >= new_end {
            return Err(ApplyError::Refused(format!(
                "{} - {} is not a valid time range",
                new_start, new_end
            )));
        }

        self.conn
            .execute(
                "UPDATE appointments SET
                    start_time = ?, end_time = ?,
                    resource_id = COALESCE(?, resource_id),
                    date = COALESCE(?, date),
                    updated_at = ?
                 WHERE id = ?",
                params![
                    new_start.to_string(),
                    new_end.to_string(),
                    new_resource_id,
                    new_date,
                    Local::now().to_rfc3339(),
                    id,
                ],
            )
            .context("Failed to move appointment")?;

        log::info!("Moved appointment {} to {}-{}", id, new_start, new_end);
        Ok(())
    }

    /// Change only the end of an appointment.
    pub fn update_end(&self, id: AppointmentId, new_end: TimeOfDay) -> Result<(), ApplyError> {
        let start = self.editable(id)?;
        if new_end <= start {
            return Err(ApplyError::Refused(format!(
                "end {} is not after start {}",
                new_end, start
            )));
        }

        self.conn
            .execute(
                "UPDATE appointments SET end_time = ?, updated_at = ? WHERE id = ?",
                params![new_end.to_string(), Local::now().to_rfc3339(), id],
            )
            .context("Failed to resize appointment")?;

        log::info!("Resized appointment {} to end at {}", id, new_end);
        Ok(())
    }

    /// Current start of an appointment that may still be changed.
    fn editable(&self, id: AppointmentId) -> Result<TimeOfDay, ApplyError> {
        let appointment = self.get(id)?.ok_or(ApplyError::NotFound(id))?;
        if appointment.status.is_immutable() {
            return Err(ApplyError::Immutable {
                id,
                status: appointment.status,
            });
        }
        Ok(appointment.start)
    }
}
