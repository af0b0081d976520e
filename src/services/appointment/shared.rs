use rusqlite::{self, Row};

use crate::models::appointment::{Appointment, AppointmentRecord, AppointmentStatus};

pub(crate) const APPOINTMENT_COLUMNS: &str =
    "id, resource_id, date, start_time, end_time, status, client_name, service";

/// A row as stored, before times and status are parsed.
pub(crate) struct StoredRow {
    record: AppointmentRecord,
    status: String,
}

pub(crate) fn map_appointment_row(row: &Row<'_>) -> Result<StoredRow, rusqlite::Error> {
    Ok(StoredRow {
        record: AppointmentRecord {
            id: row.get(0)?,
            resource_id: row.get(1)?,
            date: row.get(2)?,
            start: row.get(3)?,
            end: row.get(4)?,
            status: AppointmentStatus::default(),
            client_name: row.get(6)?,
            service: row.get(7)?,
        },
        status: row.get(5)?,
    })
}

/// Parse a stored row. Rows that cannot be parsed are skipped with a warning
/// so one bad record does not hide a whole day.
pub(crate) fn into_appointment(row: StoredRow) -> Option<Appointment> {
    let StoredRow { mut record, status } = row;
    let id = record.id;

    record.status = match status.parse() {
        Ok(status) => status,
        Err(e) => {
            log::warn!("Skipping appointment {}: {}", id, e);
            return None;
        }
    };

    match Appointment::try_from(record) {
        Ok(appointment) => {
            if !appointment.is_well_formed() {
                log::warn!(
                    "Appointment {} ends ({}) before it starts ({}); it will not be laid out",
                    id,
                    appointment.end,
                    appointment.start
                );
            }
            Some(appointment)
        }
        Err(e) => {
            log::warn!("Skipping {}", e);
            None
        }
    }
}
