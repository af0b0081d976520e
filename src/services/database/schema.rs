use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_appointments_table(conn)?;
    run_appointment_migrations(conn)?;
    create_indexes(conn)?;
    Ok(())
}

// Dates are stored as YYYY-MM-DD and times as zero-padded HH:mm, so text
// comparison orders them correctly.
fn create_appointments_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS appointments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            resource_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'booked',
            client_name TEXT,
            service TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create appointments table")?;

    Ok(())
}

fn run_appointment_migrations(conn: &Connection) -> Result<()> {
    migrations::ensure_column(
        conn,
        "appointments",
        "service",
        "ALTER TABLE appointments ADD COLUMN service TEXT",
    )?;

    Ok(())
}

fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_appointments_day
         ON appointments(date, resource_id, start_time)",
        [],
    )
    .context("Failed to create appointments index")?;

    Ok(())
}
