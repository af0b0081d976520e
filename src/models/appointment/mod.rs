// Appointment module
// Salon appointment model consumed by the scheduling grid

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::time_of_day::{TimeOfDay, TimeParseError};

pub type AppointmentId = i64;
/// Team member owning an independent column of the grid.
pub type ResourceId = i64;

/// Lifecycle state of an appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Booked,
    Confirmed,
    Arrived,
    Started,
    Completed,
    NoShow,
    Cancelled,
    Paid,
    Deleted,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 9] = [
        AppointmentStatus::Booked,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Arrived,
        AppointmentStatus::Started,
        AppointmentStatus::Completed,
        AppointmentStatus::NoShow,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Paid,
        AppointmentStatus::Deleted,
    ];

    /// Paid and deleted appointments can no longer be moved or resized.
    pub fn is_immutable(self) -> bool {
        matches!(self, AppointmentStatus::Paid | AppointmentStatus::Deleted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Booked => "booked",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Arrived => "arrived",
            AppointmentStatus::Started => "started",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::NoShow => "no_show",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Paid => "paid",
            AppointmentStatus::Deleted => "deleted",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown appointment status: {}", s))
    }
}

/// A booked slot for one team member on one day.
///
/// `start < end` is expected but not enforced here: records coming from the
/// persistence layer may violate it, and the layout pass drops those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub resource_id: ResourceId,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl Appointment {
    pub fn new(
        id: AppointmentId,
        resource_id: ResourceId,
        date: NaiveDate,
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> Self {
        Self {
            id,
            resource_id,
            date,
            start,
            end,
            status: AppointmentStatus::default(),
            client_name: None,
            service: None,
        }
    }

    pub fn builder() -> AppointmentBuilder {
        AppointmentBuilder::new()
    }

    /// Duration in minutes; zero or negative for malformed records.
    pub fn duration_minutes(&self) -> i64 {
        self.start.minutes_until(self.end)
    }

    pub fn is_well_formed(&self) -> bool {
        self.start < self.end
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.is_well_formed() {
            return Err(format!(
                "Appointment {} ends ({}) before it starts ({})",
                self.id, self.end, self.start
            ));
        }
        Ok(())
    }

    /// Half-open interval intersection; back-to-back appointments do not overlap.
    pub fn overlaps(&self, other: &Appointment) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Builder for appointments, mostly used by seeding and tests
#[derive(Debug, Default)]
pub struct AppointmentBuilder {
    id: Option<AppointmentId>,
    resource_id: Option<ResourceId>,
    date: Option<NaiveDate>,
    start: Option<TimeOfDay>,
    end: Option<TimeOfDay>,
    status: AppointmentStatus,
    client_name: Option<String>,
    service: Option<String>,
}

impl AppointmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: AppointmentId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn resource(mut self, resource_id: ResourceId) -> Self {
        self.resource_id = Some(resource_id);
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn start(mut self, start: TimeOfDay) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: TimeOfDay) -> Self {
        self.end = Some(end);
        self
    }

    pub fn status(mut self, status: AppointmentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn build(self) -> Result<Appointment, String> {
        let appointment = Appointment {
            id: self.id.ok_or("Appointment id is required")?,
            resource_id: self.resource_id.ok_or("Appointment resource is required")?,
            date: self.date.ok_or("Appointment date is required")?,
            start: self.start.ok_or("Appointment start time is required")?,
            end: self.end.ok_or("Appointment end time is required")?,
            status: self.status,
            client_name: self.client_name,
            service: self.service,
        };

        appointment.validate()?;
        Ok(appointment)
    }
}

/// Appointment as delivered by the persistence layer, times still as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: AppointmentId,
    pub resource_id: ResourceId,
    pub date: NaiveDate,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("appointment {id}: bad start time: {source}")]
    Start {
        id: AppointmentId,
        source: TimeParseError,
    },
    #[error("appointment {id}: bad end time: {source}")]
    End {
        id: AppointmentId,
        source: TimeParseError,
    },
}

impl TryFrom<AppointmentRecord> for Appointment {
    type Error = RecordError;

    fn try_from(record: AppointmentRecord) -> Result<Self, Self::Error> {
        let id = record.id;
        let start = record
            .start
            .parse()
            .map_err(|source| RecordError::Start { id, source })?;
        let end = record
            .end
            .parse()
            .map_err(|source| RecordError::End { id, source })?;

        Ok(Self {
            id,
            resource_id: record.resource_id,
            date: record.date,
            start,
            end,
            status: record.status,
            client_name: record.client_name,
            service: record.service,
        })
    }
}

impl From<&Appointment> for AppointmentRecord {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id,
            resource_id: appointment.resource_id,
            date: appointment.date,
            start: appointment.start.to_string(),
            end: appointment.end.to_string(),
            status: appointment.status,
            client_name: appointment.client_name.clone(),
            service: appointment.service.clone(),
        }
    }
}
