// Working hours module
// Opening windows that bound where appointments may be placed

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::appointment::ResourceId;
use crate::models::time_of_day::TimeOfDay;

/// Inclusive opening window for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl WorkingHours {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, String> {
        let hours = Self { start, end };
        hours.validate()?;
        Ok(hours)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.start >= self.end {
            return Err(format!(
                "Working hours must start before they end ({} - {})",
                self.start, self.end
            ));
        }
        Ok(())
    }

    /// Whether `[start, start + duration)` fits inside the window.
    ///
    /// Takes raw minutes so candidates running past midnight are simply
    /// reported as outside instead of overflowing.
    pub fn contains_span(&self, start_minutes: i64, end_minutes: i64) -> bool {
        start_minutes >= self.start.minutes() as i64 && end_minutes <= self.end.minutes() as i64
    }

    pub fn allows_end(&self, end_minutes: i64) -> bool {
        end_minutes <= self.end.minutes() as i64
    }
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start: TimeOfDay::at_hour(9),
            end: TimeOfDay::at_hour(18),
        }
    }
}

/// Per-weekday override. A missing `hours` means the salon is closed that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub weekday: Weekday,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<WorkingHours>,
}

/// Supplies the working-hours window for a team member on a date.
pub trait WorkingHoursSource {
    /// `None` means nothing may be placed on that day.
    fn hours_for(&self, resource_id: ResourceId, date: NaiveDate) -> Option<WorkingHours>;
}

impl WorkingHoursSource for WorkingHours {
    fn hours_for(&self, _resource_id: ResourceId, _date: NaiveDate) -> Option<WorkingHours> {
        Some(*self)
    }
}

/// Default window plus weekday overrides.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeeklyHours {
    pub default: WorkingHours,
    #[serde(default)]
    pub days: Vec<DayHours>,
}

impl WeeklyHours {
    pub fn hours_on(&self, weekday: Weekday) -> Option<WorkingHours> {
        match self.days.iter().find(|day| day.weekday == weekday) {
            Some(day) => day.hours,
            None => Some(self.default),
        }
    }
}

impl WorkingHoursSource for WeeklyHours {
    fn hours_for(&self, _resource_id: ResourceId, date: NaiveDate) -> Option<WorkingHours> {
        self.hours_on(date.weekday())
    }
}
