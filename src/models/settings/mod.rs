// Settings module
// Grid configuration: pixel scale, working hours and card sizing policy

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::appointment::{AppointmentStatus, ResourceId};
use crate::models::working_hours::{DayHours, WeeklyHours, WorkingHours, WorkingHoursSource};

pub const MIN_HOUR_HEIGHT_PX: f32 = 175.0;
pub const MAX_HOUR_HEIGHT_PX: f32 = 800.0;
pub const DEFAULT_HOUR_HEIGHT_PX: f32 = 240.0;
/// Drop positions are always aligned to this many minutes.
pub const SNAP_INTERVAL_MINUTES: u16 = 5;
/// Resizing never shrinks an appointment below this.
pub const MIN_DURATION_MINUTES: i64 = 5;

/// Width an appointment card takes inside its resource column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingPolicy {
    Compact,
    #[default]
    Normal,
    Expanded,
}

impl SizingPolicy {
    pub fn target_width_percent(self) -> f32 {
        match self {
            SizingPolicy::Compact => 60.0,
            SizingPolicy::Normal => 80.0,
            SizingPolicy::Expanded => 100.0,
        }
    }
}

/// Horizontal placement of a card narrower than its column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentPolicy {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical extent of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisMode {
    #[default]
    FullDay,
    WorkingHours,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("hour height {0}px is outside 175-800px")]
    HourHeight(f32),
    #[error("invalid working hours: {0}")]
    WorkingHours(String),
    #[error("failed to read settings file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub hour_height_px: f32,
    pub working_hours: WorkingHours,
    /// Weekday exceptions to `working_hours`; a day without hours is closed.
    pub day_overrides: Vec<DayHours>,
    pub axis: AxisMode,
    pub sizing: SizingPolicy,
    pub alignment: AlignmentPolicy,
    /// Statuses left out of the layout pass entirely.
    pub hidden_statuses: Vec<AppointmentStatus>,
    /// Refuse a new gesture on an appointment whose last change is unconfirmed.
    pub reject_while_pending: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            hour_height_px: DEFAULT_HOUR_HEIGHT_PX,
            working_hours: WorkingHours::default(),
            day_overrides: Vec::new(),
            axis: AxisMode::default(),
            sizing: SizingPolicy::default(),
            alignment: AlignmentPolicy::default(),
            hidden_statuses: vec![AppointmentStatus::Deleted],
            reject_while_pending: false,
        }
    }
}

impl GridSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(MIN_HOUR_HEIGHT_PX..=MAX_HOUR_HEIGHT_PX).contains(&self.hour_height_px) {
            return Err(SettingsError::HourHeight(self.hour_height_px));
        }

        self.working_hours
            .validate()
            .map_err(SettingsError::WorkingHours)?;
        for day in &self.day_overrides {
            if let Some(hours) = day.hours {
                hours.validate().map_err(|e| {
                    SettingsError::WorkingHours(format!("{}: {}", day.weekday, e))
                })?;
            }
        }

        Ok(())
    }

    pub fn weekly_hours(&self) -> WeeklyHours {
        WeeklyHours {
            default: self.working_hours,
            days: self.day_overrides.clone(),
        }
    }

    pub fn is_hidden(&self, status: AppointmentStatus) -> bool {
        self.hidden_statuses.contains(&status)
    }
}

impl WorkingHoursSource for GridSettings {
    fn hours_for(&self, resource_id: ResourceId, date: NaiveDate) -> Option<WorkingHours> {
        self.weekly_hours().hours_for(resource_id, date)
    }
}
