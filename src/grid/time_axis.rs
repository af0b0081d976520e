//! Time axis of the scheduling grid.
//!
//! Maps wall-clock times to vertical pixel offsets and back. The axis covers
//! either the full day or a bounded window (usually the working hours); every
//! input outside it is clamped to the nearest edge instead of failing.

use crate::models::settings::{AxisMode, GridSettings, SNAP_INTERVAL_MINUTES};
use crate::models::time_of_day::{TimeOfDay, MINUTES_PER_HOUR};

/// Round a time to the 5-minute grid.
///
/// The rounding is deliberately asymmetric: a remainder of 0-2 minutes rounds
/// down, 3-4 rounds up. Drop positions users have learned depend on it.
pub fn snap_to_5_minutes(time: TimeOfDay) -> TimeOfDay {
    let minutes = time.minutes();
    let remainder = minutes % SNAP_INTERVAL_MINUTES;
    let snapped = if remainder < 3 {
        minutes - remainder
    } else {
        minutes + (SNAP_INTERVAL_MINUTES - remainder)
    };
    TimeOfDay::saturating_from_minutes(snapped as i64)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    start: TimeOfDay,
    end: TimeOfDay,
    hour_height_px: f32,
}

impl TimeAxis {
    /// Axis covering `00:00` to `24:00`.
    pub fn full_day(hour_height_px: f32) -> Self {
        Self::bounded(TimeOfDay::MIDNIGHT, TimeOfDay::END_OF_DAY, hour_height_px)
    }

    /// Axis covering `[start, end]`. An inverted range collapses to `start`.
    pub fn bounded(start: TimeOfDay, end: TimeOfDay, hour_height_px: f32) -> Self {
        Self {
            start,
            end: end.max(start),
            hour_height_px,
        }
    }

    pub fn from_settings(settings: &GridSettings) -> Self {
        match settings.axis {
            AxisMode::FullDay => Self::full_day(settings.hour_height_px),
            AxisMode::WorkingHours => Self::bounded(
                settings.working_hours.start,
                settings.working_hours.end,
                settings.hour_height_px,
            ),
        }
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn hour_height_px(&self) -> f32 {
        self.hour_height_px
    }

    pub fn height_px(&self) -> f32 {
        self.minutes_to_px(self.start.minutes_until(self.end) as f64)
    }

    /// Pixel offset of `time` from the top of the axis.
    pub fn time_to_offset(&self, time: TimeOfDay) -> f32 {
        let clamped = time.clamp(self.start, self.end);
        self.minutes_to_px(self.start.minutes_until(clamped) as f64)
    }

    /// Time at `offset_px` from the top of the axis, snapped to 5 minutes.
    pub fn offset_to_time(&self, offset_px: f32) -> TimeOfDay {
        if offset_px.is_nan() || self.hour_height_px <= 0.0 {
            return self.start;
        }

        let minutes = (offset_px as f64 / self.hour_height_px as f64) * MINUTES_PER_HOUR as f64;
        let raw = self.start.minutes() as f64 + minutes.round();
        let clamped = raw.clamp(self.start.minutes() as f64, self.end.minutes() as f64);
        self.snap_within(TimeOfDay::saturating_from_minutes(clamped as i64))
    }

    /// Convert a vertical pixel distance into minutes (unsnapped).
    pub fn px_to_minutes(&self, delta_px: f32) -> f64 {
        if self.hour_height_px <= 0.0 {
            return 0.0;
        }
        (delta_px as f64 / self.hour_height_px as f64) * MINUTES_PER_HOUR as f64
    }

    /// Start of every hour row the axis shows, first row possibly partial.
    pub fn hour_rows(&self) -> impl Iterator<Item = TimeOfDay> + '_ {
        let first = self.start.hour();
        let last = self.end.minutes().div_ceil(MINUTES_PER_HOUR);
        (first..last).map(TimeOfDay::at_hour)
    }

    fn minutes_to_px(&self, minutes: f64) -> f32 {
        (minutes / MINUTES_PER_HOUR as f64 * self.hour_height_px as f64) as f32
    }

    /// Snap, then step back inside the axis if snapping crossed an
    /// unaligned boundary.
    fn snap_within(&self, time: TimeOfDay) -> TimeOfDay {
        let snapped = snap_to_5_minutes(time);
        let step = SNAP_INTERVAL_MINUTES as i64;
        if snapped > self.end {
            TimeOfDay::saturating_from_minutes(snapped.minutes() as i64 - step)
        } else if snapped < self.start {
            TimeOfDay::saturating_from_minutes(snapped.minutes() as i64 + step)
        } else {
            snapped
        }
    }
}
