// Time-of-day module
// Minute-resolution wall-clock values for the scheduling grid

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const MINUTES_PER_HOUR: u16 = 60;
pub const MINUTES_PER_DAY: u16 = 24 * MINUTES_PER_HOUR;

/// A wall-clock time in whole minutes, from `00:00` up to and including `24:00`.
///
/// `24:00` exists so a working day (or a grid axis) can end at midnight,
/// which `NaiveTime` cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeOfDay(u16);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("expected a time formatted as HH:mm, got {0:?}")]
    Format(String),
    #[error("time {0:?} is outside 00:00-24:00")]
    OutOfRange(String),
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(MINUTES_PER_DAY);

    /// Start of the given hour, saturating at `24:00`.
    pub const fn at_hour(hour: u16) -> Self {
        if hour >= 24 {
            Self::END_OF_DAY
        } else {
            Self(hour * MINUTES_PER_HOUR)
        }
    }

    /// Build a time from hour and minute, `None` if it is not a valid time of day.
    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if minute >= MINUTES_PER_HOUR {
            return None;
        }
        Self::from_minutes(hour.checked_mul(MINUTES_PER_HOUR)?.checked_add(minute)?)
    }

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes <= MINUTES_PER_DAY).then_some(Self(minutes))
    }

    /// Clamp an arbitrary minute count into `00:00..=24:00`.
    pub fn saturating_from_minutes(minutes: i64) -> Self {
        Self(minutes.clamp(0, MINUTES_PER_DAY as i64) as u16)
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / MINUTES_PER_HOUR
    }

    /// Minute within the hour (0-59).
    pub fn minute(self) -> u16 {
        self.0 % MINUTES_PER_HOUR
    }

    /// Start of the hour row this time falls into.
    pub fn hour_floor(self) -> Self {
        Self(self.hour() * MINUTES_PER_HOUR)
    }

    pub fn checked_add_minutes(self, minutes: i64) -> Option<Self> {
        let total = self.0 as i64 + minutes;
        (0..=MINUTES_PER_DAY as i64)
            .contains(&total)
            .then(|| Self(total as u16))
    }

    /// Signed number of minutes from `self` to `later`.
    pub fn minutes_until(self, later: TimeOfDay) -> i64 {
        later.0 as i64 - self.0 as i64
    }

    pub fn to_naive_time(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour() as u32, self.minute() as u32, 0)
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        Self((time.hour() * 60 + time.minute()) as u16)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "24:00" {
            return Ok(Self::END_OF_DAY);
        }

        let (hours, minutes) = trimmed
            .split_once(':')
            .ok_or_else(|| TimeParseError::Format(s.to_string()))?;
        if hours.len() != 2 || minutes.len() != 2 {
            return Err(TimeParseError::Format(s.to_string()));
        }

        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .map(Self::from)
            .map_err(|_| {
                if hours.chars().chain(minutes.chars()).all(|c| c.is_ascii_digit()) {
                    TimeParseError::OutOfRange(s.to_string())
                } else {
                    TimeParseError::Format(s.to_string())
                }
            })
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
