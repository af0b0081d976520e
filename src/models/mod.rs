// Module exports for models

pub mod appointment;
pub mod settings;
pub mod time_of_day;
pub mod working_hours;
