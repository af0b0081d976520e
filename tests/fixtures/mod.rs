// Test fixtures - reusable test data
// Appointments and days shared by the integration tests

use chrono::NaiveDate;
use salon_grid::models::appointment::{Appointment, AppointmentId, AppointmentStatus, ResourceId};
use salon_grid::models::time_of_day::TimeOfDay;

/// Sample dates for testing
pub mod dates {
    use super::*;

    /// Friday 14 March 2025
    pub fn friday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    /// Monday 17 March 2025
    pub fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 17).unwrap()
    }
}

pub fn t(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

pub fn appointment(id: AppointmentId, resource_id: ResourceId, start: &str, end: &str) -> Appointment {
    Appointment::new(id, resource_id, dates::friday(), t(start), t(end))
}

/// Sample schedules for testing
pub mod schedules {
    use super::*;

    /// 09:00-10:00 and 09:30-10:30 on one column
    pub fn two_way_overlap() -> Vec<Appointment> {
        vec![
            appointment(1, 1, "09:00", "10:00"),
            appointment(2, 1, "09:30", "10:30"),
        ]
    }

    /// A overlaps B, B overlaps C, A and C do not touch
    pub fn transitive_trio() -> Vec<Appointment> {
        vec![
            appointment(1, 1, "09:00", "10:00"),
            appointment(2, 1, "09:45", "11:00"),
            appointment(3, 1, "10:30", "11:30"),
        ]
    }

    /// Two columns with a paid appointment and a deleted one
    pub fn busy_friday() -> Vec<Appointment> {
        let mut paid = appointment(5, 2, "13:00", "14:00");
        paid.status = AppointmentStatus::Paid;
        let mut deleted = appointment(6, 2, "13:30", "14:30");
        deleted.status = AppointmentStatus::Deleted;

        vec![
            appointment(1, 1, "09:00", "09:30"),
            appointment(2, 1, "09:15", "10:00"),
            appointment(3, 1, "16:00", "17:00"),
            appointment(4, 2, "10:00", "11:00"),
            paid,
            deleted,
        ]
    }
}
