// Property-based tests for the grid engine
// Overlap lanes, snapping, the time axis and resize floors under random input

use chrono::NaiveDate;
use proptest::prelude::*;
use salon_grid::grid::layout::{compute_geometry, LayoutPolicy};
use salon_grid::grid::overlap::resolve_overlaps;
use salon_grid::grid::resize::ResizeSession;
use salon_grid::grid::{snap_to_5_minutes, TimeAxis};
use salon_grid::models::appointment::Appointment;
use salon_grid::models::settings::{AlignmentPolicy, SizingPolicy, MIN_DURATION_MINUTES};
use salon_grid::models::time_of_day::TimeOfDay;
use salon_grid::models::working_hours::WorkingHours;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
}

fn time(minutes: u16) -> TimeOfDay {
    TimeOfDay::from_minutes(minutes).unwrap()
}

/// One column's worth of well-formed appointments.
fn column() -> impl Strategy<Value = Vec<Appointment>> {
    prop::collection::vec((0u16..1435, 1u16..240), 0..40).prop_map(|spans| {
        spans
            .into_iter()
            .enumerate()
            .map(|(i, (start, len))| {
                let end = (start + len).min(1440);
                Appointment::new(i as i64 + 1, 1, day(), time(start), time(end))
            })
            .collect()
    })
}

fn layout_policy() -> impl Strategy<Value = LayoutPolicy> {
    (
        prop_oneof![
            Just(SizingPolicy::Compact),
            Just(SizingPolicy::Normal),
            Just(SizingPolicy::Expanded)
        ],
        prop_oneof![
            Just(AlignmentPolicy::Left),
            Just(AlignmentPolicy::Center),
            Just(AlignmentPolicy::Right)
        ],
    )
        .prop_map(|(sizing, alignment)| LayoutPolicy { sizing, alignment })
}

proptest! {
    /// Every well-formed appointment gets exactly one lane inside its group's range
    #[test]
    fn prop_every_appointment_is_assigned(appointments in column()) {
        let refs: Vec<&Appointment> = appointments.iter().collect();
        let assignments = resolve_overlaps(&refs);

        prop_assert_eq!(assignments.len(), appointments.len());
        for assignment in assignments.values() {
            prop_assert!(assignment.sub_column < assignment.total_sub_columns);
            prop_assert_eq!(assignment.is_overlapping, assignment.total_sub_columns > 1);
        }
    }

    /// Two appointments sharing a lane never intersect
    #[test]
    fn prop_lane_members_do_not_overlap(appointments in column()) {
        let refs: Vec<&Appointment> = appointments.iter().collect();
        let assignments = resolve_overlaps(&refs);

        for (i, a) in appointments.iter().enumerate() {
            for b in &appointments[i + 1..] {
                if a.overlaps(b) {
                    prop_assert_ne!(assignments[&a.id].sub_column, assignments[&b.id].sub_column);
                }
            }
        }
    }

    /// Intersecting appointments are in one group and agree on the lane count
    #[test]
    fn prop_overlapping_pairs_share_total(appointments in column()) {
        let refs: Vec<&Appointment> = appointments.iter().collect();
        let assignments = resolve_overlaps(&refs);

        for (i, a) in appointments.iter().enumerate() {
            for b in &appointments[i + 1..] {
                if a.overlaps(b) {
                    let (x, y) = (assignments[&a.id], assignments[&b.id]);
                    prop_assert!(x.is_overlapping && y.is_overlapping);
                    prop_assert_eq!(x.total_sub_columns, y.total_sub_columns);
                }
            }
        }
    }

    /// Side-by-side cards never overlap horizontally and stay inside the column
    #[test]
    fn prop_lanes_do_not_overlap_horizontally(appointments in column(), policy in layout_policy()) {
        let refs: Vec<&Appointment> = appointments.iter().collect();
        let assignments = resolve_overlaps(&refs);

        for (i, a) in appointments.iter().enumerate() {
            let ga = compute_geometry(a.start, a.duration_minutes(), assignments[&a.id], policy);
            prop_assert!(ga.left >= -1e-3 && ga.left + ga.width <= 100.0 + 1e-3);
            for b in &appointments[i + 1..] {
                if a.overlaps(b) {
                    let gb = compute_geometry(b.start, b.duration_minutes(), assignments[&b.id], policy);
                    let apart = ga.left + ga.width <= gb.left + 1e-3
                        || gb.left + gb.width <= ga.left + 1e-3;
                    prop_assert!(apart);
                }
            }
        }
    }

    /// Snapping twice is the same as snapping once, and lands on the 5-minute grid
    #[test]
    fn prop_snap_is_idempotent(minutes in 0u16..=1440) {
        let once = snap_to_5_minutes(time(minutes));
        prop_assert_eq!(snap_to_5_minutes(once), once);
        prop_assert_eq!(once.minutes() % 5, 0);
        prop_assert!((once.minutes() as i32 - minutes as i32).abs() <= 2);
    }

    /// Converting a time to pixels and back yields its snapped value
    #[test]
    fn prop_axis_round_trip(minutes in 0u16..=1440, hour_height in 175.0f32..=800.0) {
        let axis = TimeAxis::full_day(hour_height);
        let t = time(minutes);
        prop_assert_eq!(axis.offset_to_time(axis.time_to_offset(t)), snap_to_5_minutes(t));
    }

    /// Resizing never produces less than the minimum duration
    #[test]
    fn prop_resize_respects_floor(
        start in 0u16..1200,
        len in 1u16..240,
        pointer_delta in -5000.0f32..5000.0,
    ) {
        let appointment = Appointment::new(1, 1, day(), time(start), time(start + len));
        let mut session = ResizeSession::from_appointment(&appointment, 0.0);
        session.update(pointer_delta, 240.0, &WorkingHours::new(time(0), TimeOfDay::END_OF_DAY).unwrap());

        prop_assert!(session.candidate_duration_minutes >= MIN_DURATION_MINUTES);
    }
}
