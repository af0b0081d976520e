//! Overlap resolution for one resource column on one day.
//!
//! Appointments that intersect, directly or through a chain of other
//! appointments, form an overlap group. Each member of a group is given a
//! sub-column so that no two members sharing a sub-column intersect, and all
//! members report the same total so they can split the column evenly.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::appointment::{Appointment, AppointmentId, ResourceId};
use crate::models::settings::GridSettings;
use crate::models::time_of_day::TimeOfDay;

/// Lane placement of one appointment inside its resource column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubColumnAssignment {
    pub sub_column: usize,
    pub total_sub_columns: usize,
    pub is_overlapping: bool,
}

impl SubColumnAssignment {
    /// Placement of an appointment that overlaps nothing.
    pub const SOLO: SubColumnAssignment = SubColumnAssignment {
        sub_column: 0,
        total_sub_columns: 1,
        is_overlapping: false,
    };
}

pub type AssignmentMap = HashMap<AppointmentId, SubColumnAssignment>;

/// Appointment ids connected by direct or transitive overlap, in start order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapGroup {
    pub members: Vec<AppointmentId>,
}

/// Disjoint-set forest with path halving and union by rank.
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, mut node: usize) -> usize {
        while self.parent[node] != node {
            self.parent[node] = self.parent[self.parent[node]];
            node = self.parent[node];
        }
        node
    }

    fn union(&mut self, a: usize, b: usize) {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return;
        }
        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] += 1;
            }
        }
    }
}

/// Indices of `appointments` sorted by start time; ties keep input order.
fn start_order(appointments: &[&Appointment]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..appointments.len()).collect();
    order.sort_by_key(|&index| appointments[index].start);
    order
}

/// Partition into overlap groups, each listed as indices in start order.
///
/// A single sweep over the sorted intervals unions every appointment with the
/// one currently reaching furthest: starting before that end means it
/// intersects it, starting at or after means nothing open can reach it.
fn group_indices(appointments: &[&Appointment]) -> Vec<Vec<usize>> {
    let order = start_order(appointments);
    let mut sets = DisjointSet::new(appointments.len());
    let mut furthest: Option<(usize, TimeOfDay)> = None;

    for &index in &order {
        let appointment = appointments[index];
        match furthest {
            Some((holder, reach)) if appointment.start < reach => {
                sets.union(index, holder);
                if appointment.end > reach {
                    furthest = Some((index, appointment.end));
                }
            }
            _ => furthest = Some((index, appointment.end)),
        }
    }

    let mut slot_by_root: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for &index in &order {
        let root = sets.find(index);
        let slot = *slot_by_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(index);
    }
    groups
}

/// Overlap groups of one resource/day partition, ordered by first start.
pub fn overlap_groups(appointments: &[&Appointment]) -> Vec<OverlapGroup> {
    group_indices(appointments)
        .into_iter()
        .map(|group| OverlapGroup {
            members: group.into_iter().map(|i| appointments[i].id).collect(),
        })
        .collect()
}

/// Greedy lane assignment for a group already sorted by start.
///
/// Each appointment takes the lowest lane not used by an earlier member it
/// intersects.
pub fn assign_sub_columns(group: &[&Appointment]) -> Vec<usize> {
    let mut lanes: Vec<usize> = Vec::with_capacity(group.len());
    for (index, appointment) in group.iter().enumerate() {
        let mut taken = vec![false; index + 1];
        for (earlier, lane) in group[..index].iter().zip(&lanes) {
            if earlier.overlaps(appointment) && *lane < taken.len() {
                taken[*lane] = true;
            }
        }
        let lane = taken.iter().position(|used| !used).unwrap_or(index);
        lanes.push(lane);
    }
    lanes
}

/// Resolve one (resource, date) partition.
///
/// Malformed appointments (start not before end) are skipped; every other
/// input id receives exactly one assignment.
pub fn resolve_overlaps(appointments: &[&Appointment]) -> AssignmentMap {
    let well_formed: Vec<&Appointment> = appointments
        .iter()
        .copied()
        .filter(|a| a.is_well_formed())
        .collect();

    let mut assignments = AssignmentMap::with_capacity(well_formed.len());
    for group in group_indices(&well_formed) {
        if group.len() == 1 {
            assignments.insert(well_formed[group[0]].id, SubColumnAssignment::SOLO);
            continue;
        }

        let members: Vec<&Appointment> = group.iter().map(|&i| well_formed[i]).collect();
        let lanes = assign_sub_columns(&members);
        let total = lanes.iter().max().map_or(1, |max| max + 1);
        for (appointment, lane) in members.iter().zip(lanes) {
            assignments.insert(
                appointment.id,
                SubColumnAssignment {
                    sub_column: lane,
                    total_sub_columns: total,
                    is_overlapping: true,
                },
            );
        }
    }
    assignments
}

/// Split a mixed list into (resource, date) partitions, keeping input order
/// inside each partition.
pub fn partition_by_column(
    appointments: &[Appointment],
) -> Vec<((ResourceId, NaiveDate), Vec<&Appointment>)> {
    let mut slot_by_key: HashMap<(ResourceId, NaiveDate), usize> = HashMap::new();
    let mut partitions: Vec<((ResourceId, NaiveDate), Vec<&Appointment>)> = Vec::new();
    for appointment in appointments {
        let key = (appointment.resource_id, appointment.date);
        let slot = *slot_by_key.entry(key).or_insert_with(|| {
            partitions.push((key, Vec::new()));
            partitions.len() - 1
        });
        partitions[slot].1.push(appointment);
    }
    partitions
}

/// Resolve every resource/day column of a mixed appointment list.
///
/// Statuses hidden by the settings and malformed records take no part.
pub fn resolve_day(appointments: &[Appointment], settings: &GridSettings) -> AssignmentMap {
    let mut assignments = AssignmentMap::new();
    for (_, column) in partition_by_column(appointments) {
        let visible: Vec<&Appointment> = column
            .into_iter()
            .filter(|a| !settings.is_hidden(a.status))
            .collect();
        assignments.extend(resolve_overlaps(&visible));
    }
    assignments
}
