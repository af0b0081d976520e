//! The board's in-memory copy of appointments.
//!
//! Committed gestures are written here optimistically, before persistence
//! confirms them. Each write keeps the appointment as it was beforehand so a
//! failed write can be undone exactly.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::appointment::{Appointment, AppointmentId};
use crate::services::mutation::MutationRequest;

/// Handle for an optimistic write awaiting confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    seq: u64,
    appointment_id: AppointmentId,
}

impl Ticket {
    pub fn appointment_id(&self) -> AppointmentId {
        self.appointment_id
    }
}

#[derive(Debug, Clone)]
struct PendingChange {
    ticket: Ticket,
    request: MutationRequest,
    snapshot: Appointment,
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentBook {
    appointments: BTreeMap<AppointmentId, Appointment>,
    pending: Vec<PendingChange>,
    next_seq: u64,
}

impl AppointmentBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_appointments(appointments: impl IntoIterator<Item = Appointment>) -> Self {
        let mut book = Self::new();
        for appointment in appointments {
            book.insert(appointment);
        }
        book
    }

    /// Add or replace an appointment.
    pub fn insert(&mut self, appointment: Appointment) {
        self.appointments.insert(appointment.id, appointment);
    }

    pub fn remove(&mut self, id: AppointmentId) -> Option<Appointment> {
        self.pending.retain(|change| change.ticket.appointment_id != id);
        self.appointments.remove(&id)
    }

    pub fn get(&self, id: AppointmentId) -> Option<&Appointment> {
        self.appointments.get(&id)
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Appointment> {
        self.appointments.values()
    }

    pub fn for_date(&self, date: NaiveDate) -> Vec<Appointment> {
        self.appointments
            .values()
            .filter(|appointment| appointment.date == date)
            .cloned()
            .collect()
    }

    pub fn has_pending(&self, id: AppointmentId) -> bool {
        self.pending
            .iter()
            .any(|change| change.ticket.appointment_id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Apply `request` immediately and remember how to undo it.
    ///
    /// Returns `None` when the appointment is not in the book.
    pub fn commit(&mut self, request: MutationRequest) -> Option<Ticket> {
        let id = request.appointment_id();
        let appointment = self.appointments.get_mut(&id)?;

        let snapshot = appointment.clone();
        request.apply_to(appointment);

        let ticket = Ticket {
            seq: self.next_seq,
            appointment_id: id,
        };
        self.next_seq += 1;

        log::info!("{} (pending, ticket {})", request.describe(), ticket.seq);
        self.pending.push(PendingChange {
            ticket,
            request,
            snapshot,
        });
        Some(ticket)
    }

    /// Persistence accepted the change; forget the snapshot.
    pub fn confirm(&mut self, ticket: Ticket) -> bool {
        match self.take_pending(ticket) {
            Some(_) => {
                log::info!("Change to appointment {} confirmed", ticket.appointment_id);
                true
            }
            None => false,
        }
    }

    /// Persistence refused the change; restore the pre-gesture appointment.
    ///
    /// Later changes to the same appointment that are still pending are
    /// replayed on top of the restored values, in commit order, and each
    /// of them takes its new starting point as its snapshot.
    ///
    /// Returns the appointment as it is visible after the rollback.
    pub fn rollback(&mut self, ticket: Ticket) -> Option<Appointment> {
        let change = self.take_pending(ticket)?;
        let id = ticket.appointment_id;

        let mut visible = change.snapshot;
        let mut replayed = 0;
        for later in self
            .pending
            .iter_mut()
            .filter(|other| other.ticket.appointment_id == id && other.ticket.seq > ticket.seq)
        {
            later.snapshot = visible.clone();
            later.request.apply_to(&mut visible);
            replayed += 1;
        }

        if replayed > 0 {
            log::warn!(
                "Change to appointment {} failed; replayed {} newer pending change(s)",
                id,
                replayed
            );
        } else {
            log::warn!("Change to appointment {} failed; restoring previous values", id);
        }
        self.appointments.insert(id, visible.clone());
        Some(visible)
    }

    fn take_pending(&mut self, ticket: Ticket) -> Option<PendingChange> {
        let index = self
            .pending
            .iter()
            .position(|change| change.ticket == ticket)?;
        Some(self.pending.remove(index))
    }
}
