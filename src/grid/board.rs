//! The scheduling board: settings, appointments and the active gesture in
//! one place.
//!
//! Rendering code calls [`ScheduleBoard::layout`] each pass and forwards
//! pointer events to the gesture methods. Released gestures become mutation
//! requests, which the board writes optimistically and settles once the
//! persistence layer answers.

use chrono::NaiveDate;

use super::book::{AppointmentBook, Ticket};
use super::drag::DragHover;
use super::interaction::{
    EditPermission, GestureError, GestureOutcome, InteractionController, PreviewGeometry,
    Rejection,
};
use super::layout::{layout_day, DayLayout, LayoutPolicy};
use super::time_axis::TimeAxis;
use crate::models::appointment::{Appointment, AppointmentId};
use crate::models::settings::{GridSettings, SettingsError};
use crate::models::working_hours::WorkingHoursSource;
use crate::services::mutation::{apply_request, ApplyError, MutationApplier, MutationRequest};
use crate::services::notification::Notifier;

/// What happened to a released gesture once persistence was involved.
#[derive(Debug)]
pub enum GestureResult {
    Applied(MutationRequest),
    RolledBack {
        request: MutationRequest,
        error: ApplyError,
    },
    Rejected(Rejection),
    Unchanged(AppointmentId),
    Idle,
}

pub struct ScheduleBoard {
    settings: GridSettings,
    hours: Option<Box<dyn WorkingHoursSource>>,
    book: AppointmentBook,
    controller: InteractionController,
}

impl ScheduleBoard {
    pub fn new(settings: GridSettings, appointments: Vec<Appointment>) -> Self {
        let axis = TimeAxis::from_settings(&settings);
        Self {
            settings,
            hours: None,
            book: AppointmentBook::from_appointments(appointments),
            controller: InteractionController::new(axis),
        }
    }

    /// Use a custom working-hours lookup instead of the settings' weekly schedule.
    pub fn with_hours_source(mut self, hours: Box<dyn WorkingHoursSource>) -> Self {
        self.hours = Some(hours);
        self
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn book(&self) -> &AppointmentBook {
        &self.book
    }

    pub fn book_mut(&mut self) -> &mut AppointmentBook {
        &mut self.book
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn axis(&self) -> &TimeAxis {
        self.controller.axis()
    }

    /// Replace the settings. The active gesture is cancelled.
    pub fn set_settings(&mut self, settings: GridSettings) -> Result<(), SettingsError> {
        settings.validate()?;
        self.controller.set_axis(TimeAxis::from_settings(&settings));
        self.settings = settings;
        Ok(())
    }

    /// Zoom the grid. The active gesture is cancelled.
    pub fn set_hour_height(&mut self, hour_height_px: f32) -> Result<(), SettingsError> {
        let mut settings = self.settings.clone();
        settings.hour_height_px = hour_height_px;
        self.set_settings(settings)
    }

    pub fn layout(&self, date: NaiveDate) -> DayLayout {
        layout_day(&self.book.for_date(date), &self.settings)
    }

    pub fn preview(&self) -> Option<PreviewGeometry> {
        self.controller
            .preview(LayoutPolicy::from_settings(&self.settings))
    }

    /// Pick up a card. A refused start is reported to `notifier`.
    pub fn begin_drag(
        &mut self,
        appointment_id: AppointmentId,
        pointer_y: f32,
        permission: &dyn EditPermission,
        notifier: &mut dyn Notifier,
    ) -> Result<(), GestureError> {
        let started = self.startable(appointment_id).and_then(|appointment| {
            self.controller
                .on_drag_start(&appointment, pointer_y, permission)
        });
        report_refusal(started, notifier)
    }

    pub fn drag_over(&mut self, hover: DragHover) {
        self.controller.on_drag_over(hover);
    }

    pub fn animation_frame(&mut self) -> bool {
        let hours = hours_source(&self.hours, &self.settings);
        self.controller.on_animation_frame(hours)
    }

    /// Release the dragged card. Rejections are reported to `notifier`.
    pub fn finish_drag(&mut self, notifier: &mut dyn Notifier) -> GestureOutcome {
        let hours = hours_source(&self.hours, &self.settings);
        let outcome = self.controller.on_drop(hours);
        report_rejection(&outcome, notifier);
        outcome
    }

    pub fn begin_resize(
        &mut self,
        appointment_id: AppointmentId,
        pointer_y: f32,
        permission: &dyn EditPermission,
        notifier: &mut dyn Notifier,
    ) -> Result<(), GestureError> {
        let started = self.startable(appointment_id).and_then(|appointment| {
            self.controller
                .on_resize_start(&appointment, pointer_y, permission)
        });
        report_refusal(started, notifier)
    }

    pub fn resize_move(&mut self, pointer_y: f32) -> bool {
        let hours = hours_source(&self.hours, &self.settings);
        self.controller.on_resize_move(pointer_y, hours)
    }

    pub fn finish_resize(&mut self, notifier: &mut dyn Notifier) -> GestureOutcome {
        let outcome = self.controller.on_resize_end();
        report_rejection(&outcome, notifier);
        outcome
    }

    pub fn cancel(&mut self) -> Option<AppointmentId> {
        self.controller.cancel()
    }

    /// Write `request` to the board ahead of persistence.
    pub fn commit(&mut self, request: MutationRequest) -> Result<Ticket, GestureError> {
        let id = request.appointment_id();
        self.book
            .commit(request)
            .ok_or(GestureError::UnknownAppointment(id))
    }

    /// Resolve an optimistic write with the persistence layer's answer.
    pub fn settle(
        &mut self,
        ticket: Ticket,
        result: Result<(), ApplyError>,
        notifier: &mut dyn Notifier,
    ) -> Result<(), ApplyError> {
        match result {
            Ok(()) => {
                self.book.confirm(ticket);
                Ok(())
            }
            Err(error) => {
                self.book.rollback(ticket);
                notifier.persistence_failed(ticket.appointment_id(), &error);
                Err(error)
            }
        }
    }

    /// Commit, apply and settle in one step, for appliers that answer synchronously.
    pub fn dispatch(
        &mut self,
        request: MutationRequest,
        applier: &dyn MutationApplier,
        notifier: &mut dyn Notifier,
    ) -> GestureResult {
        let id = request.appointment_id();
        let Ok(ticket) = self.commit(request.clone()) else {
            log::warn!("Appointment {} is not on the board; nothing to apply", id);
            return GestureResult::RolledBack {
                request,
                error: ApplyError::NotFound(id),
            };
        };

        let result = apply_request(applier, &request);
        match self.settle(ticket, result, notifier) {
            Ok(()) => GestureResult::Applied(request),
            Err(error) => GestureResult::RolledBack { request, error },
        }
    }

    pub fn drop_and_apply(
        &mut self,
        applier: &dyn MutationApplier,
        notifier: &mut dyn Notifier,
    ) -> GestureResult {
        let outcome = self.finish_drag(notifier);
        self.resolve(outcome, applier, notifier)
    }

    pub fn resize_and_apply(
        &mut self,
        applier: &dyn MutationApplier,
        notifier: &mut dyn Notifier,
    ) -> GestureResult {
        let outcome = self.finish_resize(notifier);
        self.resolve(outcome, applier, notifier)
    }

    fn resolve(
        &mut self,
        outcome: GestureOutcome,
        applier: &dyn MutationApplier,
        notifier: &mut dyn Notifier,
    ) -> GestureResult {
        match outcome {
            GestureOutcome::Committed(request) => self.dispatch(request, applier, notifier),
            GestureOutcome::Rejected(rejection) => GestureResult::Rejected(rejection),
            GestureOutcome::Unchanged(id) => GestureResult::Unchanged(id),
            GestureOutcome::Idle => GestureResult::Idle,
        }
    }

    fn startable(&self, appointment_id: AppointmentId) -> Result<Appointment, GestureError> {
        let appointment = self
            .book
            .get(appointment_id)
            .cloned()
            .ok_or(GestureError::UnknownAppointment(appointment_id))?;
        if self.settings.reject_while_pending && self.book.has_pending(appointment_id) {
            return Err(GestureError::PendingMutation(appointment_id));
        }
        Ok(appointment)
    }
}

fn hours_source<'a>(
    custom: &'a Option<Box<dyn WorkingHoursSource>>,
    settings: &'a GridSettings,
) -> &'a dyn WorkingHoursSource {
    match custom {
        Some(hours) => hours.as_ref(),
        None => settings,
    }
}

fn report_refusal(
    started: Result<(), GestureError>,
    notifier: &mut dyn Notifier,
) -> Result<(), GestureError> {
    if let Err(error) = &started {
        log::debug!("Gesture not started: {}", error);
        notifier.gesture_refused(error);
    }
    started
}

fn report_rejection(outcome: &GestureOutcome, notifier: &mut dyn Notifier) {
    if let GestureOutcome::Rejected(rejection) = outcome {
        log::warn!(
            "Appointment {} rejected: {}",
            rejection.appointment_id,
            rejection.reason.as_str()
        );
        notifier.rejected(rejection);
    }
}
