use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use crate::grid::{
    AllowAll, DayLayout, DragHover, GestureResult, Geometry, ScheduleBoard, TimeAxis,
};
use crate::models::appointment::{Appointment, AppointmentId, AppointmentRecord, ResourceId};
use crate::models::settings::GridSettings;
use crate::models::time_of_day::TimeOfDay;
use crate::services::appointment::AppointmentService;
use crate::services::database::Database;
use crate::services::notification::LogNotifier;
use crate::services::settings::SettingsStore;

#[derive(Parser, Debug)]
#[command(name = "salon-grid", version, about = "Salon appointment grid layout engine")]
pub struct Args {
    /// Settings file (TOML). Defaults to grid.toml in the config directory.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print sub-column assignments and card geometry for one day as JSON
    Layout {
        #[arg(short = 'd', long = "date")]
        date: NaiveDate,
        /// SQLite appointment store
        #[arg(long = "db", conflicts_with = "input")]
        db: Option<PathBuf>,
        /// JSON file with an array of appointments
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,
    },
    /// Import appointments from a JSON file into the store
    Seed {
        #[arg(long = "db")]
        db: PathBuf,
        #[arg(short = 'i', long = "input")]
        input: PathBuf,
    },
    /// Drag an appointment to a new start, column or day
    Move {
        #[arg(long = "db")]
        db: PathBuf,
        #[arg(long = "id")]
        id: AppointmentId,
        /// New start time, HH:mm
        #[arg(long = "to")]
        to: TimeOfDay,
        #[arg(long = "resource")]
        resource: Option<ResourceId>,
        #[arg(short = 'd', long = "date")]
        date: Option<NaiveDate>,
    },
    /// Drag the bottom edge of an appointment to a new end time
    Resize {
        #[arg(long = "db")]
        db: PathBuf,
        #[arg(long = "id")]
        id: AppointmentId,
        /// New end time, HH:mm
        #[arg(long = "end")]
        end: TimeOfDay,
    },
}

#[derive(Serialize)]
struct CardOutput {
    id: AppointmentId,
    resource_id: ResourceId,
    start: TimeOfDay,
    end: TimeOfDay,
    sub_column: usize,
    total_sub_columns: usize,
    is_overlapping: bool,
    offset_px: f32,
    geometry: Geometry,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref())?;

    match args.command {
        Command::Layout { date, db, input } => {
            let appointments = match (db, input) {
                (Some(db), None) => load_from_db(&db, date)?,
                (None, Some(input)) => read_appointments(&input)?,
                _ => return Err(anyhow!("Pass either --db or --input")),
            };
            let board = ScheduleBoard::new(settings, appointments);
            let layout = board.layout(date);
            print_json(&layout_output(date, &board, &layout))
        }
        Command::Seed { db, input } => {
            let appointments = read_appointments(&input)?;
            let database = open_database(&db)?;
            let service = AppointmentService::new(database.connection());
            for appointment in &appointments {
                service.create(appointment.clone())?;
            }
            log::info!("Imported {} appointments into {}", appointments.len(), db.display());
            print_json(&json!({ "imported": appointments.len() }))
        }
        Command::Move {
            db,
            id,
            to,
            resource,
            date,
        } => {
            let database = open_database(&db)?;
            let service = AppointmentService::new(database.connection());
            let result = move_appointment(&service, settings, id, to, resource, date)?;
            print_json(&result_output(&result))
        }
        Command::Resize { db, id, end } => {
            let database = open_database(&db)?;
            let service = AppointmentService::new(database.connection());
            let result = resize_appointment(&service, settings, id, end)?;
            print_json(&result_output(&result))
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<GridSettings> {
    let store = match path {
        Some(path) => SettingsStore::new(path),
        None => match SettingsStore::at_default_location() {
            Ok(store) => store,
            Err(e) => {
                log::warn!("{}, using default settings", e);
                return Ok(GridSettings::default());
            }
        },
    };
    store
        .load()
        .with_context(|| format!("Failed to load settings from {}", store.path().display()))
}

fn open_database(path: &Path) -> Result<Database> {
    Database::open(path)
}

/// Replay a drag of appointment `id` so that it starts at `to`.
fn move_appointment(
    service: &AppointmentService,
    settings: GridSettings,
    id: AppointmentId,
    to: TimeOfDay,
    resource: Option<ResourceId>,
    date: Option<NaiveDate>,
) -> Result<GestureResult> {
    let appointment = service
        .get(id)?
        .ok_or_else(|| anyhow!("Appointment {} not found", id))?;
    let mut board = ScheduleBoard::new(settings, vec![appointment.clone()]);

    let axis = *board.axis();
    let pointer_y = drag_distance(&axis, appointment.start, to).ok_or_else(|| {
        anyhow!(
            "{} is outside the grid ({}-{}); nothing was moved",
            to,
            axis.start(),
            axis.end()
        )
    })?;
    let hover = DragHover {
        resource_id: resource.unwrap_or(appointment.resource_id),
        date: date.unwrap_or(appointment.date),
        pointer_y,
    };

    let mut notifier = LogNotifier;
    board.begin_drag(id, 0.0, &AllowAll, &mut notifier)?;
    board.drag_over(hover);
    Ok(board.drop_and_apply(service, &mut notifier))
}

/// Replay a drag of the bottom edge of appointment `id` to `end`.
fn resize_appointment(
    service: &AppointmentService,
    settings: GridSettings,
    id: AppointmentId,
    end: TimeOfDay,
) -> Result<GestureResult> {
    let appointment = service
        .get(id)?
        .ok_or_else(|| anyhow!("Appointment {} not found", id))?;
    let mut board = ScheduleBoard::new(settings, vec![appointment.clone()]);

    let delta_px = pointer_distance(board.axis(), appointment.end, end);
    let mut notifier = LogNotifier;
    board.begin_resize(id, 0.0, &AllowAll, &mut notifier)?;
    board.resize_move(delta_px);
    Ok(board.resize_and_apply(service, &mut notifier))
}

/// Pointer travel that drags a card from `from` to `to`, `None` when `to`
/// is off the visible axis and the pointer could not reach it.
fn drag_distance(axis: &TimeAxis, from: TimeOfDay, to: TimeOfDay) -> Option<f32> {
    if to < axis.start() || to > axis.end() {
        return None;
    }
    Some(axis.time_to_offset(to) - axis.time_to_offset(from))
}

fn load_from_db(path: &Path, date: NaiveDate) -> Result<Vec<Appointment>> {
    let db = open_database(path)?;
    AppointmentService::new(db.connection()).list_for_day(date)
}

/// Read an array of appointment records; records with bad times are skipped.
fn read_appointments(path: &Path) -> Result<Vec<Appointment>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<AppointmentRecord> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse appointments in {}", path.display()))?;

    Ok(records
        .into_iter()
        .filter_map(|record| match Appointment::try_from(record) {
            Ok(appointment) => Some(appointment),
            Err(e) => {
                log::warn!("Skipping {}", e);
                None
            }
        })
        .collect())
}

/// Vertical pointer travel that moves an edge from `from` to `to`.
fn pointer_distance(axis: &TimeAxis, from: TimeOfDay, to: TimeOfDay) -> f32 {
    from.minutes_until(to) as f32 / 60.0 * axis.hour_height_px()
}

fn layout_output(date: NaiveDate, board: &ScheduleBoard, layout: &DayLayout) -> serde_json::Value {
    let mut cards: Vec<CardOutput> = board
        .book()
        .for_date(date)
        .into_iter()
        .filter_map(|appointment| {
            let assignment = layout.assignments.get(&appointment.id)?;
            let geometry = layout.geometry.get(&appointment.id)?;
            Some(CardOutput {
                id: appointment.id,
                resource_id: appointment.resource_id,
                start: appointment.start,
                end: appointment.end,
                sub_column: assignment.sub_column,
                total_sub_columns: assignment.total_sub_columns,
                is_overlapping: assignment.is_overlapping,
                offset_px: board.axis().time_to_offset(appointment.start.hour_floor()),
                geometry: *geometry,
            })
        })
        .collect();
    cards.sort_by_key(|card| (card.resource_id, card.start, card.id));

    json!({
        "date": date,
        "hour_height_px": board.settings().hour_height_px,
        "axis": { "start": board.axis().start(), "end": board.axis().end() },
        "appointments": cards,
    })
}

fn result_output(result: &GestureResult) -> serde_json::Value {
    match result {
        GestureResult::Applied(request) => json!({ "status": "applied", "request": request }),
        GestureResult::RolledBack { request, error } => json!({
            "status": "rolled_back",
            "request": request,
            "error": error.to_string(),
        }),
        GestureResult::Rejected(rejection) => json!({ "status": "rejected", "rejection": rejection }),
        GestureResult::Unchanged(id) => json!({ "status": "unchanged", "appointment_id": id }),
        GestureResult::Idle => json!({ "status": "idle" }),
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}
