// Salon Grid Library
// Scheduling-grid engine for salon appointments: layout, gestures and persistence

pub mod grid;
pub mod models;
pub mod services;

#[cfg(feature = "cli")]
pub mod cli;
