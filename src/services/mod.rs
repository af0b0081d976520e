// Service module exports

pub mod appointment;
pub mod database;
pub mod mutation;
pub mod notification;
pub mod settings;
