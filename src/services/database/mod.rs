// Database service module
// SQLite connection and schema for the appointment store

mod connection;
mod migrations;
mod schema;

pub use connection::Database;
