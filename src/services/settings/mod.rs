// Settings service module
// Grid settings persisted as a TOML file

mod service;

pub use service::SettingsStore;
