//! SQLite persistence for owner-scoped option rows

pub mod db;
pub mod migrations;
pub mod repository;

pub use repository::config_options::ConfigOptionRow;
pub use repository::owners::Owner;
