//! Repository layer for database operations

pub mod config_options;
pub mod owners;
