//! Option resolution over settings and the persisted store
//!
//! A [`ConfService`] implements the get/set/delete protocol once; the
//! backend-specific parts live behind [`ConfBackend`]:
//! - [`SettingsBackend`] reads process-wide settings and rejects mutation
//! - [`ClusterBackend`] reads and writes owner-scoped rows through a TTL cache
//!
//! [`ConfHandler`] routes each key to the service owning its store.

pub mod backend;
pub mod cache;
pub mod cluster_backend;
pub mod error;
pub mod handler;
pub mod service;
pub mod settings_backend;

pub use backend::ConfBackend;
pub use cache::{CacheStats, OptionCache};
pub use cluster_backend::ClusterBackend;
pub use error::{ConfError, ConfErrorKind, Result};
pub use handler::ConfHandler;
pub use service::ConfService;
pub use settings_backend::SettingsBackend;

/// Service reading process-wide settings
pub type SettingsConfService = ConfService<SettingsBackend>;

/// Service reading and writing owner-scoped persisted options
pub type ClusterConfService = ConfService<ClusterBackend>;
