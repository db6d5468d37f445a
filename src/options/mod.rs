//! Option descriptors and the subscription registry
//!
//! The options system provides:
//! - Self-describing descriptors (type, optionality, secrecy, caching policy)
//! - Coercion of type-erased stored values
//! - A registry that gates every backend access
//! - Built-in registrations for the build-job scheduler

pub mod builder;
pub mod option;
pub mod registrations;
pub mod registry;
pub mod types;

pub use builder::OptionBuilder;
pub use option::{OptionDescriptor, OptionDict, OptionStore, SECRET_PLACEHOLDER};
pub use registry::OptionsRegistry;
pub use types::ConfType;
