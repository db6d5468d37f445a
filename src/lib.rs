//! Typed configuration options over process settings and an owner-scoped store
//!
//! Declare an [`OptionDescriptor`](options::OptionDescriptor), subscribe it to
//! an [`OptionsRegistry`](options::OptionsRegistry) and resolve it through a
//! [`ConfService`](conf::ConfService) or the routing
//! [`ConfHandler`](conf::ConfHandler).

pub mod conf;
pub mod options;
pub mod settings;
pub mod store;

pub use conf::{ConfError, ConfErrorKind, ConfHandler, ConfService};
pub use options::{ConfType, OptionBuilder, OptionDescriptor, OptionDict, OptionStore, OptionsRegistry};
pub use settings::Settings;
