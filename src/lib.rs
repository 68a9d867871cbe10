#![forbid(unsafe_code)]
//! Toggler: cycle a word through configured groups of equivalents
//! (`true`/`false`, `get`/`set`, ...) while keeping its casing.

pub mod buffer;
pub mod config;
pub mod constants;
pub mod error;
pub mod host;
pub mod plugin;
pub mod toggle;

pub use config::ConfigStore;
pub use error::{ConfigReadError, NotFound};
pub use host::{Host, Notification, Subscription};
pub use plugin::{Command, ToggleSummary, Toggler};
pub use toggle::{CasingStyle, Configuration, ToggleGroup, resolve};
