//! Configuration management for Toggler
//!
//! The configuration is a single JSON file under the platform config dir.
//! - **store**: ConfigStore, which resolves the path, loads and caches the file
//!   and seeds it from the bundled default on first use

pub mod store;

pub use store::ConfigStore;
