//! Application-wide constants
//!
//! File names, environment variables and user-facing notification texts,
//! kept in one place so the CLI and the plugin agree on them.

/// Configuration file location
pub mod config {
    /// Directory created under the platform config dir
    pub const APP_DIR: &str = "toggler";

    /// Configuration file name
    pub const FILENAME: &str = "toggler.json";
}

/// Environment variables read at startup
pub mod env {
    /// Overrides the resolved configuration file path
    pub const CONFIG_PATH: &str = "TOGGLER_CONFIG";

    /// Log level for the CLI subscriber (trace/debug/info/warn/error)
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
}

/// Host command names
pub mod commands {
    /// Toggle every selection (or the word under each cursor)
    pub const TOGGLE: &str = "toggler:toggle";

    /// Open the configuration file, seeding it when missing
    pub const CONFIGURE: &str = "toggler:config";
}

/// Notification texts shown through the host
pub mod messages {
    /// Error title when the configuration cannot be read or parsed
    pub const CONFIG_UNREADABLE: &str =
        "Toggler: Could not read configuration file. Please use the `toggler:config` command.";

    /// Warning for a word that belongs to no group
    pub fn not_found(word: &str) -> String {
        format!(
            "Toggler: Could not find toggles for '{word}'. Please use the `{}` command to add one.",
            super::commands::CONFIGURE
        )
    }
}
