//! Toggler plugin instance
//!
//! Ties the configuration store to a [`Host`]: registers the two commands,
//! toggles selections and reports problems through host notifications.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, error, info, warn};

use crate::config::ConfigStore;
use crate::constants::{commands, messages};
use crate::host::{Host, Notification, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Configure,
}

impl Command {
    pub const ALL: [Command; 2] = [Command::Toggle, Command::Configure];

    pub fn name(self) -> &'static str {
        match self {
            Command::Toggle => commands::TOGGLE,
            Command::Configure => commands::CONFIGURE,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|command| command.name() == name)
            .ok_or_else(|| format!("unknown command '{name}'"))
    }
}

/// Outcome of one toggle command
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ToggleSummary {
    /// Selections that were replaced
    pub toggled: usize,
    /// Words with no toggle group, in selection order
    pub not_found: Vec<String>,
}

#[derive(Debug)]
pub struct Toggler {
    store: ConfigStore,
    subscriptions: Vec<Subscription>,
}

impl Toggler {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            subscriptions: Vec::new(),
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Register commands, then load the configuration or, on first use,
    /// run the configure command to create it
    pub fn activate(&mut self, host: &mut dyn Host) {
        for command in Command::ALL {
            self.subscriptions.push(host.register_command(command.name()));
        }
        info!(path = %self.store.path().display(), "Toggler activated");

        if self.store.is_configured() {
            self.load_configuration(false, host);
        } else {
            self.configure(host);
        }
    }

    /// Release every command registration
    pub fn deactivate(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.dispose();
        }
        info!("Toggler deactivated");
    }

    pub fn dispatch(&mut self, command: Command, host: &mut dyn Host) -> ToggleSummary {
        debug!(command = %command, "Dispatching command");
        match command {
            Command::Toggle => self.toggle(host),
            Command::Configure => {
                self.configure(host);
                ToggleSummary::default()
            }
        }
    }

    /// Toggle every selection.
    ///
    /// An empty selection is first expanded to the word under its cursor; in
    /// that case the replacement is not left selected. Does nothing until a
    /// configuration has been loaded.
    pub fn toggle(&mut self, host: &mut dyn Host) -> ToggleSummary {
        let mut summary = ToggleSummary::default();
        let Some(configuration) = self.store.snapshot() else {
            debug!("No configuration loaded, ignoring toggle");
            return summary;
        };

        for index in 0..host.selection_count() {
            let mut text = host.selected_text(index);
            let mut selected = true;

            if text.is_empty() {
                selected = false;
                host.select_word(index);
                text = host.selected_text(index);
            }

            match configuration.resolve(&text) {
                Ok(toggle) => {
                    debug!(word = %text, toggle = %toggle, "Toggled word");
                    host.insert_text(index, &toggle, selected);
                    summary.toggled += 1;
                }
                Err(not_found) => {
                    warn!(word = %not_found.word, "No toggle group for word");
                    host.notify(Notification::Warning(messages::not_found(&not_found.word)));
                    summary.not_found.push(not_found.word);
                }
            }
        }

        summary
    }

    /// Open the configuration file, creating it from the bundled default first
    /// when it does not exist yet
    pub fn configure(&mut self, host: &mut dyn Host) {
        match self.store.ensure_configured() {
            Ok(true) => {
                self.load_configuration(true, host);
            }
            Ok(false) => {}
            Err(e) => {
                error!(path = %self.store.path().display(), error = %e, "Failed to create configuration file");
                host.notify(Notification::Error {
                    message: messages::CONFIG_UNREADABLE.to_string(),
                    detail: e.to_string(),
                });
                return;
            }
        }

        if let Err(e) = host.open_file(self.store.path()) {
            error!(path = %self.store.path().display(), error = %e, "Failed to open configuration file");
            host.notify(Notification::Error {
                message: messages::CONFIG_UNREADABLE.to_string(),
                detail: e.to_string(),
            });
        }
    }

    /// The host saw the configuration file being saved
    pub fn config_saved(&mut self, host: &mut dyn Host) -> bool {
        self.load_configuration(true, host)
    }

    /// Load (or with `force`, reload) the configuration, notifying the user on
    /// failure. Returns whether a configuration is usable afterwards.
    pub fn load_configuration(&mut self, force: bool, host: &mut dyn Host) -> bool {
        match self.store.load(force) {
            Ok(_) => true,
            Err(e) => {
                error!(path = %e.path().display(), error = %e, "Failed to load configuration");
                host.notify(Notification::Error {
                    message: messages::CONFIG_UNREADABLE.to_string(),
                    detail: e.message(),
                });
                self.store.snapshot().is_some()
            }
        }
    }
}

impl Drop for Toggler {
    fn drop(&mut self) {
        if !self.subscriptions.is_empty() {
            self.deactivate();
        }
    }
}
