//! Error types surfaced to the host.

use std::path::PathBuf;

use thiserror::Error;

/// The configuration file could not be used.
///
/// Returned by [`crate::config::ConfigStore::load`]. A failed load never
/// clears a configuration that was cached by an earlier successful load.
#[derive(Debug, Error)]
pub enum ConfigReadError {
    /// Missing file, permission problem or invalid UTF-8.
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not an array of arrays of strings.
    #[error("could not parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigReadError {
    /// Underlying message, without the path prefix.
    ///
    /// This is what the host attaches as detail to its error notification.
    pub fn message(&self) -> String {
        match self {
            Self::Io { source, .. } => source.to_string(),
            Self::Parse { source, .. } => source.to_string(),
        }
    }

    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}

/// No toggle group contains the word.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no toggle group contains '{word}'")]
pub struct NotFound {
    pub word: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_names_word() {
        let err = NotFound { word: "maybe".to_string() };
        assert_eq!(err.to_string(), "no toggle group contains 'maybe'");
    }

    #[test]
    fn test_parse_error_message_has_no_path() {
        let source = serde_json::from_str::<Vec<Vec<String>>>("[[1]]").unwrap_err();
        let err = ConfigReadError::Parse {
            path: PathBuf::from("/tmp/toggler.json"),
            source,
        };

        assert!(err.to_string().starts_with("could not parse /tmp/toggler.json: "));
        assert!(!err.message().contains("/tmp/toggler.json"));
        assert_eq!(err.path(), &PathBuf::from("/tmp/toggler.json"));
    }
}
