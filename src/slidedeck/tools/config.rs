use std::path::PathBuf;

/// Environment variable naming the directory that holds every deck.
pub const DECKS_DIR_VAR: &str = "SLIDEDECK_DECKS_DIR";
/// Decks root used when nothing is configured.
pub const DEFAULT_DECKS_DIR: &str = "decks";
/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "slidedeck_tools=info";

/// Runtime configuration for the tools and the command line front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root directory under which each deck gets its own folder.
    pub decks_dir: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive string.
    pub log_filter: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured outside of tests.
    pub fn from_env() -> Self {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let decks_dir = lookup(DECKS_DIR_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DECKS_DIR));
        let log_filter = lookup("RUST_LOG")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Self {
            decks_dir,
            log_filter,
        }
    }

    /// Replaces the decks root, typically from a command line override.
    pub fn with_decks_dir(mut self, decks_dir: impl Into<PathBuf>) -> Self {
        self.decks_dir = decks_dir.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::default();
        assert_eq!(config.decks_dir, PathBuf::from("decks"));
        assert_eq!(config.log_filter, "slidedeck_tools=info");
    }

    #[test]
    fn environment_values_win() {
        let config = Config::from_lookup(|key| match key {
            DECKS_DIR_VAR => Some("/srv/decks".to_string()),
            "RUST_LOG" => Some("debug".to_string()),
            _ => None,
        });
        assert_eq!(config.decks_dir, PathBuf::from("/srv/decks"));
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn blank_values_fall_back() {
        let config = Config::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn override_replaces_root() {
        let config = Config::default().with_decks_dir("/tmp/other");
        assert_eq!(config.decks_dir, PathBuf::from("/tmp/other"));
    }
}
