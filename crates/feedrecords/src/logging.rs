//! Tracing setup and the runtime log-level switch.

use std::sync::{Arc, RwLock};

use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

use crate::config::Config;

/// Levels accepted by the admin route, most to least severe.
pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

const DEFAULT_LEVEL: &str = "debug";
const DEFAULT_FILTER: &str = "feedrecords=debug,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum LogLevelError {
    #[error("Log level must be one of: {}", LOG_LEVELS.join(", "))]
    Unknown(String),
    #[error("failed to reload log filter: {0}")]
    Reload(String),
}

/// Something able to swap the active level filter.
pub trait LevelControl: Send + Sync {
    fn apply(&self, level: &str) -> Result<(), LogLevelError>;
}

impl LevelControl for reload::Handle<EnvFilter, Registry> {
    fn apply(&self, level: &str) -> Result<(), LogLevelError> {
        let filter = EnvFilter::try_new(format!("feedrecords={level},tower_http={level}"))
            .map_err(|e| LogLevelError::Reload(e.to_string()))?;
        self.reload(filter)
            .map_err(|e| LogLevelError::Reload(e.to_string()))
    }
}

/// Current log level, changeable at runtime.
#[derive(Clone)]
pub struct LogLevel {
    control: Option<Arc<dyn LevelControl>>,
    current: Arc<RwLock<String>>,
}

impl LogLevel {
    pub fn new(initial: impl Into<String>, control: Arc<dyn LevelControl>) -> Self {
        Self {
            control: Some(control),
            current: Arc::new(RwLock::new(initial.into())),
        }
    }

    /// A level that is only tracked, not applied to any subscriber.
    pub fn detached(initial: impl Into<String>) -> Self {
        Self {
            control: None,
            current: Arc::new(RwLock::new(initial.into())),
        }
    }

    pub fn current(&self) -> String {
        self.current
            .read()
            .map(|level| level.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Switches to `level` (case-insensitive) and returns its normalized name.
    pub fn set(&self, level: &str) -> Result<String, LogLevelError> {
        let normalized = level.trim().to_ascii_lowercase();
        if !LOG_LEVELS.contains(&normalized.as_str()) {
            return Err(LogLevelError::Unknown(level.to_string()));
        }

        if let Some(control) = &self.control {
            control.apply(&normalized)?;
        }

        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = normalized.clone();
        Ok(normalized)
    }
}

/// Level name reported for a `RUST_LOG` style directive list.
///
/// A `feedrecords=<level>` directive wins over a bare `<level>` one. Anything
/// else (module paths, spans, unknown names) reports the default level.
pub fn level_from_directives(directives: &str) -> &'static str {
    let mut global = None;
    for directive in directives.split(',').map(str::trim) {
        let (target, level) = match directive.split_once('=') {
            Some((target, level)) => (Some(target.trim()), level.trim()),
            None => (None, directive),
        };
        let Some(level) = LOG_LEVELS
            .iter()
            .copied()
            .find(|known| known.eq_ignore_ascii_case(level))
        else {
            continue;
        };
        match target {
            Some("feedrecords") => return level,
            None => global = Some(level),
            Some(_) => {}
        }
    }
    global.unwrap_or(DEFAULT_LEVEL)
}

/// Installs the global subscriber and returns the handle for runtime changes.
pub fn init(config: &Config) -> LogLevel {
    let (initial, filter) = match EnvFilter::try_from_default_env() {
        Ok(filter) => {
            let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
            (level_from_directives(&directives), filter)
        }
        Err(_) => (DEFAULT_LEVEL, EnvFilter::new(DEFAULT_FILTER)),
    };
    let (filter, handle) = reload::Layer::new(filter);

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    LogLevel::new(initial, Arc::new(handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingControl {
        applied: Mutex<Vec<String>>,
    }

    impl LevelControl for RecordingControl {
        fn apply(&self, level: &str) -> Result<(), LogLevelError> {
            self.applied.lock().unwrap().push(level.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_set_normalizes_and_applies() {
        let control = Arc::new(RecordingControl::default());
        let level = LogLevel::new("debug", control.clone());

        assert_eq!(level.set(" WARN ").unwrap(), "warn");
        assert_eq!(level.current(), "warn");
        assert_eq!(*control.applied.lock().unwrap(), vec!["warn".to_string()]);
    }

    #[test]
    fn test_unknown_level_is_rejected_without_change() {
        let level = LogLevel::detached("info");

        let err = level.set("verbose").unwrap_err();
        assert!(matches!(err, LogLevelError::Unknown(_)));
        assert_eq!(
            err.to_string(),
            "Log level must be one of: error, warn, info, debug, trace"
        );
        assert_eq!(level.current(), "info");
    }

    #[test]
    fn test_initial_level_is_a_level_name() {
        assert_eq!(level_from_directives(DEFAULT_FILTER), "debug");
        assert_eq!(level_from_directives(""), "debug");
        assert_eq!(level_from_directives("WARN"), "warn");
        assert_eq!(level_from_directives("info,feedrecords=trace"), "trace");
        assert_eq!(level_from_directives("error,hyper=debug"), "error");
        assert_eq!(level_from_directives("feedrecords::service=info"), "debug");

        for directives in [DEFAULT_FILTER, "warn", "tower_http=off"] {
            assert!(LOG_LEVELS.contains(&level_from_directives(directives)));
        }
    }
}
