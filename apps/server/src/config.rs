//! Runtime configuration, read once at startup from the environment.

use std::time::Duration;

/// Tunables for the server and its rooms.
///
/// Environment variables must be set by the runtime environment
/// (docker env_file, or sourced manually for local dev).
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// How long a dropped connection keeps its seat.
    pub grace_period: Duration,
    pub max_players: usize,
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("FODINHA_HOST").unwrap_or(defaults.host),
            port: env_parse("FODINHA_PORT", defaults.port),
            grace_period: Duration::from_secs(env_parse(
                "FODINHA_GRACE_SECS",
                defaults.grace_period.as_secs(),
            )),
            max_players: env_parse("FODINHA_MAX_PLAYERS", defaults.max_players),
        }
    }

    /// Millisecond grace window so actor tests finish quickly.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            grace_period: Duration::from_millis(50),
            ..Self::default()
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8501,
            grace_period: Duration::from_secs(60),
            max_players: 8,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
