//! Operator configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_LOBBY_SIZE: usize = 4;
pub const DEFAULT_ASSOCIATION_ROUNDS: u32 = 3;
pub const DEFAULT_MAX_LOBBY_SIZE: usize = 20;
pub const DEFAULT_MAX_ASSOCIATION_CHARS: usize = 200;
pub const DEFAULT_WORDS_FILE: &str = "words.txt";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:6574";

#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Lobby size used when a lobby is opened without an explicit count
    pub lobby_size: usize,
    /// Upper bound for a lobby-size override
    pub max_lobby_size: usize,
    /// Association rounds per game
    pub association_rounds: u32,
    /// Longer associations are truncated
    pub max_association_chars: usize,
    /// Force the vote after this long in the association phase (None = never)
    pub association_timeout: Option<Duration>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            lobby_size: DEFAULT_LOBBY_SIZE,
            max_lobby_size: DEFAULT_MAX_LOBBY_SIZE,
            association_rounds: DEFAULT_ASSOCIATION_ROUNDS,
            max_association_chars: DEFAULT_MAX_ASSOCIATION_CHARS,
            association_timeout: None,
        }
    }
}

impl GameConfig {
    /// Load config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_lobby_size = env_parse("MAX_LOBBY_SIZE")
            .filter(|&n: &usize| n >= 1)
            .unwrap_or(defaults.max_lobby_size);

        let lobby_size = match env_parse::<usize>("LOBBY_SIZE") {
            Some(n) if (1..=max_lobby_size).contains(&n) => n,
            Some(n) => {
                tracing::warn!(
                    "LOBBY_SIZE={} is outside 1..={}, using {}",
                    n,
                    max_lobby_size,
                    defaults.lobby_size.min(max_lobby_size)
                );
                defaults.lobby_size.min(max_lobby_size)
            }
            None => defaults.lobby_size.min(max_lobby_size),
        };

        let association_rounds = match env_parse::<u32>("ASSOCIATION_ROUNDS") {
            Some(0) => {
                tracing::warn!("ASSOCIATION_ROUNDS must be at least 1, using default");
                defaults.association_rounds
            }
            Some(n) => n,
            None => defaults.association_rounds,
        };

        Self {
            lobby_size,
            max_lobby_size,
            association_rounds,
            max_association_chars: env_parse("MAX_ASSOCIATION_CHARS")
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.max_association_chars),
            association_timeout: env_parse("ASSOCIATION_TIMEOUT_SECS")
                .filter(|&secs: &u64| secs > 0)
                .map(Duration::from_secs),
        }
    }
}

/// Process-level settings that are not part of the game rules
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub words_file: PathBuf,
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let words_file = env_string("WORDS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORDS_FILE));

        let bind_addr =
            env_parse("BIND_ADDR").unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 6574)));

        Self {
            words_file,
            bind_addr,
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env_string(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparsable {}={:?}", key, raw);
            None
        }
    }
}
