use shared::constants::DEFAULT_REVEAL_DELAY_MS;
use shared::reveal::{EmailGate, RevealSettings};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

const DEFAULT_CONFIG_BASE: &str = "config";
const DEFAULT_STORE_PATH: &str = "data/progress.json";
const DEFAULT_SESSION_EXPIRY_SECONDS: u64 = 900;

/// Host settings read from the environment once at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    /// Directory or URL prefix holding `<game>.json` documents.
    pub config_base: String,
    pub store_path: PathBuf,
    pub reveal: RevealSettings,
    pub session_expiry_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            config_base: DEFAULT_CONFIG_BASE.to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            reveal: RevealSettings::default(),
            session_expiry_seconds: DEFAULT_SESSION_EXPIRY_SECONDS,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            bind_addr: parse_or("BIND_ADDR", &lookup, defaults.bind_addr),
            config_base: lookup("CONFIG_BASE")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.config_base),
            store_path: lookup("STORE_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            reveal: RevealSettings {
                gate: parse_or("EMAIL_GATE", &lookup, EmailGate::default()),
                reveal_delay_ms: parse_or("REVEAL_DELAY_MS", &lookup, DEFAULT_REVEAL_DELAY_MS),
            },
            session_expiry_seconds: parse_or("SESSION_EXPIRY_SECONDS", &lookup, defaults.session_expiry_seconds),
        }
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring invalid {}={:?}, using {:?}", key, raw, default);
                default
            }
        },
    }
}
