//! Environment configuration, read once at startup.

use std::env;
use std::path::PathBuf;

pub const ENV_REMOTE_HOST: &str = "TWINTOP_REMOTE_HOST";
pub const ENV_REMOTE_USER: &str = "TWINTOP_REMOTE_USER";
pub const ENV_REMOTE_KEY: &str = "TWINTOP_REMOTE_KEY";

const DEFAULT_REMOTE_HOST: &str = "raspberrypi.local";
const DEFAULT_REMOTE_USER: &str = "pi";

#[derive(Debug, Clone)]
pub struct Config {
    pub remote_host: String,
    pub remote_user: String,
    /// ssh identity file for the remote bridge.
    pub remote_key: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an injectable variable lookup, so tests never race on the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            remote_host: lookup(ENV_REMOTE_HOST).unwrap_or_else(|| DEFAULT_REMOTE_HOST.to_string()),
            remote_user: lookup(ENV_REMOTE_USER).unwrap_or_else(|| DEFAULT_REMOTE_USER.to_string()),
            remote_key: lookup(ENV_REMOTE_KEY)
                .map(PathBuf::from)
                .unwrap_or_else(default_identity),
        }
    }
}

fn default_identity() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ssh")
        .join("id_ed25519")
}
