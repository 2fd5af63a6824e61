//! Application-level configuration loading: game tunables, auth secrets and storage selection.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PAIR_QUIZ_CONFIG_PATH";

const DEFAULT_QUESTIONS_PER_GAME: usize = 5;
const DEFAULT_GRACE_WINDOW: Duration = Duration::from_secs(10);
const DEFAULT_FINALIZER_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_JOIN_ATTEMPTS: u32 = 3;
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);
const DEFAULT_JWT_SECRET: &str = "pair-quiz-dev-secret";
const DEFAULT_ADMIN_TOKEN: &str = "admin";

/// Which persistence backend the binary should run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// MongoDB, supervised in the background.
    Mongo,
    /// Process-local store, lost on restart.
    Memory,
}

impl StorageBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Some(StorageBackend::Mongo),
            "memory" | "mem" => Some(StorageBackend::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Number of questions drawn when a game becomes active.
    pub questions_per_game: usize,
    /// Silence allowed to the slower player once the other one has finished.
    pub grace_window: Duration,
    /// Period of the timeout finalizer.
    pub finalizer_interval: Duration,
    /// Whether the background finalizer task is started.
    pub finalizer_enabled: bool,
    /// How many times a join retries after losing a race on the pending slot.
    pub join_attempts: u32,
    /// Lifetime of issued bearer tokens.
    pub token_ttl: Duration,
    /// HMAC secret used to sign bearer tokens.
    pub jwt_secret: String,
    /// Value expected in the `X-Admin-Token` header.
    pub admin_token: String,
    /// Selected storage backend.
    pub storage: StorageBackend,
}

impl AppConfig {
    /// Load the configuration from disk, then apply environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration file");
                    raw.into()
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        config.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(secret) = non_empty_var("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Some(token) = non_empty_var("ADMIN_TOKEN") {
            self.admin_token = token;
        }
        if let Ok(value) = env::var("STORAGE_BACKEND") {
            match StorageBackend::parse(&value) {
                Some(backend) => self.storage = backend,
                None => warn!(value = %value, "unknown STORAGE_BACKEND; keeping configured backend"),
            }
        }
        if let Ok(value) = env::var("FINALIZER_ENABLED") {
            match value.trim().parse::<bool>() {
                Ok(enabled) => self.finalizer_enabled = enabled,
                Err(_) => warn!(value = %value, "FINALIZER_ENABLED must be true or false; ignoring"),
            }
        }
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            questions_per_game: DEFAULT_QUESTIONS_PER_GAME,
            grace_window: DEFAULT_GRACE_WINDOW,
            finalizer_interval: DEFAULT_FINALIZER_INTERVAL,
            finalizer_enabled: true,
            join_attempts: DEFAULT_JOIN_ATTEMPTS,
            token_ttl: DEFAULT_TOKEN_TTL,
            jwt_secret: DEFAULT_JWT_SECRET.to_owned(),
            admin_token: DEFAULT_ADMIN_TOKEN.to_owned(),
            storage: StorageBackend::Mongo,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    questions_per_game: Option<usize>,
    grace_window_secs: Option<u64>,
    finalizer_interval_ms: Option<u64>,
    finalizer_enabled: Option<bool>,
    join_attempts: Option<u32>,
    token_ttl_secs: Option<u64>,
    jwt_secret: Option<String>,
    admin_token: Option<String>,
    storage_backend: Option<StorageBackend>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            questions_per_game: value
                .questions_per_game
                .filter(|count| *count > 0)
                .unwrap_or(defaults.questions_per_game),
            grace_window: value
                .grace_window_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.grace_window),
            finalizer_interval: value
                .finalizer_interval_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.finalizer_interval),
            finalizer_enabled: value
                .finalizer_enabled
                .unwrap_or(defaults.finalizer_enabled),
            join_attempts: value
                .join_attempts
                .filter(|attempts| *attempts > 0)
                .unwrap_or(defaults.join_attempts),
            token_ttl: value
                .token_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.token_ttl),
            jwt_secret: value.jwt_secret.unwrap_or(defaults.jwt_secret),
            admin_token: value.admin_token.unwrap_or(defaults.admin_token),
            storage: value.storage_backend.unwrap_or(defaults.storage),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
