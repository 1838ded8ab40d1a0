//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use rand::Rng;
use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "RENT_A_GOALIE_CONFIG_PATH";
/// Environment variable that overrides the configured secret key.
const SECRET_KEY_ENV: &str = "SECRET_KEY";
/// Domain used in activation links when none is configured.
const DEFAULT_SITE_DOMAIN: &str = "localhost:8000";
/// Days an activation link stays valid when none is configured.
const DEFAULT_ACTIVATION_TIMEOUT_DAYS: u64 = 3;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Host (and port) put in links sent by email.
    pub site_domain: String,
    /// When set, goalies applying to a game younger than this are queued instead of assigned.
    pub queue_window: Option<Duration>,
    /// How long an activation link stays valid.
    pub activation_timeout: Duration,
    secret_key: String,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let raw = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration file");
                    raw
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    RawConfig::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                RawConfig::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                RawConfig::default()
            }
        };

        let mut config = Self::from(raw);
        if let Some(secret) = env::var(SECRET_KEY_ENV).ok().filter(|s| !s.is_empty()) {
            config.secret_key = secret;
        }
        config
    }

    /// Key used to sign activation links and to pepper password hashes.
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// Replace the secret key, mostly useful for deterministic tests.
    pub fn with_secret_key(mut self, secret: impl Into<String>) -> Self {
        self.secret_key = secret.into();
        self
    }

    /// Enable the queue window for freshly created games.
    pub fn with_queue_window(mut self, window: Duration) -> Self {
        self.queue_window = Some(window);
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    site_domain: Option<String>,
    #[serde(default)]
    queue_window_minutes: Option<u64>,
    #[serde(default)]
    activation_timeout_days: Option<u64>,
    #[serde(default)]
    secret_key: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let secret_key = value
            .secret_key
            .filter(|secret| !secret.is_empty())
            .unwrap_or_else(|| {
                warn!("no secret key configured; activation links will not survive a restart");
                random_secret()
            });

        Self {
            site_domain: value
                .site_domain
                .unwrap_or_else(|| DEFAULT_SITE_DOMAIN.to_owned()),
            queue_window: value
                .queue_window_minutes
                .filter(|minutes| *minutes > 0)
                .map(|minutes| Duration::from_secs(minutes.saturating_mul(60))),
            activation_timeout: Duration::from_secs(
                value
                    .activation_timeout_days
                    .unwrap_or(DEFAULT_ACTIVATION_TIMEOUT_DAYS)
                    .saturating_mul(SECONDS_PER_DAY),
            ),
            secret_key,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn random_secret() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_queueing_off() {
        let config = AppConfig::default();
        assert_eq!(config.site_domain, DEFAULT_SITE_DOMAIN);
        assert_eq!(config.queue_window, None);
        assert_eq!(
            config.activation_timeout,
            Duration::from_secs(3 * SECONDS_PER_DAY)
        );
        assert_eq!(config.secret_key().len(), 64);
    }

    #[test]
    fn file_values_are_applied() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"site_domain":"goalies.example","queue_window_minutes":5,"activation_timeout_days":1,"secret_key":"s3cret"}"#,
        )
        .unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.site_domain, "goalies.example");
        assert_eq!(config.queue_window, Some(Duration::from_secs(300)));
        assert_eq!(config.activation_timeout, Duration::from_secs(SECONDS_PER_DAY));
        assert_eq!(config.secret_key(), "s3cret");
    }

    #[test]
    fn zero_minute_window_disables_queueing() {
        let raw: RawConfig = serde_json::from_str(r#"{"queue_window_minutes":0}"#).unwrap();
        assert_eq!(AppConfig::from(raw).queue_window, None);
    }

    #[test]
    fn huge_durations_saturate() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"queue_window_minutes":18446744073709551615,"activation_timeout_days":18446744073709551615}"#,
        )
        .unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.queue_window, Some(Duration::from_secs(u64::MAX)));
        assert_eq!(config.activation_timeout, Duration::from_secs(u64::MAX));
    }
}
