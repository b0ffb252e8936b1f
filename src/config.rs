use crate::channels::{Permission, DEFAULT_PERMISSION_PROMPT};
use std::{env, path::PathBuf, time::Duration};
use tracing::warn;

pub const DEFAULT_DATA_PATH: &str = "data/activities.json";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_REMINDER_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_ALARM_SOUND: &str = "alarm.mp3";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_path: PathBuf,
    pub port: u16,
    pub reminder_interval: Duration,
    pub alarm_sound: String,
    pub notification_permission: Permission,
    pub permission_prompt: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            port: DEFAULT_PORT,
            reminder_interval: Duration::from_secs(DEFAULT_REMINDER_INTERVAL_SECS),
            alarm_sound: DEFAULT_ALARM_SOUND.to_string(),
            notification_permission: Permission::Default,
            permission_prompt: DEFAULT_PERMISSION_PROMPT,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unparsable values are logged
    /// and replaced by their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let data_path = lookup("APP_DATA_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);

        let port = parsed(&lookup, "PORT", defaults.port);

        let interval_secs = parsed(&lookup, "REMINDER_INTERVAL_SECS", DEFAULT_REMINDER_INTERVAL_SECS);
        let reminder_interval = if interval_secs == 0 {
            warn!("REMINDER_INTERVAL_SECS must be at least 1, using 1");
            Duration::from_secs(1)
        } else {
            Duration::from_secs(interval_secs)
        };

        let alarm_sound = lookup("ALARM_SOUND")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.alarm_sound);

        let notification_permission = parsed(
            &lookup,
            "NOTIFICATION_PERMISSION",
            defaults.notification_permission,
        );

        let permission_prompt = Duration::from_secs(parsed(
            &lookup,
            "PERMISSION_PROMPT_SECS",
            defaults.permission_prompt.as_secs(),
        ));

        Self {
            data_path,
            port,
            reminder_interval,
            alarm_sound,
            notification_permission,
            permission_prompt,
        }
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("ignoring invalid {key}={raw:?}");
                default
            }
        },
        None => default,
    }
}
