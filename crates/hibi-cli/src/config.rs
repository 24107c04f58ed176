use chrono::Duration;
use figment::{Figment, providers::{Format, Toml, Env}};
use hibi_core::models::StoreConfig;
use hibi_core::timezone::validate_timezone;
use hibi_core::view::{SortKey, TitleCollator};
use serde::Deserialize;

const DEFAULT_DATABASE_PATH: &str = "hibi.db";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Email of the active profile; optional while only one profile exists
    #[serde(default)]
    pub user_email: Option<String>,
    /// IANA timezone used to decide what "today" is
    #[serde(default = "detect_system_timezone")]
    pub timezone: String,
    /// UI locale for title ordering (e.g. "ja", "ru", "en")
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub default_sort: SortKey,
    #[serde(default = "default_delete_batch_size")]
    pub delete_batch_size: usize,
    #[serde(default = "default_reminder_interval_hours")]
    pub reminder_interval_hours: i64,
}

fn default_database_path() -> String {
    DEFAULT_DATABASE_PATH.to_string()
}

fn default_delete_batch_size() -> usize {
    StoreConfig::default().delete_batch_size
}

fn default_reminder_interval_hours() -> i64 {
    hibi_core::reminder::DEFAULT_REMINDER_INTERVAL_HOURS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            user_email: None,
            timezone: detect_system_timezone(),
            locale: None,
            default_sort: SortKey::default(),
            delete_batch_size: default_delete_batch_size(),
            reminder_interval_hours: default_reminder_interval_hours(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("config.toml"))
                .merge(Env::prefixed("HIBI_")),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        let mut config: Config = figment.extract()?;
        if validate_timezone(&config.timezone).is_err() {
            tracing::warn!(timezone = %config.timezone, "invalid timezone in config, using UTC");
            config.timezone = "UTC".to_string();
        }
        let hours = config.reminder_interval_hours;
        if hours <= 0 || Duration::try_hours(hours).is_none() {
            tracing::warn!(hours, "invalid reminder interval in config, using the default");
            config.reminder_interval_hours = default_reminder_interval_hours();
        }
        Ok(config)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            delete_batch_size: self.delete_batch_size.max(1),
            reminder_interval: Duration::try_hours(self.reminder_interval_hours)
                .filter(|interval| *interval > Duration::zero())
                .unwrap_or_else(|| Duration::hours(default_reminder_interval_hours())),
        }
    }

    pub fn collator(&self) -> TitleCollator {
        self.locale
            .as_deref()
            .map(TitleCollator::new)
            .unwrap_or_default()
    }
}

/// Detects the system timezone, falling back to UTC if detection fails
pub fn detect_system_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    if let Ok(local_tz) = iana_time_zone::get_timezone() {
        if validate_timezone(&local_tz).is_ok() {
            return local_tz;
        }
    }

    "UTC".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::Serialized;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = Config::from_figment(Figment::new()).unwrap();
        assert_eq!(config.database_path, "hibi.db");
        assert_eq!(config.default_sort, SortKey::Date);
        assert_eq!(config.store_config().delete_batch_size, 500);
        assert_eq!(config.store_config().reminder_interval, Duration::hours(60));
        assert!(config.collator().locale().is_none());
    }

    #[test]
    fn test_overrides_and_invalid_timezone() {
        let figment = Figment::new()
            .merge(Serialized::default("timezone", "Mars/Olympus"))
            .merge(Serialized::default("default_sort", "title"))
            .merge(Serialized::default("locale", "ja"))
            .merge(Serialized::default("delete_batch_size", 0));

        let config = Config::from_figment(figment).unwrap();
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.default_sort, SortKey::Title);
        assert_eq!(config.collator().locale(), Some("ja"));
        assert_eq!(config.store_config().delete_batch_size, 1);
    }

    #[test]
    fn test_out_of_range_reminder_interval_falls_back() {
        for hours in [9_000_000_000_000_000_i64, -5, 0] {
            let figment = Figment::new().merge(Serialized::default("reminder_interval_hours", hours));
            let config = Config::from_figment(figment).unwrap();
            assert_eq!(config.reminder_interval_hours, 60);
            assert_eq!(config.store_config().reminder_interval, Duration::hours(60));
        }

        let config = Config {
            reminder_interval_hours: i64::MAX,
            ..Config::default()
        };
        assert_eq!(config.store_config().reminder_interval, Duration::hours(60));
    }
}
